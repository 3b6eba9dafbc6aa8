//! # Circuit Artifacts
//!
//! A compiled circuit is shipped as JSON: an ABI listing every parameter
//! with its type and visibility, the assertions the circuit enforces, and
//! an opaque bytecode blob for backends that compile to a real constraint
//! system.
//!
//! The bundled `balance_threshold` circuit takes a public `threshold` and
//! `nonce` and a private `balance` and `secret_nonce`, and asserts
//! `balance >= threshold` and `nonce == secret_nonce`.

use std::collections::HashSet;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::traits::BackendError;

/// The bundled balance-threshold circuit artifact.
pub const BALANCE_THRESHOLD_ARTIFACT: &str = include_str!("../circuits/balance_threshold.json");

/// Decimal modulus of the BN254 scalar field; `field` parameters must be below it.
pub const BN254_MODULUS: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// Largest integer width a parameter may declare.
const MAX_INTEGER_WIDTH: u32 = 253;

/// Parameter visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Disclosed and checked at verification.
    Public,
    /// Known only to the prover.
    Private,
}

/// Parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParamType {
    /// A BN254 field element.
    Field,
    /// An unsigned integer of `width` bits.
    Integer {
        /// Bit width.
        width: u32,
    },
}

impl ParamType {
    /// Check that a value fits this type.
    pub fn admits(&self, value: &BigUint) -> Result<(), String> {
        match self {
            Self::Field => {
                let modulus = bn254_modulus();
                if value >= &modulus {
                    return Err("value is not below the BN254 field modulus".to_string());
                }
            }
            Self::Integer { width } => {
                if value.bits() > u64::from(*width) {
                    return Err(format!("value needs {} bits, type allows {width}", value.bits()));
                }
            }
        }
        Ok(())
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParameter {
    /// Parameter name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: ParamType,
    /// Public or private.
    pub visibility: Visibility,
}

/// Parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abi {
    /// Parameters in declaration order.
    pub parameters: Vec<AbiParameter>,
}

/// An assertion over two parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Constraint {
    /// `left == right`.
    Eq {
        /// Left operand.
        left: String,
        /// Right operand.
        right: String,
    },
    /// `left >= right`.
    Gte {
        /// Left operand.
        left: String,
        /// Right operand.
        right: String,
    },
}

impl Constraint {
    pub(crate) fn operands(&self) -> [&str; 2] {
        match self {
            Self::Eq { left, right } | Self::Gte { left, right } => [left, right],
        }
    }

    /// Evaluate against two resolved values.
    pub fn holds(&self, left: &BigUint, right: &BigUint) -> bool {
        match self {
            Self::Eq { .. } => left == right,
            Self::Gte { .. } => left >= right,
        }
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eq { left, right } => write!(f, "{left} == {right}"),
            Self::Gte { left, right } => write!(f, "{left} >= {right}"),
        }
    }
}

/// A compiled circuit description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitArtifact {
    /// Circuit name.
    pub name: String,
    /// Artifact version.
    pub version: String,
    /// Parameter list.
    pub abi: Abi,
    /// Assertions enforced on execution.
    pub constraints: Vec<Constraint>,
    /// Base64 bytecode for constraint-system backends.
    pub bytecode: String,
}

impl CircuitArtifact {
    /// Parse and structurally validate an artifact.
    ///
    /// # Errors
    ///
    /// [`BackendError::MalformedArtifact`] when the JSON does not parse, the
    /// ABI is empty or has duplicate names, an integer width is out of range,
    /// a constraint names an undeclared parameter, or the bytecode is empty.
    pub fn from_json(raw: &str) -> Result<Self, BackendError> {
        let artifact: Self = serde_json::from_str(raw)
            .map_err(|e| BackendError::MalformedArtifact(e.to_string()))?;
        artifact.validate()?;
        Ok(artifact)
    }

    fn validate(&self) -> Result<(), BackendError> {
        let malformed = |msg: String| Err(BackendError::MalformedArtifact(msg));

        if self.abi.parameters.is_empty() {
            return malformed(format!("circuit {} declares no parameters", self.name));
        }
        if self.bytecode.trim().is_empty() {
            return malformed(format!("circuit {} has no bytecode", self.name));
        }

        let mut seen = HashSet::new();
        for param in &self.abi.parameters {
            if !seen.insert(param.name.as_str()) {
                return malformed(format!("duplicate parameter {}", param.name));
            }
            if let ParamType::Integer { width } = param.ty {
                if width == 0 || width > MAX_INTEGER_WIDTH {
                    return malformed(format!(
                        "parameter {} has integer width {width}, expected 1..={MAX_INTEGER_WIDTH}",
                        param.name
                    ));
                }
            }
        }

        for constraint in &self.constraints {
            for operand in constraint.operands() {
                if !seen.contains(operand) {
                    return malformed(format!(
                        "constraint {constraint} references undeclared parameter {operand}"
                    ));
                }
            }
        }
        Ok(())
    }

    /// Number of public parameters.
    pub fn public_count(&self) -> usize {
        self.abi
            .parameters
            .iter()
            .filter(|p| p.visibility == Visibility::Public)
            .count()
    }

    /// Canonical bytes used to fingerprint the circuit.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        // Struct field order is fixed, so the encoding is deterministic.
        serde_json::to_vec(self).unwrap_or_default()
    }
}

fn bn254_modulus() -> BigUint {
    BigUint::parse_bytes(BN254_MODULUS.as_bytes(), 10).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_artifact_parses() {
        let artifact = CircuitArtifact::from_json(BALANCE_THRESHOLD_ARTIFACT).unwrap();
        assert_eq!(artifact.name, "balance_threshold");
        assert_eq!(artifact.abi.parameters.len(), 4);
        assert_eq!(artifact.public_count(), 2);
        assert_eq!(artifact.constraints.len(), 2);
    }

    #[test]
    fn rejects_unparseable_json() {
        let err = CircuitArtifact::from_json("{ not json").unwrap_err();
        assert!(matches!(err, BackendError::MalformedArtifact(_)));
    }

    #[test]
    fn rejects_constraint_on_unknown_parameter() {
        let raw = BALANCE_THRESHOLD_ARTIFACT.replace("\"right\": \"threshold\"", "\"right\": \"limit\"");
        let err = CircuitArtifact::from_json(&raw).unwrap_err();
        assert!(err.to_string().contains("limit"));
    }

    #[test]
    fn rejects_empty_bytecode() {
        let mut artifact = CircuitArtifact::from_json(BALANCE_THRESHOLD_ARTIFACT).unwrap();
        artifact.bytecode = String::new();
        let raw = serde_json::to_string(&artifact).unwrap();
        assert!(CircuitArtifact::from_json(&raw).is_err());
    }

    #[test]
    fn rejects_duplicate_parameters() {
        let mut artifact = CircuitArtifact::from_json(BALANCE_THRESHOLD_ARTIFACT).unwrap();
        let dup = artifact.abi.parameters[0].clone();
        artifact.abi.parameters.push(dup);
        let raw = serde_json::to_string(&artifact).unwrap();
        let err = CircuitArtifact::from_json(&raw).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn integer_type_enforces_width() {
        let ty = ParamType::Integer { width: 8 };
        assert!(ty.admits(&BigUint::from(255u32)).is_ok());
        assert!(ty.admits(&BigUint::from(256u32)).is_err());
    }

    #[test]
    fn field_type_enforces_modulus() {
        let modulus = bn254_modulus();
        assert!(ParamType::Field.admits(&(&modulus - 1u32)).is_ok());
        assert!(ParamType::Field.admits(&modulus).is_err());
    }

    #[test]
    fn constraint_evaluation() {
        let gte = Constraint::Gte {
            left: "balance".into(),
            right: "threshold".into(),
        };
        assert!(gte.holds(&BigUint::from(5u8), &BigUint::from(5u8)));
        assert!(!gte.holds(&BigUint::from(4u8), &BigUint::from(5u8)));
        assert_eq!(gte.to_string(), "balance >= threshold");
    }
}
