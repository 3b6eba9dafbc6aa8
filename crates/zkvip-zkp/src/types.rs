//! Data handed between the proof service and a backend.

use std::collections::BTreeMap;
use std::path::PathBuf;

use num_bigint::BigUint;

use crate::circuit::{CircuitArtifact, Visibility};

/// Where a compiled circuit artifact comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CircuitSource {
    /// A JSON artifact on disk.
    Path(PathBuf),
    /// A JSON artifact already in memory.
    Inline(String),
}

impl std::fmt::Display for CircuitSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Inline(_) => f.write_str("<inline artifact>"),
        }
    }
}

/// A loaded, parsed circuit ready for execution.
#[derive(Debug, Clone)]
pub struct CircuitHandle {
    /// The parsed artifact.
    pub artifact: CircuitArtifact,
    /// SHA-256 over the artifact's canonical encoding; identifies the circuit.
    pub digest: [u8; 32],
}

/// Named integer assignment for every circuit parameter.
pub type InputAssignment = BTreeMap<String, BigUint>;

/// One solved witness value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitnessEntry {
    /// Parameter name from the circuit ABI.
    pub name: String,
    /// Whether the value is disclosed.
    pub visibility: Visibility,
    /// The assigned value.
    pub value: BigUint,
}

/// The full solved assignment, in ABI order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witness {
    /// Entries in the order the ABI declares them.
    pub entries: Vec<WitnessEntry>,
}

impl Witness {
    /// Values of the public entries, in ABI order.
    pub fn public_values(&self) -> Vec<BigUint> {
        self.entries
            .iter()
            .filter(|e| e.visibility == Visibility::Public)
            .map(|e| e.value.clone())
            .collect()
    }

    /// Private entries, in ABI order.
    pub fn private_entries(&self) -> impl Iterator<Item = &WitnessEntry> {
        self.entries
            .iter()
            .filter(|e| e.visibility == Visibility::Private)
    }
}

/// Opaque proof bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof(pub Vec<u8>);

/// Ordered public inputs the proof is checked against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PublicInputs(pub Vec<BigUint>);

/// Opaque verification key bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationKey(pub Vec<u8>);
