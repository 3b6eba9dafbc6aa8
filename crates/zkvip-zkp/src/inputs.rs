//! # Proof Inputs
//!
//! The four values a balance-threshold proof is computed over, and the
//! validation that runs before any backend work.
//!
//! Checks run in a fixed order so the most fundamental problem is the one
//! reported: threshold sign, balance sign, nonce presence, secret nonce
//! presence, nonce binding, and finally eligibility. Two nonces are bound
//! when they are numerically equal, or textually equal if either is not a
//! decimal integer. A bound but non-numeric pair is rejected after the
//! binding check, before eligibility.

use num_bigint::{BigInt, BigUint, Sign};
use thiserror::Error;
use zkvip_core::{Nonce, TokenAmount};

use crate::types::InputAssignment;

/// Rejection of proof inputs. All variants are user-correctable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("threshold must be non-negative, got {0}")]
    NegativeThreshold(BigInt),

    #[error("balance must be non-negative, got {0}")]
    NegativeBalance(BigInt),

    #[error("nonce must not be empty")]
    EmptyNonce,

    #[error("secret nonce must not be empty")]
    EmptySecretNonce,

    #[error("nonce does not match secret nonce")]
    NonceMismatch,

    #[error("nonce is not a decimal integer: {value:?}")]
    NonNumericNonce { value: String },

    #[error("insufficient balance: {balance} is below the required {threshold}")]
    InsufficientBalance { balance: BigUint, threshold: BigUint },
}

/// Raw inputs to one proof run. Transient; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofInputs {
    /// Required balance in base units (public).
    pub threshold: BigInt,
    /// Held balance in base units (private).
    pub balance: BigInt,
    /// Session nonce as a decimal string (public).
    pub nonce: String,
    /// The same nonce, supplied as a private input.
    pub secret_nonce: String,
}

impl ProofInputs {
    /// Inputs for proving `balance >= threshold` under one session nonce.
    pub fn for_threshold(threshold: &TokenAmount, balance: &TokenAmount, nonce: &Nonce) -> Self {
        Self {
            threshold: BigInt::from(threshold.base_units().clone()),
            balance: BigInt::from(balance.base_units().clone()),
            nonce: nonce.to_string(),
            secret_nonce: nonce.to_string(),
        }
    }

    /// Run every check, returning the canonical values on success.
    pub fn validate(&self) -> Result<ValidatedInputs, ValidationError> {
        let threshold = non_negative(&self.threshold)
            .ok_or_else(|| ValidationError::NegativeThreshold(self.threshold.clone()))?;
        let balance = non_negative(&self.balance)
            .ok_or_else(|| ValidationError::NegativeBalance(self.balance.clone()))?;

        if self.nonce.trim().is_empty() {
            return Err(ValidationError::EmptyNonce);
        }
        if self.secret_nonce.trim().is_empty() {
            return Err(ValidationError::EmptySecretNonce);
        }

        let parsed = (Nonce::parse(&self.nonce), Nonce::parse(&self.secret_nonce));
        let bound = match &parsed {
            (Ok(nonce), Ok(secret)) => nonce == secret,
            _ => self.nonce.trim() == self.secret_nonce.trim(),
        };
        if !bound {
            return Err(ValidationError::NonceMismatch);
        }
        let nonce = parsed.0.map_err(|_| ValidationError::NonNumericNonce {
            value: self.nonce.clone(),
        })?;

        if balance < threshold {
            return Err(ValidationError::InsufficientBalance { balance, threshold });
        }

        Ok(ValidatedInputs {
            threshold,
            balance,
            nonce,
        })
    }
}

/// Inputs that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInputs {
    pub threshold: BigUint,
    pub balance: BigUint,
    pub nonce: Nonce,
}

impl ValidatedInputs {
    /// Named assignment for the balance-threshold circuit.
    pub fn into_assignment(self) -> InputAssignment {
        let nonce = self.nonce.value().clone();
        InputAssignment::from([
            ("threshold".to_string(), self.threshold),
            ("nonce".to_string(), nonce.clone()),
            ("balance".to_string(), self.balance),
            ("secret_nonce".to_string(), nonce),
        ])
    }
}

fn non_negative(value: &BigInt) -> Option<BigUint> {
    match value.sign() {
        Sign::Minus => None,
        _ => Some(value.magnitude().clone()),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(threshold: i64, balance: i64, nonce: &str, secret: &str) -> ProofInputs {
        ProofInputs {
            threshold: BigInt::from(threshold),
            balance: BigInt::from(balance),
            nonce: nonce.to_string(),
            secret_nonce: secret.to_string(),
        }
    }

    #[test]
    fn accepts_eligible_inputs() {
        let v = inputs(5, 5, "12", "12").validate().unwrap();
        assert_eq!(v.threshold, BigUint::from(5u8));
        assert_eq!(v.nonce.to_string(), "12");
    }

    #[test]
    fn negative_threshold_reported_first() {
        let err = inputs(-1, -1, "", "").validate().unwrap_err();
        assert!(matches!(err, ValidationError::NegativeThreshold(_)));
    }

    #[test]
    fn negative_balance_reported_before_nonce_checks() {
        let err = inputs(1, -1, "", "").validate().unwrap_err();
        assert!(matches!(err, ValidationError::NegativeBalance(_)));
    }

    #[test]
    fn empty_nonce_before_empty_secret() {
        assert_eq!(inputs(1, 2, "", "").validate().unwrap_err(), ValidationError::EmptyNonce);
        assert_eq!(
            inputs(1, 2, "7", " ").validate().unwrap_err(),
            ValidationError::EmptySecretNonce
        );
    }

    #[test]
    fn non_numeric_nonce_rejected() {
        let err = inputs(1, 2, "abc", "abc").validate().unwrap_err();
        assert!(matches!(err, ValidationError::NonNumericNonce { .. }));
    }

    #[test]
    fn mismatch_reported_before_non_numeric() {
        assert_eq!(
            inputs(1, 2, "abc", "1").validate().unwrap_err(),
            ValidationError::NonceMismatch
        );
        assert_eq!(
            inputs(1, 2, "7", "x7").validate().unwrap_err(),
            ValidationError::NonceMismatch
        );
    }

    #[test]
    fn non_numeric_nonce_before_eligibility() {
        let err = inputs(10, 1, "abc", "abc").validate().unwrap_err();
        assert!(matches!(err, ValidationError::NonNumericNonce { .. }));
    }

    #[test]
    fn mismatch_before_eligibility() {
        let err = inputs(10, 1, "1", "2").validate().unwrap_err();
        assert_eq!(err, ValidationError::NonceMismatch);
    }

    #[test]
    fn nonces_compare_numerically() {
        assert!(inputs(1, 2, "007", "7").validate().is_ok());
    }

    #[test]
    fn insufficient_balance_message() {
        let err = inputs(10, 9, "1", "1").validate().unwrap_err();
        assert!(err.to_string().contains("insufficient balance"));
    }

    #[test]
    fn nonce_beyond_u64_survives() {
        let big = "340282366920938463463374607431768211455";
        let v = inputs(0, 0, big, big).validate().unwrap();
        let assignment = v.into_assignment();
        assert_eq!(assignment["secret_nonce"].to_string(), big);
        assert_eq!(assignment.len(), 4);
    }
}
