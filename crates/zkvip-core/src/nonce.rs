//! # Session Nonces
//!
//! A nonce binds one proof to one join attempt. It travels into the circuit
//! twice, as a public input and as a private input, and the circuit requires
//! the two to be equal.
//!
//! Nonces are arbitrary-precision integers. Freshly generated ones carry 128
//! random bits, which already exceeds `u64`, so the type never narrows.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::error::ZkvipError;

/// Bits of entropy in a generated nonce.
pub const NONCE_BITS: u32 = 128;

/// A non-negative integer nonce.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Nonce(BigUint);

impl Nonce {
    /// Draw a fresh 128-bit nonce from the thread-local CSPRNG.
    pub fn generate() -> Self {
        Self(BigUint::from(rand::random::<u128>()))
    }

    /// Parse a decimal integer string.
    pub fn parse(raw: &str) -> Result<Self, ZkvipError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(ZkvipError::InvalidNonce(raw.to_string()));
        }
        BigUint::parse_bytes(trimmed.as_bytes(), 10)
            .map(Self)
            .ok_or_else(|| ZkvipError::InvalidNonce(raw.to_string()))
    }

    /// Wrap an integer value.
    pub fn from_value(value: BigUint) -> Self {
        Self(value)
    }

    /// The integer value.
    pub fn value(&self) -> &BigUint {
        &self.0
    }
}

impl std::fmt::Display for Nonce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Nonce {
    type Error = ZkvipError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Nonce> for String {
    fn from(value: Nonce) -> Self {
        value.to_string()
    }
}
