//! # Error Types
//!
//! Construction errors for the foundational newtypes. Each variant carries
//! the offending input so callers can render it back to the user verbatim.

use thiserror::Error;

/// Top-level error type for `zkvip-core` constructors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZkvipError {
    /// A group name normalized to an empty slug.
    #[error("group name {0:?} does not contain any slug characters")]
    EmptySlug(String),

    /// A wallet address was not `0x` followed by 40 hex digits.
    #[error("invalid wallet address {0:?}: expected 0x followed by 40 hex digits")]
    InvalidAddress(String),

    /// A nonce was not a non-negative decimal integer.
    #[error("invalid nonce {0:?}: expected a non-negative decimal integer")]
    InvalidNonce(String),

    /// A token amount could not be parsed.
    #[error("invalid token amount {input:?}: {reason}")]
    InvalidAmount {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A timestamp could not be parsed.
    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },
}
