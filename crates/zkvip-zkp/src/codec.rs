//! Base64 transport encoding for proof bytes (standard alphabet, padded).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid base64 proof: {0}")]
    InvalidBase64(String),
}

/// Encode proof bytes for transport.
pub fn proof_to_base64(proof: &[u8]) -> String {
    STANDARD.encode(proof)
}

/// Decode a transported proof.
pub fn proof_from_base64(encoded: &str) -> Result<Vec<u8>, CodecError> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| CodecError::InvalidBase64(e.to_string()))
}
