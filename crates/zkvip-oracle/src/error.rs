//! Balance oracle error types.

use crate::config::ConfigError;
use crate::retry::RPC_LIMIT_EXCEEDED;

/// Errors from a balance lookup. All of them are retryable by running the
/// lookup again.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The RPC endpoint returned a non-2xx status.
    #[error("RPC {endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// The JSON-RPC response carried an error object.
    #[error("RPC {endpoint} failed with code {code}: {message}")]
    Rpc {
        endpoint: String,
        code: i64,
        message: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The call succeeded but its result is not a usable balance.
    #[error("invalid result from {endpoint}: {reason}")]
    InvalidResult { endpoint: String, reason: String },
    /// Every source in a chain failed.
    #[error("all balance sources failed: {}", .0.join("; "))]
    Exhausted(Vec<String>),
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl OracleError {
    /// Whether repeating the same call may succeed: a transport failure, an
    /// HTTP 429, or a JSON-RPC rate limit.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { .. } => true,
            Self::Status { status, .. } => *status == 429,
            Self::Rpc { code, .. } => *code == RPC_LIMIT_EXCEEDED,
            _ => false,
        }
    }
}
