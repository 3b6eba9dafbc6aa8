//! Balance oracle configuration.
//!
//! Defaults target the WLD token on World Chain through the public RPC
//! endpoint. Override via environment variables or build explicitly for
//! tests.

use std::time::Duration;

use url::Url;
use zkvip_core::WalletAddress;

use crate::retry::RetryPolicy;

/// Default JSON-RPC endpoint (World Chain mainnet).
pub const DEFAULT_RPC_URL: &str = "https://worldchain-mainnet.g.alchemy.com/public";

/// WLD token contract on World Chain.
pub const DEFAULT_TOKEN_ADDRESS: &str = "0x2cfc85d8e48f8eab294be644d9e25c3030863003";

/// Deployment environment. Only `Development` may substitute a placeholder
/// balance when every real source fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl Environment {
    pub fn placeholder_allowed(self) -> bool {
        self == Self::Development
    }
}

impl std::str::FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Production => f.write_str("production"),
            Self::Development => f.write_str("development"),
        }
    }
}

/// Configuration for the balance oracle chain.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// JSON-RPC endpoint for `eth_call`.
    pub rpc_url: Url,
    /// ERC-20 contract whose balance gates membership.
    pub token_address: WalletAddress,
    /// Token decimals. `None` queries `decimals()` on the contract.
    pub token_decimals: Option<u32>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Backoff for rate limits and transport failures.
    pub retry: RetryPolicy,
    pub environment: Environment,
}

impl OracleConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ZKVIP_RPC_URL` (default: [`DEFAULT_RPC_URL`])
    /// - `ZKVIP_TOKEN_ADDRESS` (default: [`DEFAULT_TOKEN_ADDRESS`])
    /// - `ZKVIP_TOKEN_DECIMALS` (default: queried from the contract)
    /// - `ZKVIP_TIMEOUT_SECS` (default: 10)
    /// - `ZKVIP_RPC_RETRIES` (default: 3)
    /// - `ZKVIP_RPC_BACKOFF_MS` (default: 200)
    /// - `ZKVIP_ENV` (`production` | `development`, default: `production`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let token_raw = std::env::var("ZKVIP_TOKEN_ADDRESS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_ADDRESS.to_string());
        let token_address = WalletAddress::parse(&token_raw)
            .map_err(|_| ConfigError::InvalidTokenAddress(token_raw))?;

        let token_decimals = match std::env::var("ZKVIP_TOKEN_DECIMALS") {
            Ok(raw) => Some(
                raw.trim()
                    .parse::<u32>()
                    .map_err(|_| ConfigError::InvalidDecimals(raw))?,
            ),
            Err(_) => None,
        };

        let environment = match std::env::var("ZKVIP_ENV") {
            Ok(raw) => raw.parse()?,
            Err(_) => Environment::default(),
        };

        Ok(Self {
            rpc_url: env_url("ZKVIP_RPC_URL", DEFAULT_RPC_URL)?,
            token_address,
            token_decimals,
            timeout_secs: std::env::var("ZKVIP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            retry: retry_from_env()?,
            environment,
        })
    }

    /// Configuration pointing at a local mock RPC server.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if `url` does not parse.
    pub fn local_mock(url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            rpc_url: Url::parse(url)
                .map_err(|e| ConfigError::InvalidUrl("local_mock".to_string(), e.to_string()))?,
            token_address: WalletAddress::parse(DEFAULT_TOKEN_ADDRESS)
                .map_err(|_| ConfigError::InvalidTokenAddress(DEFAULT_TOKEN_ADDRESS.to_string()))?,
            token_decimals: Some(18),
            timeout_secs: 2,
            retry: RetryPolicy {
                max_retries: 2,
                base_delay: Duration::from_millis(10),
            },
            environment: Environment::Production,
        })
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

fn retry_from_env() -> Result<RetryPolicy, ConfigError> {
    let mut policy = RetryPolicy::default();
    if let Ok(raw) = std::env::var("ZKVIP_RPC_RETRIES") {
        policy.max_retries = raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidRetry("ZKVIP_RPC_RETRIES".to_string(), raw))?;
    }
    if let Ok(raw) = std::env::var("ZKVIP_RPC_BACKOFF_MS") {
        let ms: u64 = raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidRetry("ZKVIP_RPC_BACKOFF_MS".to_string(), raw))?;
        policy.base_delay = Duration::from_millis(ms);
    }
    Ok(policy)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid token address: {0}")]
    InvalidTokenAddress(String),
    #[error("invalid token decimals: {0}")]
    InvalidDecimals(String),
    #[error("invalid retry setting {0}: {1:?}")]
    InvalidRetry(String, String),
    #[error("unknown environment {0:?}, expected production or development")]
    InvalidEnvironment(String),
}
