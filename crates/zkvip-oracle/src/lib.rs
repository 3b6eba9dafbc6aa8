//! # zkvip-oracle: Wallet Balance Sources
//!
//! Supplies the balance a membership proof is computed over.
//!
//! - [`RpcBalanceOracle`] reads an ERC-20 balance with `eth_call` and
//!   rescales it to 18 decimals.
//! - [`StaticBalanceOracle`] returns a fixed balance.
//! - [`OracleChain`] tries sources in order. Only a development chain may
//!   fall back to the flagged [`PlaceholderOracle`] balance; production
//!   surfaces the failure.
//! - [`WalletSession`] decides which address to query.
//!
//! Rate limits and transport failures are retried with exponential backoff
//! inside one lookup, under the [`RetryPolicy`] from [`OracleConfig`].
//! Every [`OracleError`] is retryable by running the lookup again.

pub mod chain;
pub mod config;
pub mod error;
pub mod oracle;
pub mod retry;
pub mod rpc;
pub mod session;

pub use chain::OracleChain;
pub use config::{ConfigError, Environment, OracleConfig};
pub use error::OracleError;
pub use oracle::{
    BalanceOracle, BalanceReading, PlaceholderOracle, StaticBalanceOracle, PLACEHOLDER_BALANCE,
};
pub use retry::{RetryPolicy, RPC_LIMIT_EXCEEDED};
pub use rpc::RpcBalanceOracle;
pub use session::WalletSession;
