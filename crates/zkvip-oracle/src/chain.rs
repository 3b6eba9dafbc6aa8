//! # Fallback Chain
//!
//! Queries balance sources in order and returns the first success. Sources
//! that report themselves unavailable are skipped. When all of them fail,
//! a development chain substitutes the flagged placeholder balance; a
//! production chain surfaces the failure.

use std::sync::Arc;

use async_trait::async_trait;
use zkvip_core::WalletAddress;

use crate::config::{Environment, OracleConfig};
use crate::error::OracleError;
use crate::oracle::{BalanceOracle, BalanceReading, PlaceholderOracle};
use crate::rpc::RpcBalanceOracle;

/// Ordered balance sources with an environment-gated placeholder.
pub struct OracleChain {
    sources: Vec<Arc<dyn BalanceOracle>>,
    environment: Environment,
}

impl std::fmt::Debug for OracleChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.sources.iter().map(|s| s.name()).collect();
        f.debug_struct("OracleChain")
            .field("sources", &names)
            .field("environment", &self.environment)
            .finish()
    }
}

impl OracleChain {
    pub fn new(sources: Vec<Arc<dyn BalanceOracle>>, environment: Environment) -> Self {
        Self {
            sources,
            environment,
        }
    }

    /// The JSON-RPC oracle from `config`, in `config.environment`.
    pub fn from_config(config: &OracleConfig) -> Result<Self, OracleError> {
        let rpc = RpcBalanceOracle::new(config)?;
        Ok(Self::new(vec![Arc::new(rpc)], config.environment))
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }
}

#[async_trait]
impl BalanceOracle for OracleChain {
    fn name(&self) -> &str {
        "chain"
    }

    async fn balance_of(&self, address: &WalletAddress) -> Result<BalanceReading, OracleError> {
        let mut failures = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            if !source.is_available() {
                tracing::debug!(source = source.name(), "balance source unavailable; skipping");
                failures.push(format!("{}: unavailable", source.name()));
                continue;
            }
            match source.balance_of(address).await {
                Ok(reading) => return Ok(reading),
                Err(e) => {
                    tracing::warn!(source = source.name(), error = %e, "balance source failed");
                    failures.push(format!("{}: {e}", source.name()));
                }
            }
        }

        if self.environment.placeholder_allowed() {
            return PlaceholderOracle.balance_of(address).await;
        }
        if failures.is_empty() {
            failures.push("no balance sources configured".to_string());
        }
        Err(OracleError::Exhausted(failures))
    }
}
