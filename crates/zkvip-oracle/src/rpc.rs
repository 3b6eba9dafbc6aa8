//! ERC-20 balance lookups over Ethereum JSON-RPC.
//!
//! Issues `eth_call` against the token contract:
//!
//! | Call        | Selector     | Result      |
//! |-------------|--------------|-------------|
//! | `balanceOf` | `0x70a08231` | `uint256`   |
//! | `decimals`  | `0x313ce567` | `uint8`     |
//!
//! The raw balance is rescaled from the token's decimals to 18.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use serde::Deserialize;
use tokio::sync::OnceCell;
use url::Url;
use zkvip_core::{TokenAmount, WalletAddress};

use crate::config::OracleConfig;
use crate::error::OracleError;
use crate::oracle::{BalanceOracle, BalanceReading};
use crate::retry::RetryPolicy;

const BALANCE_OF_SELECTOR: &str = "70a08231";
const DECIMALS_SELECTOR: &str = "313ce567";

/// Largest decimals value accepted from a contract.
const MAX_DECIMALS: u32 = 77;

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Reads ERC-20 balances through a JSON-RPC endpoint.
#[derive(Debug)]
pub struct RpcBalanceOracle {
    http: reqwest::Client,
    rpc_url: Url,
    token: WalletAddress,
    decimals: OnceCell<u32>,
    retry: RetryPolicy,
    next_id: AtomicU64,
}

impl RpcBalanceOracle {
    /// Build an oracle from configuration.
    pub fn new(config: &OracleConfig) -> Result<Self, OracleError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OracleError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            rpc_url: config.rpc_url.clone(),
            token: config.token_address.clone(),
            decimals: OnceCell::new_with(config.token_decimals),
            retry: config.retry,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn token(&self) -> &WalletAddress {
        &self.token
    }

    /// `eth_call` against the token contract, returning the raw result word.
    ///
    /// Rate limits and transport failures are retried under the configured
    /// [`RetryPolicy`].
    async fn eth_call(&self, endpoint: &str, data: String) -> Result<BigUint, OracleError> {
        let call = serde_json::json!({ "to": self.token.as_str(), "data": data });
        let call = &call;
        self.retry
            .run(endpoint, move || self.eth_call_once(endpoint, call))
            .await
    }

    async fn eth_call_once(
        &self,
        endpoint: &str,
        call: &serde_json::Value,
    ) -> Result<BigUint, OracleError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "eth_call",
            "params": [call, "latest"],
        });

        let resp = self
            .http
            .post(self.rpc_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::Http {
                endpoint: endpoint.to_string(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read response body: {e}>"));
            return Err(OracleError::Status {
                endpoint: endpoint.to_string(),
                status,
                body,
            });
        }

        let parsed: RpcResponse = resp.json().await.map_err(|e| OracleError::Deserialization {
            endpoint: endpoint.to_string(),
            source: e,
        })?;

        if let Some(err) = parsed.error {
            return Err(OracleError::Rpc {
                endpoint: endpoint.to_string(),
                code: err.code,
                message: err.message,
            });
        }

        let result = parsed.result.ok_or_else(|| OracleError::InvalidResult {
            endpoint: endpoint.to_string(),
            reason: "response has neither result nor error".to_string(),
        })?;

        parse_word(&result).map_err(|reason| OracleError::InvalidResult {
            endpoint: endpoint.to_string(),
            reason,
        })
    }

    async fn decimals(&self) -> Result<u32, OracleError> {
        self.decimals
            .get_or_try_init(|| async {
                let endpoint = "eth_call decimals";
                let raw = self
                    .eth_call(endpoint, format!("0x{DECIMALS_SELECTOR}"))
                    .await?;
                raw.to_u32()
                    .filter(|d| *d <= MAX_DECIMALS)
                    .ok_or_else(|| OracleError::InvalidResult {
                        endpoint: endpoint.to_string(),
                        reason: format!("decimals {raw} out of range"),
                    })
            })
            .await
            .copied()
    }
}

#[async_trait]
impl BalanceOracle for RpcBalanceOracle {
    fn name(&self) -> &str {
        "rpc"
    }

    async fn balance_of(&self, address: &WalletAddress) -> Result<BalanceReading, OracleError> {
        let data = format!(
            "0x{BALANCE_OF_SELECTOR}{:0>64}",
            address.hex_digits()
        );
        let raw = self.eth_call("eth_call balanceOf", data).await?;
        let decimals = self.decimals().await?;
        let amount = TokenAmount::from_scaled(raw, decimals);

        tracing::debug!(
            address = %address,
            token = %self.token,
            decimals,
            balance = %amount,
            "balance fetched"
        );

        Ok(BalanceReading {
            amount,
            source: self.name().to_string(),
            placeholder: false,
        })
    }
}

/// Decode a `0x`-prefixed hex word into an integer.
fn parse_word(raw: &str) -> Result<BigUint, String> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| format!("result {raw:?} is not 0x-prefixed"))?;
    if digits.is_empty() {
        return Err("empty result; the address may not be a contract".to_string());
    }
    let padded = if digits.len() % 2 == 1 {
        format!("0{digits}")
    } else {
        digits.to_string()
    };
    let bytes = hex::decode(&padded).map_err(|e| format!("result is not hex: {e}"))?;
    Ok(BigUint::from_bytes_be(&bytes))
}
