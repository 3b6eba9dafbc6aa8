//! Backoff for transient balance RPC failures.
//!
//! One `eth_call` is repeated while [`OracleError::is_transient`] holds:
//! the request never reached the node, the node answered `429`, or the
//! JSON-RPC error code is [`RPC_LIMIT_EXCEEDED`]. A revert, a bad result or
//! any other status fails the lookup on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::OracleError;

/// JSON-RPC "limit exceeded" error code (EIP-1474).
pub const RPC_LIMIT_EXCEEDED: i64 = -32005;

/// How often and how patiently a transient failure is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each later one.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// Fail on the first error.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before the zero-based `retry`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << retry.min(16))
    }

    /// Run `call` until it succeeds, fails permanently, or the policy is
    /// spent. The last error is returned unchanged.
    pub(crate) async fn run<T, F, Fut>(&self, endpoint: &str, mut call: F) -> Result<T, OracleError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, OracleError>>,
    {
        let mut retry = 0;
        loop {
            match call().await {
                Err(e) if e.is_transient() && retry < self.max_retries => {
                    let delay = self.delay_for(retry);
                    retry += 1;
                    tracing::warn!(
                        endpoint,
                        retry,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient balance RPC failure"
                    );
                    tokio::time::sleep(delay).await;
                }
                outcome => return outcome,
            }
        }
    }
}
