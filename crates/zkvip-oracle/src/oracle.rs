//! The balance source interface and the in-process sources.

use async_trait::async_trait;
use num_bigint::BigUint;
use zkvip_core::{TokenAmount, WalletAddress};

use crate::error::OracleError;

/// Balance substituted in development when every real source fails.
pub const PLACEHOLDER_BALANCE: &str = "1.5";

const PLACEHOLDER_BASE_UNITS: u64 = 1_500_000_000_000_000_000;

/// A balance observed for one wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceReading {
    /// Balance in 18-decimal base units.
    pub amount: TokenAmount,
    /// Name of the source that produced it.
    pub source: String,
    /// Set when the value is a development stand-in, not a real balance.
    pub placeholder: bool,
}

/// Source of wallet token balances.
#[async_trait]
pub trait BalanceOracle: Send + Sync {
    fn name(&self) -> &str;

    /// Cheap capability check made before a lookup. A source that reports
    /// itself unavailable is skipped by [`OracleChain`](crate::OracleChain)
    /// without being queried.
    fn is_available(&self) -> bool {
        true
    }

    /// Current token balance of `address`.
    async fn balance_of(&self, address: &WalletAddress) -> Result<BalanceReading, OracleError>;
}

/// Returns the same balance for every address.
#[derive(Debug, Clone)]
pub struct StaticBalanceOracle {
    amount: TokenAmount,
}

impl StaticBalanceOracle {
    pub fn new(amount: TokenAmount) -> Self {
        Self { amount }
    }
}

#[async_trait]
impl BalanceOracle for StaticBalanceOracle {
    fn name(&self) -> &str {
        "static"
    }

    async fn balance_of(&self, _address: &WalletAddress) -> Result<BalanceReading, OracleError> {
        Ok(BalanceReading {
            amount: self.amount.clone(),
            source: self.name().to_string(),
            placeholder: false,
        })
    }
}

/// Development stand-in that reports [`PLACEHOLDER_BALANCE`] and flags it.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderOracle;

impl PlaceholderOracle {
    pub fn amount() -> TokenAmount {
        TokenAmount::from_base_units(BigUint::from(PLACEHOLDER_BASE_UNITS))
    }
}

#[async_trait]
impl BalanceOracle for PlaceholderOracle {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn balance_of(&self, address: &WalletAddress) -> Result<BalanceReading, OracleError> {
        tracing::warn!(
            placeholder = true,
            address = %address,
            balance = PLACEHOLDER_BALANCE,
            "using placeholder balance"
        );
        Ok(BalanceReading {
            amount: Self::amount(),
            source: self.name().to_string(),
            placeholder: true,
        })
    }
}
