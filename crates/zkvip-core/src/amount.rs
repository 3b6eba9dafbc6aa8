//! # Token Amounts: Exact 18-Decimal Fixed Point
//!
//! Group thresholds are expressed in whole-token units ("0.5 WLD") while the
//! circuit consumes integers scaled by `10^18`. [`TokenAmount`] keeps the
//! scaled integer as the single representation and converts at the edges,
//! so no value ever passes through a binary float.
//!
//! Serialized form is the decimal string (`"0.5"`). Deserialization also
//! accepts a plain JSON number, which is how older records stored minimums.
//! Numbers are read from their shortest decimal text, and exponent forms
//! (`1e-7`, `1e+21`) are expanded digit by digit before parsing.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ZkvipError;

/// Number of fractional decimal digits in a scaled amount.
pub const TOKEN_DECIMALS: u32 = 18;

/// A non-negative token amount held as base units (`value * 10^18`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TokenAmount(BigUint);

impl TokenAmount {
    /// The zero amount.
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    /// Wrap an already-scaled base-unit integer.
    pub fn from_base_units(units: BigUint) -> Self {
        Self(units)
    }

    /// Rescale an integer expressed with `decimals` fractional digits.
    ///
    /// Extra precision beyond 18 digits is truncated toward zero.
    pub fn from_scaled(raw: BigUint, decimals: u32) -> Self {
        if decimals == TOKEN_DECIMALS {
            Self(raw)
        } else if decimals < TOKEN_DECIMALS {
            Self(raw * pow10(TOKEN_DECIMALS - decimals))
        } else {
            Self(raw / pow10(decimals - TOKEN_DECIMALS))
        }
    }

    /// Parse a decimal string such as `"1"`, `"0.5"` or `"12.000001"`.
    ///
    /// # Errors
    ///
    /// Rejects empty input, signs, exponents, more than 18 fractional
    /// digits, and any non-digit character.
    pub fn parse_decimal(input: &str) -> Result<Self, ZkvipError> {
        let invalid = |reason: &str| ZkvipError::InvalidAmount {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty"));
        }
        if trimmed.starts_with('-') {
            return Err(invalid("negative amounts are not allowed"));
        }

        let (whole, frac) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("no digits"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected decimal digits"));
        }
        if frac.len() > TOKEN_DECIMALS as usize {
            return Err(invalid("more than 18 fractional digits"));
        }

        let mut digits = String::with_capacity(whole.len() + TOKEN_DECIMALS as usize);
        digits.push_str(if whole.is_empty() { "0" } else { whole });
        digits.push_str(frac);
        for _ in frac.len()..TOKEN_DECIMALS as usize {
            digits.push('0');
        }

        BigUint::parse_bytes(digits.as_bytes(), 10)
            .map(Self)
            .ok_or_else(|| invalid("expected decimal digits"))
    }

    /// The scaled integer fed to the circuit.
    pub fn base_units(&self) -> &BigUint {
        &self.0
    }

    /// Whether the amount is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Approximate value in whole tokens, for filters and display only.
    pub fn to_f64_lossy(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::MAX) / 10f64.powi(TOKEN_DECIMALS as i32)
    }
}

fn pow10(exp: u32) -> BigUint {
    BigUint::from(10u8).pow(exp)
}

impl std::fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scale = pow10(TOKEN_DECIMALS);
        let whole = &self.0 / &scale;
        let frac = &self.0 % &scale;
        if frac.is_zero() {
            return write!(f, "{whole}");
        }
        let frac = format!("{:0>width$}", frac.to_string(), width = TOKEN_DECIMALS as usize);
        write!(f, "{whole}.{}", frac.trim_end_matches('0'))
    }
}

impl std::str::FromStr for TokenAmount {
    type Err = ZkvipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_decimal(s)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Text(String),
    Number(serde_json::Number),
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = match AmountRepr::deserialize(deserializer)? {
            AmountRepr::Text(s) => s,
            AmountRepr::Number(n) => {
                expand_exponent(&n.to_string()).map_err(serde::de::Error::custom)?
            }
        };
        Self::parse_decimal(&raw).map_err(serde::de::Error::custom)
    }
}

/// Largest exponent magnitude worth expanding; anything beyond cannot be a
/// token amount.
const MAX_EXPONENT: i64 = 256;

/// Rewrite `1.5e-7` style number text as plain positional decimal.
fn expand_exponent(text: &str) -> Result<String, ZkvipError> {
    let Some((mantissa, exponent)) = text.split_once(['e', 'E']) else {
        return Ok(text.to_string());
    };
    let invalid = |reason: &str| ZkvipError::InvalidAmount {
        input: text.to_string(),
        reason: reason.to_string(),
    };

    let exponent: i64 = exponent
        .strip_prefix('+')
        .unwrap_or(exponent)
        .parse()
        .map_err(|_| invalid("malformed exponent"))?;
    if exponent.abs() > MAX_EXPONENT {
        return Err(invalid("exponent out of range"));
    }
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let (whole, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{whole}{frac}");
    let point = whole.len() as i64 + exponent;

    let plain = if point <= 0 {
        format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else if point as usize >= digits.len() {
        format!("{digits}{}", "0".repeat(point as usize - digits.len()))
    } else {
        let (left, right) = digits.split_at(point as usize);
        format!("{left}.{right}")
    };
    Ok(format!("{sign}{plain}"))
}
