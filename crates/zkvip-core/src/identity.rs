//! # Identity Newtypes
//!
//! Newtype wrappers for the identifiers that cross module boundaries:
//! group slugs and wallet addresses. Both are validated at construction so
//! that downstream code never handles a malformed identifier.
//!
//! ## Slug Derivation
//!
//! A [`GroupId`] is derived deterministically from a group's display name:
//! lowercase, collapse every run of characters outside `[a-z0-9]` into a
//! single `-`, then trim leading and trailing `-`. Two names that normalize
//! to the same slug denote the same group, which is how duplicate creation
//! is detected.

use serde::{Deserialize, Serialize};

use crate::error::ZkvipError;

/// Stable, unique identifier of a group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupId(String);

impl GroupId {
    /// Derive the slug for a group display name.
    ///
    /// # Errors
    ///
    /// Returns [`ZkvipError::EmptySlug`] when the name contains no ASCII
    /// letters or digits (for example `"!!!"` or `""`).
    pub fn from_name(name: &str) -> Result<Self, ZkvipError> {
        let mut slug = String::with_capacity(name.len());
        let mut pending_dash = false;
        for c in name.to_lowercase().chars() {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c);
            } else {
                pending_dash = true;
            }
        }
        if slug.is_empty() {
            return Err(ZkvipError::EmptySlug(name.to_string()));
        }
        Ok(Self(slug))
    }

    /// Accept an already-normalized slug.
    ///
    /// # Errors
    ///
    /// Returns [`ZkvipError::EmptySlug`] when `raw` is not in normal form.
    pub fn parse(raw: &str) -> Result<Self, ZkvipError> {
        let normalized = Self::from_name(raw)?;
        if normalized.0 != raw {
            return Err(ZkvipError::EmptySlug(raw.to_string()));
        }
        Ok(normalized)
    }

    /// Borrow the slug.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GroupId {
    type Error = ZkvipError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GroupId> for String {
    fn from(value: GroupId) -> Self {
        value.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An EVM wallet address, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// The all-zero address, used when no session wallet is known.
    pub const ZERO: &'static str = "0x0000000000000000000000000000000000000000";

    /// The all-zero address.
    pub fn zero() -> Self {
        Self(Self::ZERO.to_string())
    }

    /// Parse a `0x`-prefixed, 40-hex-digit address.
    pub fn parse(raw: &str) -> Result<Self, ZkvipError> {
        let trimmed = raw.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| ZkvipError::InvalidAddress(raw.to_string()))?;
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ZkvipError::InvalidAddress(raw.to_string()));
        }
        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    /// Borrow the address as a `0x`-prefixed string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 40 hex digits without the `0x` prefix.
    pub fn hex_digits(&self) -> &str {
        &self.0[2..]
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = ZkvipError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
