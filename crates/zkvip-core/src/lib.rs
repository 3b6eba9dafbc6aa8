//! # zkvip-core: Foundational Types
//!
//! Leaf crate of the workspace. Every other `zkvip-*` crate depends on it;
//! it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Validated newtypes.** `GroupId`, `WalletAddress` and `Nonce` can only
//!    be built through constructors that reject malformed input.
//!
//! 2. **No floats for money.** `TokenAmount` stores the 18-decimal scaled
//!    integer that the circuit consumes, and parses decimal strings exactly.
//!
//! 3. **Arbitrary precision.** Nonces and amounts are `BigUint`, never
//!    narrowed to 64-bit integers.
//!
//! 4. **UTC-only timestamps** truncated to seconds.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `zkvip-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod amount;
pub mod error;
pub mod identity;
pub mod nonce;
pub mod temporal;

pub use amount::{TokenAmount, TOKEN_DECIMALS};
pub use error::ZkvipError;
pub use identity::{GroupId, WalletAddress};
pub use nonce::{Nonce, NONCE_BITS};
pub use temporal::Timestamp;

// Re-exported so downstream crates name the same integer type.
pub use num_bigint::BigUint;
