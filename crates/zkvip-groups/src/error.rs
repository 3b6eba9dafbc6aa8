//! Error types for the group store, access control and join flow.

use thiserror::Error;
use zkvip_core::{GroupId, TokenAmount};
use zkvip_oracle::OracleError;
use zkvip_zkp::ProofServiceError;

/// Failure reading or writing persisted records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage I/O failed for {key}: {reason}")]
    Io { key: String, reason: String },

    #[error("stored record {key} is corrupt: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("stored record {key} has unsupported version {version}")]
    UnsupportedVersion { key: String, version: u32 },
}

/// Group store errors. Apart from storage failures these are caller logic
/// errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("a group with id {0} already exists")]
    Duplicate(GroupId),

    #[error("group {0} not found")]
    NotFound(GroupId),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Access control errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("a join attempt for group {0} is already in progress")]
    RunInFlight(GroupId),

    #[error("already a member of group {0}")]
    AlreadyMember(GroupId),

    #[error("join attempt for group {0} is no longer current")]
    StaleRun(GroupId),

    #[error("proof for group {0} did not verify")]
    InvalidProof(GroupId),

    #[error("proof for group {group} does not match the join attempt: {reason}")]
    ProofMismatch { group: GroupId, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Join flow errors.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("balance lookup failed: {0}")]
    Oracle(#[from] OracleError),

    #[error("insufficient balance: you hold {held} WLD but this group requires {required} WLD")]
    InsufficientBalance {
        held: TokenAmount,
        required: TokenAmount,
    },

    #[error(transparent)]
    Proof(#[from] ProofServiceError),

    #[error(transparent)]
    Access(#[from] AccessError),
}
