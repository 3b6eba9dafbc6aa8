//! # zkvip-groups: Group Membership
//!
//! Tracks which groups a user may join and which they have joined, and
//! gates the move between the two on a balance proof.
//!
//! - [`GroupStore`] owns the available and joined collections, keeps them
//!   disjoint, persists through a [`GroupStorage`] and notifies subscribers.
//! - [`AccessController`] mints the [`JoinGrant`] that [`GroupStore::join`]
//!   requires: from a valid proof for the current run, or through the
//!   creator exemption.
//! - [`MembershipFlow`] runs a full join attempt with step indicators.
//!
//! The store assumes a single process owns its storage.

pub mod access;
pub mod error;
pub mod events;
pub mod flow;
pub mod model;
pub mod seed;
pub mod storage;
pub mod store;

pub use access::{AccessController, GrantBasis, JoinGrant, ProofRun};
pub use error::{AccessError, FlowError, StorageError, StoreError};
pub use events::{ChangeHub, StoreEvent, Subscription};
pub use flow::{FlowStep, FlowSteps, JoinOutcome, MembershipFlow, StepFn, StepStatus};
pub use model::{
    AvailableFilter, AvailableGroup, JoinedGroup, NewGroup, SYSTEM_SENDER, WELCOME_MESSAGE,
};
pub use seed::{avatar_for, default_groups, AVATAR_PALETTE};
pub use storage::{FileStorage, GroupStorage, MemoryStorage, AVAILABLE_KEY, JOINED_KEY};
pub use store::GroupStore;
