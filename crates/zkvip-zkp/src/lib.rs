//! # zkvip-zkp: Balance-Threshold Proofs
//!
//! Proves that a wallet's balance meets a group's minimum without
//! disclosing the balance.
//!
//! ## Architecture
//!
//! - [`ProofBackend`] abstracts the proof-system runtime: load a circuit,
//!   execute it to a witness, prove, and verify.
//! - [`DigestBackend`] is the in-process development backend. It evaluates
//!   the circuit's constraints for real but its proofs are transparent
//!   SHA-256 constructions, **not** zero-knowledge.
//! - [`ProofService`] runs the staged pipeline with progress reporting and
//!   strict input validation.
//!
//! ## Circuit
//!
//! The bundled `balance_threshold` artifact has public inputs
//! `[threshold, nonce]` and private inputs `[balance, secret_nonce]`, and
//! enforces `balance >= threshold` and `nonce == secret_nonce`.

pub mod circuit;
pub mod codec;
pub mod digest;
pub mod inputs;
pub mod service;
pub mod traits;
pub mod types;

pub use circuit::{CircuitArtifact, BALANCE_THRESHOLD_ARTIFACT};
pub use codec::{proof_from_base64, proof_to_base64, CodecError};
pub use digest::DigestBackend;
pub use inputs::{ProofInputs, ValidatedInputs, ValidationError};
pub use service::{
    ProgressFn, ProofProgress, ProofResult, ProofService, ProofServiceError, ProofStage,
};
pub use traits::{BackendError, ProofBackend};
pub use types::{
    CircuitHandle, CircuitSource, InputAssignment, Proof, PublicInputs, VerificationKey, Witness,
};

use zkvip_core::Nonce;

/// Fresh session nonce for one join attempt.
pub fn generate_nonce() -> Nonce {
    Nonce::generate()
}
