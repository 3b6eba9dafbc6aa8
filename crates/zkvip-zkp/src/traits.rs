//! # Proof Backend Trait
//!
//! The abstract interface to a proof-system runtime. The service drives a
//! backend through five calls, in order: load the circuit, execute it to a
//! witness, prove, fetch the verification key, and verify.
//!
//! ## Invariants
//!
//! - `execute` is a pure function of the circuit and the assignment:
//!   identical inputs always yield an identical witness.
//! - Every call may suspend. Implementations must be `Send + Sync` so one
//!   backend can be shared behind an `Arc` by several services.
//! - Any failure is reported as a [`BackendError`]; the service surfaces it
//!   verbatim and never retries on its own.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{
    CircuitHandle, CircuitSource, InputAssignment, Proof, PublicInputs, VerificationKey, Witness,
};

/// Failure inside the proof-system runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The circuit artifact could not be read.
    #[error("failed to load circuit from {location}: {reason}")]
    ArtifactUnavailable {
        /// Where the artifact was expected.
        location: String,
        /// Underlying cause.
        reason: String,
    },

    /// The artifact was read but is not a usable circuit.
    #[error("malformed circuit artifact: {0}")]
    MalformedArtifact(String),

    /// The assignment lacks a parameter the circuit declares.
    #[error("missing circuit input: {0}")]
    MissingInput(String),

    /// A value does not fit the parameter's declared type.
    #[error("circuit input {name} out of range: {reason}")]
    InputOutOfRange {
        /// Parameter name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Execution found an assertion that does not hold.
    #[error("circuit constraint not satisfied: {0}")]
    UnsatisfiedConstraint(String),

    /// The proof bytes do not have the expected shape.
    #[error("malformed proof: {0}")]
    MalformedProof(String),
}

/// Abstract interface to a proof-system runtime.
#[async_trait]
pub trait ProofBackend: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &str;

    /// Load and parse a compiled circuit.
    async fn load_circuit(&self, source: &CircuitSource) -> Result<CircuitHandle, BackendError>;

    /// Solve the circuit for a concrete assignment.
    async fn execute(
        &self,
        circuit: &CircuitHandle,
        inputs: &InputAssignment,
    ) -> Result<Witness, BackendError>;

    /// Produce a proof and the public inputs it commits to.
    async fn prove(
        &self,
        circuit: &CircuitHandle,
        witness: &Witness,
    ) -> Result<(Proof, PublicInputs), BackendError>;

    /// The verification key for a circuit.
    async fn verification_key(&self, circuit: &CircuitHandle)
        -> Result<VerificationKey, BackendError>;

    /// Check a proof against its public inputs.
    async fn verify(
        &self,
        circuit: &CircuitHandle,
        proof: &Proof,
        public_inputs: &PublicInputs,
    ) -> Result<bool, BackendError>;
}
