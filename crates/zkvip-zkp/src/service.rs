//! # Proof Service
//!
//! Drives one [`ProofBackend`] through the balance-threshold pipeline:
//!
//! | Stage               | Progress |
//! |---------------------|----------|
//! | validating inputs   | 10       |
//! | loading circuit     | 20       |
//! | generating witness  | 40       |
//! | generating proof    | 60       |
//! | verifying proof     | 80       |
//! | finalizing          | 90       |
//! | complete            | 100      |
//!
//! Inputs are validated before the circuit is touched, so an invalid run
//! never reaches the backend. The loaded circuit is cached for the life of
//! the service; a failed load leaves the cache empty and the next run loads
//! again. Nothing is retried within a run.
//!
//! A run either returns a complete [`ProofResult`] or an error. Progress is
//! telemetry only and restarts from the first stage on every call.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use num_bigint::BigUint;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::circuit::BALANCE_THRESHOLD_ARTIFACT;
use crate::codec::proof_to_base64;
use crate::inputs::{ProofInputs, ValidationError};
use crate::traits::{BackendError, ProofBackend};
use crate::types::{CircuitHandle, CircuitSource, VerificationKey};

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProofStage {
    ValidatingInputs,
    LoadingCircuit,
    GeneratingWitness,
    GeneratingProof,
    VerifyingProof,
    Finalizing,
    Complete,
}

impl ProofStage {
    /// Progress percentage reported on entering the stage.
    pub fn percent(self) -> u8 {
        match self {
            Self::ValidatingInputs => 10,
            Self::LoadingCircuit => 20,
            Self::GeneratingWitness => 40,
            Self::GeneratingProof => 60,
            Self::VerifyingProof => 80,
            Self::Finalizing => 90,
            Self::Complete => 100,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ValidatingInputs => "validating inputs",
            Self::LoadingCircuit => "loading circuit",
            Self::GeneratingWitness => "generating witness",
            Self::GeneratingProof => "generating proof",
            Self::VerifyingProof => "verifying proof",
            Self::Finalizing => "finalizing",
            Self::Complete => "complete",
        }
    }
}

/// One progress notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofProgress {
    pub stage: ProofStage,
    pub percent: u8,
}

/// Progress callback.
pub type ProgressFn<'a> = &'a (dyn Fn(ProofProgress) + Send + Sync);

/// Output of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofResult {
    /// Raw proof bytes.
    pub proof: Vec<u8>,
    /// `proof` in standard base64.
    pub proof_b64: String,
    /// Public inputs in circuit order: `[threshold, nonce]`.
    pub public_inputs: Vec<BigUint>,
    pub verification_key: VerificationKey,
    /// Outcome of local self-verification.
    pub is_valid: bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Keeps reported percentages non-decreasing within one run.
struct Reporter<'a> {
    callback: Option<ProgressFn<'a>>,
    last: AtomicU8,
}

impl<'a> Reporter<'a> {
    fn new(callback: Option<ProgressFn<'a>>) -> Self {
        Self {
            callback,
            last: AtomicU8::new(0),
        }
    }

    fn enter(&self, stage: ProofStage) {
        tracing::debug!(stage = stage.label(), percent = stage.percent(), "proof stage");
        let percent = stage.percent().max(self.last.load(Ordering::Relaxed));
        self.last.store(percent, Ordering::Relaxed);
        if let Some(cb) = self.callback {
            cb(ProofProgress { stage, percent });
        }
    }
}

/// Balance-threshold proof pipeline over a shared backend.
pub struct ProofService {
    backend: Arc<dyn ProofBackend>,
    source: CircuitSource,
    circuit: OnceCell<CircuitHandle>,
}

impl std::fmt::Debug for ProofService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofService")
            .field("backend", &self.backend.name())
            .field("source", &self.source.to_string())
            .field("circuit_loaded", &self.circuit.initialized())
            .finish()
    }
}

impl ProofService {
    pub fn new(backend: Arc<dyn ProofBackend>, source: CircuitSource) -> Self {
        Self {
            backend,
            source,
            circuit: OnceCell::new(),
        }
    }

    /// Service over the bundled balance-threshold circuit.
    pub fn with_bundled_circuit(backend: Arc<dyn ProofBackend>) -> Self {
        Self::new(
            backend,
            CircuitSource::Inline(BALANCE_THRESHOLD_ARTIFACT.to_string()),
        )
    }

    pub fn source(&self) -> &CircuitSource {
        &self.source
    }

    /// Whether a circuit handle is cached.
    pub fn circuit_loaded(&self) -> bool {
        self.circuit.initialized()
    }

    async fn circuit(&self) -> Result<&CircuitHandle, BackendError> {
        self.circuit
            .get_or_try_init(|| async {
                let loaded = self.backend.load_circuit(&self.source).await;
                if let Err(e) = &loaded {
                    tracing::warn!(source = %self.source, error = %e, "circuit load failed");
                }
                loaded
            })
            .await
    }

    /// Prove `balance >= threshold` under the given nonce.
    ///
    /// # Errors
    ///
    /// [`ProofServiceError::Validation`] for rejected inputs, before any
    /// backend call. [`ProofServiceError::Backend`] for any failure inside
    /// the backend, surfaced unchanged.
    pub async fn generate_proof(
        &self,
        inputs: &ProofInputs,
        on_progress: Option<ProgressFn<'_>>,
    ) -> Result<ProofResult, ProofServiceError> {
        let progress = Reporter::new(on_progress);

        progress.enter(ProofStage::ValidatingInputs);
        let validated = inputs.validate()?;

        progress.enter(ProofStage::LoadingCircuit);
        let circuit = self.circuit().await?;

        progress.enter(ProofStage::GeneratingWitness);
        let witness = self
            .backend
            .execute(circuit, &validated.into_assignment())
            .await?;

        progress.enter(ProofStage::GeneratingProof);
        let (proof, public_inputs) = self.backend.prove(circuit, &witness).await?;
        let verification_key = self.backend.verification_key(circuit).await?;

        progress.enter(ProofStage::VerifyingProof);
        let is_valid = self
            .backend
            .verify(circuit, &proof, &public_inputs)
            .await?;

        progress.enter(ProofStage::Finalizing);
        let proof_b64 = proof_to_base64(&proof.0);

        progress.enter(ProofStage::Complete);
        tracing::info!(
            backend = self.backend.name(),
            is_valid,
            public_inputs = public_inputs.0.len(),
            "proof generated"
        );

        Ok(ProofResult {
            proof: proof.0,
            proof_b64,
            public_inputs: public_inputs.0,
            verification_key,
            is_valid,
        })
    }
}
