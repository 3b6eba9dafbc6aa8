//! # Digest Backend
//!
//! A deterministic, transparent proof backend. Circuit execution is real:
//! every declared parameter is type-checked and every constraint evaluated,
//! so an unsatisfiable assignment fails exactly as it would under a
//! constraint-system prover. The "proof" is a SHA-256 construction:
//!
//! ```text
//! vk         = SHA256("zkvip/vk" || circuit_digest)
//! commitment = SHA256("zkvip/witness" || private values)
//! tag        = SHA256(vk || commitment || public inputs)
//! proof      = commitment || tag                      (64 bytes)
//! ```
//!
//! Verification recomputes `tag` from the commitment carried in the proof.
//!
//! ## Security Warning
//!
//! **NOT ZERO-KNOWLEDGE.** Anyone holding the public inputs can forge a
//! matching proof. This backend exists so the pipeline, the access rules
//! and the tests run end to end without a native prover. Deployments that
//! need soundness plug a real prover in behind [`ProofBackend`].

use async_trait::async_trait;
use num_bigint::BigUint;
use sha2::{Digest, Sha256};

use crate::circuit::CircuitArtifact;
use crate::traits::{BackendError, ProofBackend};
use crate::types::{
    CircuitHandle, CircuitSource, InputAssignment, Proof, PublicInputs, VerificationKey, Witness,
    WitnessEntry,
};

/// Length of a digest-backend proof in bytes.
pub const PROOF_LEN: usize = 64;

const VK_DOMAIN: &[u8] = b"zkvip/vk";
const WITNESS_DOMAIN: &[u8] = b"zkvip/witness";

/// Transparent SHA-256 proof backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct DigestBackend;

impl DigestBackend {
    /// Create the backend.
    pub fn new() -> Self {
        Self
    }

    fn vk_bytes(circuit: &CircuitHandle) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(VK_DOMAIN);
        hasher.update(circuit.digest);
        hasher.finalize().into()
    }

    fn tag(vk: &[u8], commitment: &[u8], public_inputs: &[BigUint]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(vk);
        hasher.update(commitment);
        absorb_values(&mut hasher, public_inputs.iter());
        hasher.finalize().into()
    }
}

/// Hash a sequence of integers with a length prefix per value.
fn absorb_values<'a>(hasher: &mut Sha256, values: impl Iterator<Item = &'a BigUint>) {
    for value in values {
        let bytes = value.to_bytes_be();
        hasher.update((bytes.len() as u64).to_be_bytes());
        hasher.update(&bytes);
    }
}

#[async_trait]
impl ProofBackend for DigestBackend {
    fn name(&self) -> &str {
        "digest"
    }

    async fn load_circuit(&self, source: &CircuitSource) -> Result<CircuitHandle, BackendError> {
        let raw = match source {
            CircuitSource::Path(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                BackendError::ArtifactUnavailable {
                    location: path.display().to_string(),
                    reason: e.to_string(),
                }
            })?,
            CircuitSource::Inline(json) => json.clone(),
        };

        let artifact = CircuitArtifact::from_json(&raw)?;
        let digest: [u8; 32] = Sha256::digest(artifact.canonical_bytes()).into();
        tracing::debug!(
            circuit = %artifact.name,
            version = %artifact.version,
            digest = %digest_prefix(&digest),
            "circuit loaded"
        );
        Ok(CircuitHandle { artifact, digest })
    }

    async fn execute(
        &self,
        circuit: &CircuitHandle,
        inputs: &InputAssignment,
    ) -> Result<Witness, BackendError> {
        let mut entries = Vec::with_capacity(circuit.artifact.abi.parameters.len());
        for param in &circuit.artifact.abi.parameters {
            let value = inputs
                .get(&param.name)
                .ok_or_else(|| BackendError::MissingInput(param.name.clone()))?;
            param
                .ty
                .admits(value)
                .map_err(|reason| BackendError::InputOutOfRange {
                    name: param.name.clone(),
                    reason,
                })?;
            entries.push(WitnessEntry {
                name: param.name.clone(),
                visibility: param.visibility,
                value: value.clone(),
            });
        }

        for constraint in &circuit.artifact.constraints {
            let [left, right] = constraint.operands();
            // Operands were checked against the ABI when the artifact loaded.
            let lookup = |name: &str| {
                entries
                    .iter()
                    .find(|e| e.name == name)
                    .map(|e| &e.value)
                    .ok_or_else(|| BackendError::MissingInput(name.to_string()))
            };
            if !constraint.holds(lookup(left)?, lookup(right)?) {
                return Err(BackendError::UnsatisfiedConstraint(constraint.to_string()));
            }
        }

        Ok(Witness { entries })
    }

    async fn prove(
        &self,
        circuit: &CircuitHandle,
        witness: &Witness,
    ) -> Result<(Proof, PublicInputs), BackendError> {
        let mut hasher = Sha256::new();
        hasher.update(WITNESS_DOMAIN);
        hasher.update(circuit.digest);
        absorb_values(&mut hasher, witness.private_entries().map(|e| &e.value));
        let commitment: [u8; 32] = hasher.finalize().into();

        let public = witness.public_values();
        let tag = Self::tag(&Self::vk_bytes(circuit), &commitment, &public);

        let mut bytes = Vec::with_capacity(PROOF_LEN);
        bytes.extend_from_slice(&commitment);
        bytes.extend_from_slice(&tag);
        Ok((Proof(bytes), PublicInputs(public)))
    }

    async fn verification_key(
        &self,
        circuit: &CircuitHandle,
    ) -> Result<VerificationKey, BackendError> {
        Ok(VerificationKey(Self::vk_bytes(circuit).to_vec()))
    }

    async fn verify(
        &self,
        circuit: &CircuitHandle,
        proof: &Proof,
        public_inputs: &PublicInputs,
    ) -> Result<bool, BackendError> {
        if proof.0.len() != PROOF_LEN {
            return Err(BackendError::MalformedProof(format!(
                "expected {PROOF_LEN} bytes, got {}",
                proof.0.len()
            )));
        }
        if public_inputs.0.len() != circuit.artifact.public_count() {
            return Ok(false);
        }
        let (commitment, tag) = proof.0.split_at(32);
        let expected = Self::tag(&Self::vk_bytes(circuit), commitment, &public_inputs.0);
        Ok(tag == expected.as_slice())
    }
}

/// Short circuit fingerprint for log lines.
fn digest_prefix(digest: &[u8; 32]) -> String {
    hex::encode(&digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::BALANCE_THRESHOLD_ARTIFACT;

    async fn loaded() -> CircuitHandle {
        DigestBackend
            .load_circuit(&CircuitSource::Inline(BALANCE_THRESHOLD_ARTIFACT.to_string()))
            .await
            .unwrap()
    }

    fn assignment(threshold: u64, balance: u64, nonce: u64, secret: u64) -> InputAssignment {
        [
            ("threshold", threshold),
            ("balance", balance),
            ("nonce", nonce),
            ("secret_nonce", secret),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), BigUint::from(v)))
        .collect()
    }

    #[tokio::test]
    async fn digest_prefix_is_leading_eight_bytes() {
        let handle = loaded().await;
        let prefix = digest_prefix(&handle.digest);
        assert_eq!(prefix.len(), 16);
        assert!(prefix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(prefix, hex::encode(&handle.digest)[..16]);
    }

    #[tokio::test]
    async fn prove_then_verify_succeeds() {
        let circuit = loaded().await;
        let witness = DigestBackend.execute(&circuit, &assignment(5, 7, 42, 42)).await.unwrap();
        let (proof, public) = DigestBackend.prove(&circuit, &witness).await.unwrap();
        assert_eq!(proof.0.len(), PROOF_LEN);
        assert_eq!(public.0, vec![BigUint::from(5u8), BigUint::from(42u8)]);
        assert!(DigestBackend.verify(&circuit, &proof, &public).await.unwrap());
    }

    #[tokio::test]
    async fn verify_rejects_tampered_public_inputs() {
        let circuit = loaded().await;
        let witness = DigestBackend.execute(&circuit, &assignment(5, 7, 42, 42)).await.unwrap();
        let (proof, _) = DigestBackend.prove(&circuit, &witness).await.unwrap();
        let forged = PublicInputs(vec![BigUint::from(1u8), BigUint::from(42u8)]);
        assert!(!DigestBackend.verify(&circuit, &proof, &forged).await.unwrap());
    }

    #[tokio::test]
    async fn verify_rejects_wrong_length() {
        let circuit = loaded().await;
        let err = DigestBackend
            .verify(&circuit, &Proof(vec![0u8; 10]), &PublicInputs::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::MalformedProof(_)));
    }

    #[tokio::test]
    async fn execute_rejects_balance_below_threshold() {
        let circuit = loaded().await;
        let err = DigestBackend
            .execute(&circuit, &assignment(8, 7, 1, 1))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BackendError::UnsatisfiedConstraint("balance >= threshold".to_string())
        );
    }

    #[tokio::test]
    async fn execute_rejects_missing_input() {
        let circuit = loaded().await;
        let mut inputs = assignment(1, 1, 1, 1);
        inputs.remove("secret_nonce");
        let err = DigestBackend.execute(&circuit, &inputs).await.unwrap_err();
        assert_eq!(err, BackendError::MissingInput("secret_nonce".to_string()));
    }

    #[tokio::test]
    async fn execute_is_deterministic() {
        let circuit = loaded().await;
        let inputs = assignment(3, 9, 77, 77);
        let a = DigestBackend.execute(&circuit, &inputs).await.unwrap();
        let b = DigestBackend.execute(&circuit, &inputs).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn verification_key_is_bound_to_circuit() {
        let circuit = loaded().await;
        let mut other = circuit.clone();
        other.digest[0] ^= 0xff;
        let a = DigestBackend.verification_key(&circuit).await.unwrap();
        let b = DigestBackend.verification_key(&other).await.unwrap();
        assert_ne!(a, b);
    }
}
