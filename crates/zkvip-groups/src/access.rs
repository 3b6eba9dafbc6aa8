//! # Access Control
//!
//! The only way into the joined collection. A join is granted either by a
//! valid proof for the most recent run against a group, or by the creator
//! exemption when a user creates a group.
//!
//! Each group has at most one run in flight. A run is bound to its nonce and
//! to the group's threshold at the time it began; a proof whose public inputs
//! differ is rejected even if it verifies.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;
use zkvip_core::{GroupId, Nonce, TokenAmount};
use zkvip_zkp::{generate_nonce, ProofInputs, ProofResult};

use crate::error::{AccessError, StoreError};
use crate::model::{JoinedGroup, NewGroup};
use crate::store::GroupStore;

/// Why a join was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantBasis {
    /// A verified proof from the identified run.
    Proof { run_id: Uuid },
    /// The group was just created by the joining user.
    CreatorExemption,
}

/// Permission to move one group into the joined collection.
///
/// Only this module can construct one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinGrant {
    group_id: GroupId,
    basis: GrantBasis,
}

impl JoinGrant {
    pub(crate) fn new(group_id: GroupId, basis: GrantBasis) -> Self {
        Self { group_id, basis }
    }

    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    pub fn basis(&self) -> GrantBasis {
        self.basis
    }
}

/// One proof attempt against one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofRun {
    id: Uuid,
    group_id: GroupId,
    nonce: Nonce,
    threshold: TokenAmount,
}

impl ProofRun {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    pub fn nonce(&self) -> &Nonce {
        &self.nonce
    }

    /// The group's minimum balance when the run began.
    pub fn threshold(&self) -> &TokenAmount {
        &self.threshold
    }

    /// Prover inputs for `balance`, with the run nonce as both the public and
    /// the secret nonce.
    pub fn inputs(&self, balance: &TokenAmount) -> ProofInputs {
        ProofInputs::for_threshold(&self.threshold, balance, &self.nonce)
    }
}

/// Issues [`JoinGrant`]s against a [`GroupStore`].
#[derive(Debug)]
pub struct AccessController {
    store: Arc<GroupStore>,
    runs: Mutex<HashMap<GroupId, Uuid>>,
}

impl AccessController {
    pub fn new(store: Arc<GroupStore>) -> Self {
        Self {
            store,
            runs: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<GroupStore> {
        &self.store
    }

    /// Start a proof run for an available group.
    ///
    /// # Errors
    ///
    /// [`AccessError::AlreadyMember`] if the group is joined,
    /// [`StoreError::NotFound`] if it is not available, and
    /// [`AccessError::RunInFlight`] if another run for it has not finished.
    pub fn begin_run(&self, group_id: &GroupId) -> Result<ProofRun, AccessError> {
        if self.store.get_joined(group_id).is_some() {
            return Err(AccessError::AlreadyMember(group_id.clone()));
        }
        let group = self
            .store
            .get_available(group_id)
            .ok_or_else(|| StoreError::NotFound(group_id.clone()))?;

        let mut runs = self.runs.lock();
        if runs.contains_key(group_id) {
            return Err(AccessError::RunInFlight(group_id.clone()));
        }
        let run = ProofRun {
            id: Uuid::new_v4(),
            group_id: group.id,
            nonce: generate_nonce(),
            threshold: group.min_balance,
        };
        runs.insert(run.group_id.clone(), run.id);
        tracing::debug!(group = %run.group_id, run = %run.id, "proof run started");
        Ok(run)
    }

    /// Whether a run for `group_id` is in flight.
    pub fn run_in_flight(&self, group_id: &GroupId) -> bool {
        self.runs.lock().contains_key(group_id)
    }

    /// End `run` without joining. Does nothing if it is no longer current.
    pub fn abandon_run(&self, run: &ProofRun) {
        let mut runs = self.runs.lock();
        if runs.get(&run.group_id) == Some(&run.id) {
            runs.remove(&run.group_id);
            tracing::debug!(group = %run.group_id, run = %run.id, "proof run abandoned");
        }
    }

    /// Join the run's group if `outcome` is a valid proof for this run.
    ///
    /// The run ends whatever the result.
    ///
    /// # Errors
    ///
    /// [`AccessError::StaleRun`] if the run is not the current one,
    /// [`AccessError::InvalidProof`] if the proof did not verify, and
    /// [`AccessError::ProofMismatch`] if its public inputs are not
    /// `[threshold, nonce]` for this run.
    pub fn complete_join(
        &self,
        run: ProofRun,
        outcome: &ProofResult,
    ) -> Result<JoinedGroup, AccessError> {
        {
            let mut runs = self.runs.lock();
            if runs.get(&run.group_id) != Some(&run.id) {
                return Err(AccessError::StaleRun(run.group_id));
            }
            runs.remove(&run.group_id);
        }

        if !outcome.is_valid {
            tracing::warn!(group = %run.group_id, run = %run.id, "proof failed verification");
            return Err(AccessError::InvalidProof(run.group_id));
        }

        let expected = [run.threshold.base_units().clone(), run.nonce.value().clone()];
        if outcome.public_inputs.as_slice() != expected.as_slice() {
            return Err(AccessError::ProofMismatch {
                group: run.group_id,
                reason: format!(
                    "expected public inputs [{}, {}], got {} value(s)",
                    expected[0],
                    expected[1],
                    outcome.public_inputs.len()
                ),
            });
        }

        let grant = JoinGrant::new(run.group_id, GrantBasis::Proof { run_id: run.id });
        Ok(self.store.join(&grant)?)
    }

    /// Create a group and join it without a proof.
    pub fn create_group_as_creator(&self, new: NewGroup) -> Result<JoinedGroup, AccessError> {
        let group = self.store.create(new)?;
        tracing::warn!(
            group = %group.id,
            "creator exemption: joining without a balance proof"
        );
        let grant = JoinGrant::new(group.id, GrantBasis::CreatorExemption);
        Ok(self.store.join(&grant)?)
    }
}
