//! # Join Flow
//!
//! One user-facing join attempt: balance lookup, proof generation, proof
//! submission and access confirmation, reported as four step indicators.
//!
//! Proof progress drives the middle steps: from 30% the proof step is
//! active, from 60% it is done and submission is active. Any failure resets
//! every step to pending and ends the run.

use std::sync::Arc;

use parking_lot::Mutex;
use zkvip_core::{GroupId, WalletAddress};
use zkvip_oracle::{BalanceOracle, BalanceReading, WalletSession};
use zkvip_zkp::{ProofProgress, ProofResult, ProofService};

use crate::access::{AccessController, ProofRun};
use crate::error::FlowError;
use crate::model::JoinedGroup;

/// The four user-visible steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowStep {
    CheckingBalance,
    GeneratingProof,
    SubmittingProof,
    ConfirmingAccess,
}

impl FlowStep {
    pub const ALL: [FlowStep; 4] = [
        Self::CheckingBalance,
        Self::GeneratingProof,
        Self::SubmittingProof,
        Self::ConfirmingAccess,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::CheckingBalance => "Checking balance",
            Self::GeneratingProof => "Generating proof",
            Self::SubmittingProof => "Submitting proof",
            Self::ConfirmingAccess => "Confirming access",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StepStatus {
    #[default]
    Pending,
    Active,
    Done,
}

/// Status of every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlowSteps([StepStatus; 4]);

impl FlowSteps {
    pub fn status(&self, step: FlowStep) -> StepStatus {
        self.0[step.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (FlowStep, StepStatus)> + '_ {
        FlowStep::ALL.into_iter().map(|s| (s, self.status(s)))
    }

    pub fn all_pending(&self) -> bool {
        self.0.iter().all(|s| *s == StepStatus::Pending)
    }

    pub fn all_done(&self) -> bool {
        self.0.iter().all(|s| *s == StepStatus::Done)
    }

    fn set(&mut self, step: FlowStep, status: StepStatus) {
        self.0[step.index()] = status;
    }
}

/// Step-indicator callback.
pub type StepFn<'a> = &'a (dyn Fn(&FlowSteps) + Send + Sync);

/// Holds the current steps and reports changes.
struct StepTracker<'a> {
    steps: Mutex<FlowSteps>,
    callback: Option<StepFn<'a>>,
}

impl<'a> StepTracker<'a> {
    fn new(callback: Option<StepFn<'a>>) -> Self {
        Self {
            steps: Mutex::new(FlowSteps::default()),
            callback,
        }
    }

    fn update(&self, f: impl FnOnce(&mut FlowSteps)) {
        let snapshot = {
            let mut steps = self.steps.lock();
            let before = *steps;
            f(&mut steps);
            if *steps == before {
                return;
            }
            *steps
        };
        if let Some(cb) = self.callback {
            cb(&snapshot);
        }
    }

    fn mark(&self, changes: &[(FlowStep, StepStatus)]) {
        self.update(|steps| {
            for &(step, status) in changes {
                steps.set(step, status);
            }
        });
    }

    fn on_proof_progress(&self, progress: ProofProgress) {
        use FlowStep::*;
        use StepStatus::*;
        match progress.percent {
            30..=59 => self.mark(&[(GeneratingProof, Active)]),
            60..=89 => self.mark(&[(GeneratingProof, Done), (SubmittingProof, Active)]),
            _ => {}
        }
    }

    fn reset(&self) {
        self.update(|steps| *steps = FlowSteps::default());
    }
}

/// Result of a successful join.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub group: JoinedGroup,
    pub balance: BalanceReading,
    pub proof: ProofResult,
}

/// Orchestrates balance lookup, proving and access for a join.
pub struct MembershipFlow {
    oracle: Arc<dyn BalanceOracle>,
    prover: Arc<ProofService>,
    access: Arc<AccessController>,
    session: WalletSession,
}

impl std::fmt::Debug for MembershipFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipFlow")
            .field("oracle", &self.oracle.name())
            .field("prover", &self.prover)
            .field("session", &self.session)
            .finish()
    }
}

impl MembershipFlow {
    pub fn new(
        oracle: Arc<dyn BalanceOracle>,
        prover: Arc<ProofService>,
        access: Arc<AccessController>,
        session: WalletSession,
    ) -> Self {
        Self {
            oracle,
            prover,
            access,
            session,
        }
    }

    pub fn access(&self) -> &Arc<AccessController> {
        &self.access
    }

    /// Prove the wallet's balance against the group's minimum and join.
    ///
    /// `wallet` overrides the session wallet.
    ///
    /// # Errors
    ///
    /// [`FlowError::InsufficientBalance`] before any proof work when the
    /// balance is below the minimum; otherwise the oracle, prover or access
    /// error that stopped the attempt.
    pub async fn join(
        &self,
        group_id: &GroupId,
        wallet: Option<&WalletAddress>,
        on_steps: Option<StepFn<'_>>,
    ) -> Result<JoinOutcome, FlowError> {
        let steps = StepTracker::new(on_steps);
        let result = self.attempt(group_id, wallet, &steps).await;
        if let Err(e) = &result {
            tracing::warn!(group = %group_id, error = %e, "join failed");
            steps.reset();
        }
        result
    }

    async fn attempt(
        &self,
        group_id: &GroupId,
        wallet: Option<&WalletAddress>,
        steps: &StepTracker<'_>,
    ) -> Result<JoinOutcome, FlowError> {
        let run = self.access.begin_run(group_id)?;
        let proved = self.prove(&run, wallet, steps).await;
        let (balance, proof) = match proved {
            Ok(v) => v,
            Err(e) => {
                self.access.abandon_run(&run);
                return Err(e);
            }
        };

        steps.mark(&[
            (FlowStep::GeneratingProof, StepStatus::Done),
            (FlowStep::SubmittingProof, StepStatus::Done),
            (FlowStep::ConfirmingAccess, StepStatus::Active),
        ]);
        let group = self.access.complete_join(run, &proof)?;
        steps.mark(&[(FlowStep::ConfirmingAccess, StepStatus::Done)]);

        tracing::info!(group = %group.id, placeholder = balance.placeholder, "joined via proof");
        Ok(JoinOutcome {
            group,
            balance,
            proof,
        })
    }

    async fn prove(
        &self,
        run: &ProofRun,
        wallet: Option<&WalletAddress>,
        steps: &StepTracker<'_>,
    ) -> Result<(BalanceReading, ProofResult), FlowError> {
        steps.mark(&[(FlowStep::CheckingBalance, StepStatus::Active)]);
        let address = self.session.resolve(wallet);
        let balance = self.oracle.balance_of(&address).await?;
        tracing::debug!(
            group = %run.group_id(),
            source = %balance.source,
            amount = %balance.amount,
            "balance checked"
        );
        if &balance.amount < run.threshold() {
            return Err(FlowError::InsufficientBalance {
                held: balance.amount,
                required: run.threshold().clone(),
            });
        }
        steps.mark(&[(FlowStep::CheckingBalance, StepStatus::Done)]);

        let on_progress = |p: ProofProgress| steps.on_proof_progress(p);
        let proof = self
            .prover
            .generate_proof(&run.inputs(&balance.amount), Some(&on_progress))
            .await?;
        Ok((balance, proof))
    }
}
