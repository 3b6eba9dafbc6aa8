//! # Join Subcommand
//!
//! Looks up the wallet balance, proves it against the group's minimum with
//! the development backend, and joins on success.
//!
//! The balance comes from the configured oracle chain (`ZKVIP_RPC_URL`,
//! `ZKVIP_ENV`, ...) unless `--balance` fixes it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use zkvip_core::{TokenAmount, WalletAddress};
use zkvip_groups::{FlowSteps, MembershipFlow, StepStatus};
use zkvip_oracle::{
    BalanceOracle, OracleChain, OracleConfig, StaticBalanceOracle, WalletSession,
};
use zkvip_zkp::{CircuitSource, DigestBackend, ProofService};

use crate::{parse_group, Workspace};

/// Arguments for `zkvip join`.
#[derive(Args, Debug)]
pub struct JoinArgs {
    /// Group id or name.
    pub group: String,

    /// Wallet to check; defaults to `ZKVIP_WALLET`.
    #[arg(long)]
    pub wallet: Option<String>,

    /// Use this balance instead of querying the chain, in WLD.
    #[arg(long, value_name = "WLD")]
    pub balance: Option<String>,

    /// Circuit artifact; defaults to the bundled balance-threshold circuit.
    #[arg(long, env = "ZKVIP_CIRCUIT")]
    pub circuit: Option<PathBuf>,
}

fn oracle_for(args: &JoinArgs) -> Result<Arc<dyn BalanceOracle>> {
    if let Some(raw) = &args.balance {
        let amount = TokenAmount::parse_decimal(raw)
            .with_context(|| format!("invalid balance {raw:?}"))?;
        return Ok(Arc::new(StaticBalanceOracle::new(amount)));
    }
    let config = OracleConfig::from_env().context("reading oracle configuration")?;
    tracing::debug!(rpc = %config.rpc_url, env = %config.environment, "using oracle chain");
    Ok(Arc::new(OracleChain::from_config(&config)?))
}

fn prover_for(args: &JoinArgs) -> ProofService {
    let backend = Arc::new(DigestBackend::new());
    match &args.circuit {
        Some(path) => ProofService::new(backend, CircuitSource::Path(path.clone())),
        None => ProofService::with_bundled_circuit(backend),
    }
}

/// One line per update, e.g. `[x] Checking balance  [>] Generating proof  [ ] ...`.
pub fn render_steps(steps: &FlowSteps) -> String {
    steps
        .iter()
        .map(|(step, status)| {
            let mark = match status {
                StepStatus::Pending => ' ',
                StepStatus::Active => '>',
                StepStatus::Done => 'x',
            };
            format!("[{mark}] {}", step.label())
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub async fn run_join(args: &JoinArgs, ws: &Workspace, json: bool) -> Result<u8> {
    let group = parse_group(&args.group)?;
    let wallet = args
        .wallet
        .as_deref()
        .map(WalletAddress::parse)
        .transpose()
        .context("invalid --wallet")?;

    let flow = MembershipFlow::new(
        oracle_for(args)?,
        Arc::new(prover_for(args)),
        Arc::clone(ws.access()),
        WalletSession::from_env(),
    );

    let on_steps = |steps: &FlowSteps| {
        if !json {
            eprintln!("{}", render_steps(steps));
        }
    };
    let outcome = flow.join(&group, wallet.as_ref(), Some(&on_steps)).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "group": outcome.group,
                "balanceSource": outcome.balance.source,
                "placeholderBalance": outcome.balance.placeholder,
                "proof": outcome.proof.proof_b64,
                "isValid": outcome.proof.is_valid,
            }))?
        );
    } else {
        if outcome.balance.placeholder {
            eprintln!("warning: joined using a development placeholder balance");
        }
        println!("Joined {} ({})", outcome.group.name, outcome.group.id);
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkvip_groups::{FlowError, FlowStep};

    fn args(group: &str, balance: &str) -> JoinArgs {
        JoinArgs {
            group: group.to_string(),
            wallet: None,
            balance: Some(balance.to_string()),
            circuit: None,
        }
    }

    #[tokio::test]
    async fn join_with_fixed_balance() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::open(dir.path()).unwrap();
        assert_eq!(run_join(&args("ZK Builders", "1.2"), &ws, false).await.unwrap(), 0);
        assert_eq!(ws.store().list_joined()[0].id.as_str(), "zk-builders");
    }

    #[tokio::test]
    async fn join_below_minimum_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::open(dir.path()).unwrap();
        let err = run_join(&args("ethereum-sp", "0.9"), &ws, true).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FlowError>(),
            Some(FlowError::InsufficientBalance { .. })
        ));
        assert!(ws.store().list_joined().is_empty());
    }

    #[tokio::test]
    async fn missing_circuit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::open(dir.path()).unwrap();
        let mut join = args("zk-builders", "5");
        join.circuit = Some(dir.path().join("absent.json"));
        assert!(run_join(&join, &ws, false).await.is_err());
        assert!(ws.store().list_joined().is_empty());
    }

    #[test]
    fn renders_step_marks() {
        let line = render_steps(&FlowSteps::default());
        assert!(line.starts_with(&format!("[ ] {}", FlowStep::CheckingBalance.label())));
        assert_eq!(line.matches("[ ]").count(), 4);
    }
}
