//! # zkvip CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zkvip_cli::groups::{run_create, run_list, CreateArgs, ListArgs};
use zkvip_cli::inbox::{run_inbox, run_message, run_read, MessageArgs, ReadArgs};
use zkvip_cli::join::{run_join, JoinArgs};
use zkvip_cli::{Workspace, DEFAULT_STATE_DIR};

/// Balance-gated groups with zero-knowledge membership proofs.
#[derive(Parser, Debug)]
#[command(name = "zkvip", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON output and JSON log lines.
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding the group records.
    #[arg(long, global = true, env = "ZKVIP_STATE_DIR", default_value = DEFAULT_STATE_DIR)]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List groups you can join.
    List(ListArgs),

    /// Create a group and join it as its creator.
    Create(CreateArgs),

    /// Prove your balance and join a group.
    Join(JoinArgs),

    /// Show joined groups and unread counts.
    Inbox,

    /// Record an incoming message in a joined group.
    Message(MessageArgs),

    /// Mark a joined group as read.
    Read(ReadArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json);

    tracing::debug!(state_dir = %cli.state_dir.display(), "zkvip starting");

    let result = match Workspace::open(&cli.state_dir) {
        Ok(ws) => match &cli.command {
            Commands::List(args) => run_list(args, &ws, cli.json),
            Commands::Create(args) => run_create(args, &ws, cli.json),
            Commands::Join(args) => run_join(args, &ws, cli.json).await,
            Commands::Inbox => run_inbox(&ws, cli.json),
            Commands::Message(args) => run_message(args, &ws),
            Commands::Read(args) => run_read(args, &ws),
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
