//! # List and Create Subcommands

use anyhow::{Context, Result};
use clap::Args;
use rand::Rng;
use zkvip_core::TokenAmount;
use zkvip_groups::{avatar_for, AvailableFilter, AvailableGroup, NewGroup, AVATAR_PALETTE};

use crate::Workspace;

/// Upper bound of the `--low` filter, in WLD.
pub const LOW_THRESHOLD: &str = "1";

/// Arguments for `zkvip list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only groups requiring at most 1 WLD.
    #[arg(long)]
    pub low: bool,
}

/// Arguments for `zkvip create`.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Display name; the group id is derived from it.
    pub name: String,

    /// Minimum balance required to join, in WLD.
    #[arg(long = "min", value_name = "WLD")]
    pub min_balance: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Presentation key; a random palette entry when omitted.
    #[arg(long)]
    pub avatar: Option<String>,

    /// Name used in the default description.
    #[arg(long)]
    pub username: Option<String>,
}

pub fn run_list(args: &ListArgs, ws: &Workspace, json: bool) -> Result<u8> {
    let filter = if args.low {
        AvailableFilter::AtMost(TokenAmount::parse_decimal(LOW_THRESHOLD)?)
    } else {
        AvailableFilter::All
    };
    let groups = ws.store().list_available_filtered(&filter);

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
    } else if groups.is_empty() {
        println!("No groups available.");
    } else {
        for group in &groups {
            println!("{}", render_available(group));
        }
    }
    Ok(0)
}

fn render_available(group: &AvailableGroup) -> String {
    format!(
        "{:<20} {:>8} WLD {:>6} members  {}",
        group.id.as_str(),
        group.min_balance.to_string(),
        group.members,
        group.name
    )
}

pub fn run_create(args: &CreateArgs, ws: &Workspace, json: bool) -> Result<u8> {
    let min_balance = TokenAmount::parse_decimal(&args.min_balance)
        .with_context(|| format!("invalid minimum balance {:?}", args.min_balance))?;
    let description = args.description.clone().unwrap_or_else(|| {
        format!(
            "Group created by {}",
            args.username.as_deref().unwrap_or("you")
        )
    });
    let avatar_tag = args.avatar.clone().unwrap_or_else(|| {
        avatar_for(rand::thread_rng().gen_range(0..AVATAR_PALETTE.len())).to_string()
    });

    let joined = ws.access().create_group_as_creator(NewGroup {
        name: args.name.clone(),
        description,
        min_balance,
        avatar_tag,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&joined)?);
    } else {
        println!("Created and joined {} ({})", joined.name, joined.id);
    }
    Ok(0)
}
