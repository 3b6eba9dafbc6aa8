//! # Inbox Subcommands
//!
//! Joined groups and their activity summary. Operations on a group you have
//! not joined change nothing and exit with status 1.

use anyhow::Result;
use clap::Args;
use zkvip_groups::JoinedGroup;

use crate::{parse_group, Workspace};

/// Arguments for `zkvip message`.
#[derive(Args, Debug)]
pub struct MessageArgs {
    /// Group id or name.
    pub group: String,

    pub text: String,

    #[arg(long, default_value = "anon")]
    pub sender: String,
}

/// Arguments for `zkvip read`.
#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Group id or name.
    pub group: String,
}

fn render_joined(group: &JoinedGroup) -> String {
    let badge = match group.unread_count {
        0 => String::from("   "),
        n => format!("({n})"),
    };
    format!(
        "{badge} {:<24} {}: {}",
        group.name, group.last_sender, group.last_message
    )
}

pub fn run_inbox(ws: &Workspace, json: bool) -> Result<u8> {
    let joined = ws.store().list_joined();
    if json {
        println!("{}", serde_json::to_string_pretty(&joined)?);
    } else if joined.is_empty() {
        println!("You have not joined any groups yet.");
    } else {
        for group in &joined {
            println!("{}", render_joined(group));
        }
    }
    Ok(0)
}

/// Record an incoming message: it becomes the summary and counts as unread.
pub fn run_message(args: &MessageArgs, ws: &Workspace) -> Result<u8> {
    let id = parse_group(&args.group)?;
    if !ws.store().record_message(&id, &args.text, &args.sender)? {
        tracing::warn!(group = %id, "not a member; message ignored");
        return Ok(1);
    }
    ws.store().increment_unread(&id)?;
    Ok(0)
}

pub fn run_read(args: &ReadArgs, ws: &Workspace) -> Result<u8> {
    let id = parse_group(&args.group)?;
    if !ws.store().clear_unread(&id)? {
        tracing::warn!(group = %id, "not a member; nothing to mark read");
        return Ok(1);
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::{run_create, CreateArgs};

    fn joined_workspace(dir: &std::path::Path) -> Workspace {
        let ws = Workspace::open(dir).unwrap();
        run_create(
            &CreateArgs {
                name: "Night Owls".into(),
                min_balance: "2".into(),
                description: None,
                avatar: None,
                username: Some("ana".into()),
            },
            &ws,
            false,
        )
        .unwrap();
        ws
    }

    #[test]
    fn message_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let ws = joined_workspace(dir.path());
        let msg = MessageArgs {
            group: "night-owls".into(),
            text: "gm".into(),
            sender: "bo".into(),
        };
        assert_eq!(run_message(&msg, &ws).unwrap(), 0);
        assert_eq!(run_message(&msg, &ws).unwrap(), 0);

        let group = &ws.store().list_joined()[0];
        assert_eq!(group.unread_count, 2);
        assert_eq!(group.last_message, "gm");
        assert_eq!(group.description, "Group created by ana");
        assert!(render_joined(group).starts_with("(2)"));

        let read = ReadArgs {
            group: "Night Owls".into(),
        };
        assert_eq!(run_read(&read, &ws).unwrap(), 0);
        assert_eq!(ws.store().list_joined()[0].unread_count, 0);
    }

    #[test]
    fn non_member_operations_are_noops() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::open(dir.path()).unwrap();
        let msg = MessageArgs {
            group: "zk-builders".into(),
            text: "hi".into(),
            sender: "x".into(),
        };
        assert_eq!(run_message(&msg, &ws).unwrap(), 1);
        let read = ReadArgs {
            group: "zk-builders".into(),
        };
        assert_eq!(run_read(&read, &ws).unwrap(), 1);
        assert!(ws.store().list_joined().is_empty());
        assert_eq!(run_inbox(&ws, false).unwrap(), 0);
    }
}
