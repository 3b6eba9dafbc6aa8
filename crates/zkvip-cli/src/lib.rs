//! # zkvip-cli: Command-Line Client
//!
//! Drives a file-backed group store from the terminal.
//!
//! ## Subcommands
//!
//! - `zkvip list [--low]`: groups you can join.
//! - `zkvip create <name> --min <WLD>`: create a group and join it as creator.
//! - `zkvip join <group>`: prove your balance and join.
//! - `zkvip inbox`: joined groups with their latest activity.
//! - `zkvip message <group> <text>` / `zkvip read <group>`: update activity.
//!
//! Handlers parse arguments and delegate to `zkvip-groups`. State lives in
//! `ZKVIP_STATE_DIR` (default `./.zkvip`).

pub mod groups;
pub mod inbox;
pub mod join;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use zkvip_core::GroupId;
use zkvip_groups::{AccessController, FileStorage, GroupStore};

/// Default state directory, relative to the working directory.
pub const DEFAULT_STATE_DIR: &str = ".zkvip";

/// Store and access controller over one state directory.
#[derive(Debug)]
pub struct Workspace {
    store: Arc<GroupStore>,
    access: Arc<AccessController>,
}

impl Workspace {
    /// Open the store under `state_dir`, seeding the starter groups on first
    /// use.
    pub fn open(state_dir: &Path) -> Result<Self> {
        let storage = FileStorage::open(state_dir)
            .with_context(|| format!("opening state directory {}", state_dir.display()))?;
        let store = GroupStore::open(Arc::new(storage)).context("loading group store")?;
        if store.seed_defaults().context("seeding default groups")? {
            tracing::info!(state_dir = %state_dir.display(), "initialized new state directory");
        }
        let store = Arc::new(store);
        let access = Arc::new(AccessController::new(Arc::clone(&store)));
        Ok(Self { store, access })
    }

    pub fn store(&self) -> &Arc<GroupStore> {
        &self.store
    }

    pub fn access(&self) -> &Arc<AccessController> {
        &self.access
    }
}

/// Accept a group id or a display name that normalizes to one.
pub fn parse_group(raw: &str) -> Result<GroupId> {
    GroupId::from_name(raw).with_context(|| format!("invalid group {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_seeds_once() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::open(dir.path()).unwrap();
        assert_eq!(ws.store().list_available(true).len(), 2);
        ws.store().remove(&parse_group("zk-builders").unwrap()).unwrap();

        let reopened = Workspace::open(dir.path()).unwrap();
        assert_eq!(reopened.store().list_available(true).len(), 1);
    }

    #[test]
    fn group_names_normalize() {
        assert_eq!(parse_group("ZK Builders").unwrap().as_str(), "zk-builders");
        assert!(parse_group("???").is_err());
    }
}
