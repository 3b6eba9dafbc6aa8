//! # Group Store
//!
//! Two collections, available and joined, kept in memory behind a
//! `parking_lot::RwLock` and written through to a [`GroupStorage`].
//!
//! ## Invariants
//!
//! - Ids are unique within each collection.
//! - No id is in both collections. Joining moves a group in one write-locked
//!   step, so readers never see it in both or in neither.
//! - A mutation is persisted before it is committed in memory. Observers are
//!   notified after the lock is released.
//! - A group only becomes joined through a [`JoinGrant`], which only the
//!   [`AccessController`](crate::AccessController) issues.
//!
//! The lock is never held across an `.await`; every operation here is
//! synchronous.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use zkvip_core::{GroupId, Timestamp};

use crate::access::JoinGrant;
use crate::error::{StorageError, StoreError};
use crate::events::{ChangeHub, StoreEvent, Subscription};
use crate::model::{AvailableFilter, AvailableGroup, JoinedGroup, NewGroup};
use crate::seed::default_groups;
use crate::storage::{
    decode_record, encode_record, GroupStorage, MemoryStorage, AVAILABLE_KEY, JOINED_KEY,
};

#[derive(Debug, Default, Clone)]
struct Collections {
    available: Vec<AvailableGroup>,
    joined: Vec<JoinedGroup>,
    /// Whether the available record has ever been written.
    initialized: bool,
}

impl Collections {
    fn contains(&self, id: &GroupId) -> bool {
        self.available.iter().any(|g| &g.id == id) || self.joined.iter().any(|g| &g.id == id)
    }

    fn joined_ids(&self) -> HashSet<&GroupId> {
        self.joined.iter().map(|g| &g.id).collect()
    }

    /// The default groups minus any already joined.
    fn starter_groups(&self) -> Result<Vec<AvailableGroup>, StoreError> {
        let joined = self.joined_ids();
        Ok(default_groups()
            .map_err(|e| StoreError::InvalidArgument(e.to_string()))?
            .into_iter()
            .filter(|g| !joined.contains(&g.id))
            .collect())
    }
}

/// The membership store for one client instance.
pub struct GroupStore {
    storage: Arc<dyn GroupStorage>,
    state: RwLock<Collections>,
    hub: ChangeHub,
}

impl std::fmt::Debug for GroupStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("GroupStore")
            .field("available", &state.available.len())
            .field("joined", &state.joined.len())
            .field("initialized", &state.initialized)
            .finish()
    }
}

impl GroupStore {
    /// Load both collections from `storage`, repairing overlaps.
    pub fn open(storage: Arc<dyn GroupStorage>) -> Result<Self, StoreError> {
        let state = load(storage.as_ref())?;
        tracing::debug!(
            available = state.available.len(),
            joined = state.joined.len(),
            initialized = state.initialized,
            "group store opened"
        );
        Ok(Self {
            storage,
            state: RwLock::new(state),
            hub: ChangeHub::new(),
        })
    }

    /// An empty, uninitialized store over [`MemoryStorage`].
    pub fn in_memory() -> Self {
        Self {
            storage: Arc::new(MemoryStorage::new()),
            state: RwLock::new(Collections::default()),
            hub: ChangeHub::new(),
        }
    }

    // -- Queries -------------------------------------------------------------

    /// Available groups, optionally without ids already joined.
    pub fn list_available(&self, excluding_joined: bool) -> Vec<AvailableGroup> {
        let state = self.state.read();
        if !excluding_joined {
            return state.available.clone();
        }
        let joined = state.joined_ids();
        state
            .available
            .iter()
            .filter(|g| !joined.contains(&g.id))
            .cloned()
            .collect()
    }

    /// Available, not-joined groups admitted by `filter`.
    pub fn list_available_filtered(&self, filter: &AvailableFilter) -> Vec<AvailableGroup> {
        self.list_available(true)
            .into_iter()
            .filter(|g| filter.admits(g))
            .collect()
    }

    pub fn list_joined(&self) -> Vec<JoinedGroup> {
        self.state.read().joined.clone()
    }

    pub fn get_available(&self, id: &GroupId) -> Option<AvailableGroup> {
        self.state.read().available.iter().find(|g| &g.id == id).cloned()
    }

    pub fn get_joined(&self, id: &GroupId) -> Option<JoinedGroup> {
        self.state.read().joined.iter().find(|g| &g.id == id).cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.read().initialized
    }

    // -- Mutations -----------------------------------------------------------

    /// Add a new available group with zero members.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidArgument`] for an empty name, a name with no
    /// slug-able characters, or a zero minimum balance.
    /// [`StoreError::Duplicate`] when the derived id exists in either
    /// collection.
    pub fn create(&self, new: NewGroup) -> Result<AvailableGroup, StoreError> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidArgument(
                "group name must not be empty".to_string(),
            ));
        }
        if new.min_balance.is_zero() {
            return Err(StoreError::InvalidArgument(
                "minimum balance must be greater than zero".to_string(),
            ));
        }
        let id = GroupId::from_name(name)
            .map_err(|e| StoreError::InvalidArgument(e.to_string()))?;

        let group = AvailableGroup {
            id,
            name: name.to_string(),
            description: new.description,
            min_balance: new.min_balance,
            members: 0,
            avatar_tag: new.avatar_tag,
        };

        {
            let mut state = self.state.write();
            if state.contains(&group.id) {
                return Err(StoreError::Duplicate(group.id));
            }
            // A first create lands on top of the starter groups.
            let mut available = if state.initialized {
                state.available.clone()
            } else {
                state.starter_groups()?
            };
            if available.iter().any(|g| g.id == group.id) {
                return Err(StoreError::Duplicate(group.id));
            }
            available.push(group.clone());
            self.write(AVAILABLE_KEY, &available)?;
            state.available = available;
            state.initialized = true;
        }

        tracing::info!(group = %group.id, min_balance = %group.min_balance, "group created");
        self.hub.emit(StoreEvent::AvailableChanged);
        Ok(group)
    }

    /// Move the granted group from available to joined.
    ///
    /// Joining an id that is already joined returns the existing record
    /// unchanged.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the id is in neither collection.
    pub fn join(&self, grant: &JoinGrant) -> Result<JoinedGroup, StoreError> {
        let id = grant.group_id();
        let record = {
            let mut state = self.state.write();
            if let Some(existing) = state.joined.iter().find(|g| &g.id == id) {
                tracing::debug!(group = %id, "already joined");
                return Ok(existing.clone());
            }
            let pos = state
                .available
                .iter()
                .position(|g| &g.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;

            let mut available = state.available.clone();
            let record = JoinedGroup::from_available(available.remove(pos), Timestamp::now());
            let mut joined = state.joined.clone();
            joined.push(record.clone());

            // Joined first: an interrupted move leaves the id in both
            // records, which load repairs in favour of joined.
            self.write(JOINED_KEY, &joined)?;
            if let Err(e) = self.write(AVAILABLE_KEY, &available) {
                if let Err(rollback) = self.write(JOINED_KEY, &state.joined) {
                    tracing::warn!(group = %id, error = %rollback, "join rollback failed");
                }
                return Err(e.into());
            }
            state.available = available;
            state.joined = joined;
            record
        };

        tracing::info!(group = %id, basis = ?grant.basis(), "group joined");
        self.hub.emit(StoreEvent::JoinedChanged);
        self.hub.emit(StoreEvent::AvailableChanged);
        Ok(record)
    }

    /// Delete an id from the available collection. Returns whether anything
    /// was removed; an absent id is a no-op.
    pub fn remove(&self, id: &GroupId) -> Result<bool, StoreError> {
        {
            let mut state = self.state.write();
            let Some(pos) = state.available.iter().position(|g| &g.id == id) else {
                return Ok(false);
            };
            let mut available = state.available.clone();
            available.remove(pos);
            self.write(AVAILABLE_KEY, &available)?;
            state.available = available;
        }
        tracing::info!(group = %id, "available group removed");
        self.hub.emit(StoreEvent::AvailableChanged);
        Ok(true)
    }

    /// Set the activity summary of a joined group. No-op if not joined.
    pub fn record_message(
        &self,
        id: &GroupId,
        message: &str,
        sender: &str,
    ) -> Result<bool, StoreError> {
        self.update_joined(id, |g| {
            g.last_message = message.to_string();
            g.last_sender = sender.to_string();
        })
    }

    /// Add one unread message. No-op if not joined.
    pub fn increment_unread(&self, id: &GroupId) -> Result<bool, StoreError> {
        self.update_joined(id, |g| g.unread_count = g.unread_count.saturating_add(1))
    }

    /// Reset the unread count. No-op if not joined.
    pub fn clear_unread(&self, id: &GroupId) -> Result<bool, StoreError> {
        self.update_joined(id, |g| g.unread_count = 0)
    }

    fn update_joined(
        &self,
        id: &GroupId,
        f: impl FnOnce(&mut JoinedGroup),
    ) -> Result<bool, StoreError> {
        {
            let mut state = self.state.write();
            let Some(pos) = state.joined.iter().position(|g| &g.id == id) else {
                return Ok(false);
            };
            let mut joined = state.joined.clone();
            f(&mut joined[pos]);
            self.write(JOINED_KEY, &joined)?;
            state.joined = joined;
        }
        self.hub.emit(StoreEvent::JoinedChanged);
        Ok(true)
    }

    /// Populate the available collection with the starter groups if it has
    /// never been written. Returns whether seeding happened.
    pub fn seed_defaults(&self) -> Result<bool, StoreError> {
        {
            let mut state = self.state.write();
            if state.initialized {
                return Ok(false);
            }
            let defaults = state.starter_groups()?;
            self.write(AVAILABLE_KEY, &defaults)?;
            state.available = defaults;
            state.initialized = true;
        }
        tracing::info!("seeded default groups");
        self.hub.emit(StoreEvent::AvailableChanged);
        Ok(true)
    }

    /// Re-read both collections from storage and notify observers of both.
    pub fn refresh(&self) -> Result<(), StoreError> {
        let fresh = load(self.storage.as_ref())?;
        *self.state.write() = fresh;
        self.hub.emit(StoreEvent::AvailableChanged);
        self.hub.emit(StoreEvent::JoinedChanged);
        Ok(())
    }

    /// Observe changes until the subscription is dropped.
    #[must_use = "dropping the subscription unregisters the listener"]
    pub fn subscribe(&self, listener: impl Fn(StoreEvent) + Send + Sync + 'static) -> Subscription {
        self.hub.subscribe(listener)
    }

    fn write<T: serde::Serialize>(&self, key: &str, groups: &[T]) -> Result<(), StorageError> {
        let encoded = encode_record(key, groups)?;
        self.storage.write(key, &encoded)
    }
}

fn load(storage: &dyn GroupStorage) -> Result<Collections, StoreError> {
    let available_raw = storage.read(AVAILABLE_KEY)?;
    let initialized = available_raw.is_some();
    let available: Vec<AvailableGroup> = match available_raw {
        Some(raw) => decode_record(AVAILABLE_KEY, &raw)?,
        None => Vec::new(),
    };
    let joined: Vec<JoinedGroup> = match storage.read(JOINED_KEY)? {
        Some(raw) => decode_record(JOINED_KEY, &raw)?,
        None => Vec::new(),
    };
    Ok(repair(Collections {
        available,
        joined,
        initialized,
    }))
}

/// Drop duplicate ids within each collection and any available id that is
/// also joined.
fn repair(mut state: Collections) -> Collections {
    let mut seen = HashSet::new();
    state.joined.retain(|g| {
        let fresh = seen.insert(g.id.clone());
        if !fresh {
            tracing::warn!(group = %g.id, "dropping duplicate joined record");
        }
        fresh
    });

    let joined = seen;
    let mut seen = HashSet::new();
    state.available.retain(|g| {
        if joined.contains(&g.id) {
            tracing::warn!(group = %g.id, "dropping available record already joined");
            return false;
        }
        let fresh = seen.insert(g.id.clone());
        if !fresh {
            tracing::warn!(group = %g.id, "dropping duplicate available record");
        }
        fresh
    });
    state
}
