//! Change notifications.
//!
//! Listeners run synchronously on the mutating thread, after the store has
//! persisted the change and released its lock, so a listener may read the
//! store again. Dropping a [`Subscription`] unregisters its listener.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Which collection changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreEvent {
    AvailableChanged,
    JoinedChanged,
}

type Listener = Arc<dyn Fn(StoreEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    listeners: Mutex<BTreeMap<u64, Listener>>,
    next_id: AtomicU64,
}

/// Fan-out point for [`StoreEvent`]s.
#[derive(Clone, Default)]
pub struct ChangeHub {
    registry: Arc<Registry>,
}

impl std::fmt::Debug for ChangeHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` until the returned subscription is dropped.
    #[must_use = "dropping the subscription unregisters the listener"]
    pub fn subscribe(&self, listener: impl Fn(StoreEvent) + Send + Sync + 'static) -> Subscription {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry.listeners.lock().insert(id, Arc::new(listener));
        Subscription {
            registry: Arc::downgrade(&self.registry),
            id,
        }
    }

    /// Deliver `event` to every current listener.
    pub fn emit(&self, event: StoreEvent) {
        // Snapshot so listeners can subscribe or unsubscribe re-entrantly.
        let listeners: Vec<Listener> = self.registry.listeners.lock().values().cloned().collect();
        for listener in listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.listeners.lock().len()
    }
}

/// Handle that keeps a listener registered.
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<Registry>,
    id: u64,
}

impl Subscription {
    /// Unregister now.
    pub fn dispose(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.listeners.lock().remove(&self.id);
        }
    }
}
