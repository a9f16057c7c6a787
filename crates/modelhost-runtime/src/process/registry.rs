//! In-memory registry of tracked servers.

use modelhost_core::{ServerId, ServerStatus, TrackedServer};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Map from server identifier to tracked server state.
///
/// The registry is the single source of truth for which servers the manager
/// believes are alive. It is shared through `Arc` by the launcher, the
/// terminator and the output reader tasks; the lock is never held across an
/// `.await`, so every method is a short synchronous critical section.
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    servers: Mutex<HashMap<ServerId, TrackedServer>>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ServerId, TrackedServer>> {
        // A panic while holding the lock cannot leave the map half-written.
        self.servers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Track `entry` under its own identifier, returning any entry it replaced.
    pub fn register(&self, entry: TrackedServer) -> Option<TrackedServer> {
        debug!(id = %entry.id, port = %entry.port, backend = %entry.backend, "Registering server");
        self.lock().insert(entry.id, entry)
    }

    /// Snapshot of one entry.
    pub fn get(&self, id: ServerId) -> Option<TrackedServer> {
        self.lock().get(&id).cloned()
    }

    pub fn contains(&self, id: ServerId) -> bool {
        self.lock().contains_key(&id)
    }

    /// Stop tracking `id`.
    pub fn remove(&self, id: ServerId) -> Option<TrackedServer> {
        let removed = self.lock().remove(&id);
        if removed.is_some() {
            debug!(id = %id, "Removed server from registry");
        }
        removed
    }

    /// Record that the process behind `id` exited and stop tracking it.
    ///
    /// Returns the final entry with status `stopped`, or `None` if a
    /// terminator already removed it.
    pub fn mark_exited(&self, id: ServerId) -> Option<TrackedServer> {
        self.remove(id).map(|mut entry| {
            entry.status = ServerStatus::Stopped;
            entry
        })
    }

    /// Apply `transition` to the status of `id` under a single lock.
    ///
    /// Returns a snapshot of the updated entry, or `None` if `id` is unknown.
    pub fn update_status<F>(&self, id: ServerId, transition: F) -> Option<TrackedServer>
    where
        F: FnOnce(ServerStatus) -> ServerStatus,
    {
        let mut servers = self.lock();
        let entry = servers.get_mut(&id)?;
        let next = transition(entry.status);
        if next != entry.status {
            debug!(id = %id, from = %entry.status, to = %next, "Server status changed");
            entry.status = next;
        }
        Some(entry.clone())
    }

    /// Snapshot of every tracked server, in no particular order.
    pub fn list_all(&self) -> Vec<TrackedServer> {
        self.lock().values().cloned().collect()
    }

    /// Identifiers of every tracked server.
    pub fn ids(&self) -> Vec<ServerId> {
        self.lock().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
