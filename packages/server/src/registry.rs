//! Registry of live websocket connections.
//!
//! One registry exists per server process. Each accepted connection is
//! registered right after the websocket handshake completes and removed
//! exactly once when it ends, whatever the cause. Removal is tied to the
//! lifetime of a [`Registration`] guard so it also happens when the
//! connection task panics or is aborted.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use tokio::sync::mpsc;
use uuid::Uuid;

/// Outbound queue of a connection, drained into its socket by the pusher task.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Opaque identity of one accepted connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Allocate a fresh, never reused id
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Thread-safe set of live connections.
///
/// Every operation takes the same lock, so mutations and snapshots never
/// interleave. The lock is never held across an `.await`.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConnectionId, PusherChannel>> {
        // No operation can leave the map half-updated, so a poisoned lock is still consistent.
        self.connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a connection under the given id.
    pub fn add(&self, id: ConnectionId, channel: PusherChannel) {
        let mut connections = self.lock();
        connections.insert(id, channel);
        tracing::debug!(
            "Connection '{}' added to registry ({} live)",
            id,
            connections.len()
        );
    }

    /// Deregister a connection. Returns `false` if it was not registered.
    pub fn remove(&self, id: &ConnectionId) -> bool {
        let mut connections = self.lock();
        let removed = connections.remove(id).is_some();
        if removed {
            tracing::debug!(
                "Connection '{}' removed from registry ({} live)",
                id,
                connections.len()
            );
        }
        removed
    }

    /// Point-in-time copy of every registered connection except `exclude`.
    ///
    /// The copy is taken under the lock and can be iterated freely while
    /// other tasks keep adding and removing connections.
    pub fn snapshot_excluding(&self, exclude: &ConnectionId) -> Vec<(ConnectionId, PusherChannel)> {
        self.lock()
            .iter()
            .filter(|(id, _)| *id != exclude)
            .map(|(id, channel)| (*id, channel.clone()))
            .collect()
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Register a new connection under a freshly generated id.
    ///
    /// The connection stays registered for as long as the returned guard lives.
    pub fn register(self: &Arc<Self>, channel: PusherChannel) -> Registration {
        let id = ConnectionId::generate();
        self.add(id, channel);
        Registration {
            id,
            registry: Arc::clone(self),
        }
    }
}

/// Membership of one connection in the registry; deregisters on drop.
pub struct Registration {
    id: ConnectionId,
    registry: Arc<ConnectionRegistry>,
}

impl Registration {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.remove(&self.id);
    }
}
