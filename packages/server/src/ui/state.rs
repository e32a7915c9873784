//! Server state shared by the handlers.

use std::sync::Arc;

use crate::{registry::ConnectionRegistry, relay::BroadcastRelay};

/// Shared application state
pub struct AppState {
    /// Live connections of this server process
    pub registry: Arc<ConnectionRegistry>,
    /// Fan-out over `registry`
    pub relay: BroadcastRelay,
}

impl AppState {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        let relay = BroadcastRelay::new(Arc::clone(&registry));
        Self { registry, relay }
    }
}
