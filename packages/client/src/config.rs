//! Client configuration.

use std::time::Duration;

use hiroba_shared::protocol::{DEFAULT_HOST, DEFAULT_PORT};

use crate::history::MAX_MESSAGES;

/// Longest time the interactive loop waits for a key before redrawing.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// `ws://localhost:8765`
pub fn default_server_url() -> String {
    format!("ws://{}:{}", DEFAULT_HOST, DEFAULT_PORT)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// WebSocket URL of the relay server
    pub url: String,
    /// Upper bound of one render + input poll cycle
    pub poll_interval: Duration,
    /// Number of messages kept in the chat history
    pub max_messages: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_messages: MAX_MESSAGES,
        }
    }
}
