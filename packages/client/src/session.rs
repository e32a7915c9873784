//! Per-session client state.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Display name used when the user submits an empty name.
pub const DEFAULT_USER_NAME: &str = "User";

/// Map the raw result of name entry to the session's user name.
///
/// `None` means the user aborted entry and the client should shut down.
pub fn resolve_user_name(entered: Option<String>) -> Option<String> {
    let name = entered?;
    let name = name.trim();
    if name.is_empty() {
        Some(DEFAULT_USER_NAME.to_string())
    } else {
        Some(name.to_string())
    }
}

/// Liveness of the connection, cleared by the inbound task when it stops.
#[derive(Debug, Clone)]
pub struct ConnectionFlag(Arc<AtomicBool>);

impl ConnectionFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn mark_lost(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for ConnectionFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// State owned by the interactive loop.
#[derive(Debug)]
pub struct ClientSessionState {
    user_name: String,
    input_text: String,
    connection: ConnectionFlag,
}

impl ClientSessionState {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            input_text: String::new(),
            connection: ConnectionFlag::new(),
        }
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn connection(&self) -> &ConnectionFlag {
        &self.connection
    }

    pub fn connection_alive(&self) -> bool {
        self.connection.is_alive()
    }

    /// Append a printable character to the input line; control characters are ignored.
    pub fn push_char(&mut self, c: char) {
        if !c.is_control() {
            self.input_text.push(c);
        }
    }

    /// Remove the last character of the input line, if any.
    pub fn erase(&mut self) {
        self.input_text.pop();
    }

    /// Take the input line for submission, leaving it empty.
    ///
    /// Returns `None` when there is nothing to submit.
    pub fn take_input(&mut self) -> Option<String> {
        if self.input_text.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.input_text))
        }
    }
}
