//! Bounded chat history shared between the network and render paths.

use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, Local};
use hiroba_shared::{
    protocol::{SYSTEM_SENDER, WireMessage},
    time::format_clock_time,
};

/// Default number of messages kept in memory.
pub const MAX_MESSAGES: usize = 100;

/// One line of chat history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Local time the message was created or received
    pub timestamp: DateTime<Local>,
    /// Display name of the author, or `System` for local notices
    pub sender: String,
    pub text: String,
}

impl ChatMessage {
    pub fn new(
        timestamp: DateTime<Local>,
        sender: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            sender: sender.into(),
            text: text.into(),
        }
    }

    /// A notice generated by the client itself.
    pub fn system(timestamp: DateTime<Local>, text: impl Into<String>) -> Self {
        Self::new(timestamp, SYSTEM_SENDER, text)
    }

    /// A message received from the relay.
    pub fn from_wire(message: WireMessage, timestamp: DateTime<Local>) -> Self {
        Self::new(timestamp, message.sender, message.text)
    }

    pub fn is_system(&self) -> bool {
        self.sender == SYSTEM_SENDER
    }

    /// `[HH:MM:SS] sender: text`
    pub fn format_line(&self) -> String {
        format!(
            "[{}] {}: {}",
            format_clock_time(&self.timestamp),
            self.sender,
            self.text
        )
    }
}

/// Append-only, FIFO-trimmed sequence of messages.
///
/// Appends may come from the inbound task and the interactive loop at the
/// same time; the render path reads through [`snapshot_for_render`]. All of
/// them go through one short-lived lock, never held across an `.await`.
///
/// [`snapshot_for_render`]: ChatHistoryBuffer::snapshot_for_render
#[derive(Debug)]
pub struct ChatHistoryBuffer {
    messages: Mutex<VecDeque<ChatMessage>>,
    capacity: usize,
}

impl ChatHistoryBuffer {
    pub fn new() -> Self {
        Self::with_capacity(MAX_MESSAGES)
    }

    /// Create a buffer keeping at most `capacity` messages (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            messages: Mutex::new(VecDeque::with_capacity(capacity + 1)),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<ChatMessage>> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a message, evicting the oldest ones beyond capacity.
    pub fn append(&self, message: ChatMessage) {
        let mut messages = self.lock();
        messages.push_back(message);
        while messages.len() > self.capacity {
            messages.pop_front();
        }
    }

    /// Point-in-time copy, oldest first.
    pub fn snapshot_for_render(&self) -> Vec<ChatMessage> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ChatHistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}
