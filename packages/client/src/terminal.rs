//! Render/input collaborator consumed by the duplex loop.

use std::{io, time::Duration};

use async_trait::async_trait;

use crate::history::ChatMessage;

/// Notice shown in place of the chat banner once the connection is gone.
pub const CONNECTION_LOST_NOTICE: &str = "Connection to server lost. Press ESC to exit.";

/// Banner shown above the chat history.
pub fn chat_notice(max_messages: usize) -> String {
    format!(
        "Your session is not stored anywhere and ends when you leave. Only the latest {} messages are kept.",
        max_messages
    )
}

/// Input event, already mapped from the terminal's key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Send the input line
    Submit,
    /// Delete the last character of the input line
    Erase,
    /// Leave the chat
    Cancel,
    /// Printable character
    Char(char),
    Other,
}

/// Which screen to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Normal chat view
    Chat,
    /// The connection dropped mid-session; the last chat view stays visible
    ConnectionLost,
    /// The initial connection failed
    ConnectFailed,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub screen: Screen,
    pub notice: &'a str,
    pub history: &'a [ChatMessage],
    pub input_text: &'a str,
    pub user_name: &'a str,
}

#[async_trait]
pub trait Terminal: Send {
    /// Draw one frame. Must not block on anything but the terminal itself.
    fn render(&mut self, view: &View<'_>) -> io::Result<()>;

    /// Wait at most `timeout` for the next key; `None` if none arrived.
    async fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<Key>>;
}
