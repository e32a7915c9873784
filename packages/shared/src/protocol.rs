//! Wire protocol shared by the relay server and the chat client.
//!
//! Every websocket text frame carries one JSON object:
//!
//! ```json
//! { "sender": "alice", "text": "hi" }
//! ```
//!
//! There is no envelope version, message id or acknowledgement frame. The
//! server forwards the raw frame it received, so extra fields added by a
//! client reach the other clients untouched.

use serde::{Deserialize, Serialize, de::Error as _};
use thiserror::Error;

/// Display name reserved for messages generated locally by the client.
pub const SYSTEM_SENDER: &str = "System";

/// Default host the server binds to and the client connects to.
pub const DEFAULT_HOST: &str = "localhost";

/// Default port the server binds to and the client connects to.
pub const DEFAULT_PORT: u16 = 8765;

/// Errors raised while encoding or decoding a frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The payload is not a JSON object with string `sender` and `text` fields.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One chat message as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Display name of the author
    pub sender: String,
    /// Message body
    pub text: String,
}

impl WireMessage {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
        }
    }

    /// Serialize into a text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a text frame. Unknown fields are ignored.
    ///
    /// Only the object form is accepted; serde would otherwise also take
    /// `["alice","hi"]` as a `WireMessage`.
    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        let value: serde_json::Value = serde_json::from_str(frame)?;
        if !value.is_object() {
            return Err(serde_json::Error::custom("expected a JSON object").into());
        }
        Ok(serde_json::from_value(value)?)
    }
}
