//! Per-connection broadcast of inbound frames to every other connection.

use std::{fmt, sync::Arc};

use hiroba_shared::protocol::{ProtocolError, WireMessage};

use crate::registry::{ConnectionId, ConnectionRegistry};

/// Phase of a connection's receive loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    AwaitingMessage,
    Forwarding,
    Closed,
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelayState::AwaitingMessage => "awaiting-message",
            RelayState::Forwarding => "forwarding",
            RelayState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOut {
    /// Recipients whose outbound queue accepted the frame
    pub delivered: usize,
    /// Recipients that had already gone away
    pub failed: usize,
}

/// Forwards frames from one connection to all the others.
#[derive(Clone)]
pub struct BroadcastRelay {
    registry: Arc<ConnectionRegistry>,
}

impl BroadcastRelay {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Validate `raw` and forward it, unmodified, to every connection except `from`.
    ///
    /// A malformed frame is returned as an error and nothing is forwarded;
    /// the caller is expected to close the offending connection. Delivery
    /// is best-effort: a failed send to one recipient is logged and skipped,
    /// never retried, and does not affect the others.
    pub fn relay_frame(&self, from: &ConnectionId, raw: &str) -> Result<FanOut, ProtocolError> {
        let message = WireMessage::decode(raw)?;

        let recipients = self.registry.snapshot_excluding(from);
        let mut fan_out = FanOut::default();
        if recipients.is_empty() {
            tracing::debug!("No other connections to forward '{}' to", message.sender);
            return Ok(fan_out);
        }

        for (id, channel) in recipients {
            match channel.send(raw.to_owned()) {
                Ok(()) => fan_out.delivered += 1,
                Err(e) => {
                    tracing::warn!("Failed to forward message to connection '{}': {}", id, e);
                    fan_out.failed += 1;
                }
            }
        }

        tracing::info!(
            "Broadcasted message from '{}' to {} connection(s) ({} failed)",
            message.sender,
            fan_out.delivered,
            fan_out.failed
        );

        Ok(fan_out)
    }
}
