//! Error types for the chat client.

use std::io;

use rustyline::error::ReadlineError;
use thiserror::Error;

use crate::transport::TransportError;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The initial connection could not be established
    #[error("could not connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: TransportError,
    },

    /// Transport failure after the connection was established
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Terminal I/O failure
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),

    /// The name prompt failed
    #[error("name prompt failed: {0}")]
    Readline(#[from] ReadlineError),

    /// A background task panicked or was cancelled
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
