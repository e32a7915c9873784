//! Error types for the relay server.

use std::io;

use thiserror::Error;

/// Process-level server errors
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// The accept loop failed
    #[error("server error: {0}")]
    Serve(#[from] io::Error),
}
