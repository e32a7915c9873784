//! Hiroba relay server library.
//!
//! Accepts websocket connections and rebroadcasts every text frame a client
//! sends to all other connected clients.

pub mod config;
pub mod error;
pub mod registry;
pub mod relay;
pub mod ui;

pub use config::ServerConfig;
pub use error::ServerError;
pub use registry::{ConnectionId, ConnectionRegistry, Registration};
pub use relay::{BroadcastRelay, FanOut, RelayState};
pub use ui::Server;
