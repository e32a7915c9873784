//! Terminal chat client for the Hiroba relay.
//!
//! The client keeps a bounded in-memory history and runs two activities on
//! one connection: an inbound task appending relayed messages and an
//! interactive loop that renders, reads keys and sends what the user types.

pub mod config;
pub mod duplex;
pub mod error;
pub mod history;
pub mod prompt;
pub mod runner;
pub mod session;
pub mod terminal;
pub mod transport;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use config::ClientConfig;
pub use duplex::{ClientDuplexLoop, DuplexOutcome};
pub use error::ClientError;
pub use history::{ChatHistoryBuffer, ChatMessage, MAX_MESSAGES};
pub use runner::{run_client, run_session};
pub use session::ClientSessionState;
pub use terminal::{Key, Screen, Terminal, View};
