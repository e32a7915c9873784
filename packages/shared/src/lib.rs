//! Shared building blocks for the Hiroba relay server and client.
//!
//! - `protocol`: the JSON frame exchanged over the websocket
//! - `logger`: tracing subscriber setup for the binaries
//! - `time`: clock abstraction and display formatting

pub mod logger;
pub mod protocol;
pub mod time;
