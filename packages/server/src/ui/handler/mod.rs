//! Request handlers.

mod http;
mod websocket;

pub use http::{connection_count, health_check};
pub use websocket::websocket_handler;
