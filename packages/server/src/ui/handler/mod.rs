//! Request handlers.

mod http;
mod websocket;

pub use http::{debug_state, generate_peer_id, health_check, peer_count};
pub use websocket::websocket_handler;
