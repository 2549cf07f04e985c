//! Data Transfer Objects (DTOs) for the matchmaking server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: signaling envelopes exchanged over WebSocket
//! - `http`: HTTP API response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
