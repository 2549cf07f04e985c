//! HTTP / WebSocket entry points of the matchmaking server.

mod client_ip;
mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
