//! Chat Roulette matchmaking and signaling server.
//!
//! Peers connect over WebSocket, get their country detected from their IP, and are
//! paired through single-slot waiting rooms keyed by (country, purpose). SDP offers,
//! answers and ICE candidates are relayed between the paired peers.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
