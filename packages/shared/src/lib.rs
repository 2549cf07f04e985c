//! Utilities shared by the Chat Roulette packages.

pub mod logger;
pub mod time;
