//! InMemory Repository 実装

pub mod matchmaking;

pub use matchmaking::InMemoryMatchmakingRepository;
