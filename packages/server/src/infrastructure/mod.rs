//! Infrastructure 層：ドメインのインターフェースの具体的な実装

pub mod dto;
pub mod geo;
pub mod message_pusher;
pub mod repository;
