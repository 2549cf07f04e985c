//! ドメイン層のエラー型

use thiserror::Error;

/// ピア ID の検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeerIdError {
    #[error("peer id must not be empty")]
    Empty,

    #[error("peer id '{0}' contains invalid characters")]
    InvalidCharacters(String),
}

/// Repository のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("peer '{0}' not found")]
    PeerNotFound(String),
}

/// 接続中のピアへのメッセージ送信エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("peer '{0}' is not connected")]
    ClientNotFound(String),

    #[error("peer '{0}' is already connected")]
    AlreadyRegistered(String),

    #[error("failed to encode message: {0}")]
    Encode(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}
