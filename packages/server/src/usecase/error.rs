//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::MessagePushError;

/// 新しいピア接続の受け付けに失敗した
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("peer id '{0}' is already connected")]
    DuplicatePeerId(String),

    #[error("failed to register transport channel: {0}")]
    Transport(String),
}

/// エンベロープの宛先への中継に失敗した
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("destination '{0}' is not connected")]
    DestinationNotFound(String),

    #[error("failed to encode envelope: {0}")]
    Encode(String),

    #[error(transparent)]
    Push(#[from] MessagePushError),
}
