//! MessagePusher trait 定義
//!
//! 接続中のピアへ制御メッセージを送るためのインターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{MessagePushError, OutboundMessage, PeerId};

/// ピアへのメッセージ送信チャンネル（送信側）
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// MessagePusher trait
///
/// UseCase 層はこの trait に依存し、WebSocket などの具体的な送信手段には依存しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// ピアの送信チャンネルを登録する。既に登録済みの ID はエラー
    async fn register_client(
        &self,
        peer_id: PeerId,
        sender: PusherChannel,
    ) -> Result<(), MessagePushError>;

    /// ピアの送信チャンネルを登録解除する
    async fn unregister_client(&self, peer_id: &PeerId);

    /// ピアが接続中かどうか
    async fn is_connected(&self, peer_id: &str) -> bool;

    /// 特定のピアにメッセージを送信
    async fn push_to(
        &self,
        peer_id: &str,
        message: &OutboundMessage,
    ) -> Result<(), MessagePushError>;
}
