//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - WebSocket 接続ごとの `UnboundedSender` を管理
//! - ドメインの送信メッセージを JSON にエンコードしてピアへ送信（push_to）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`src/ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{MessagePushError, MessagePusher, OutboundMessage, PeerId, PusherChannel};
use crate::infrastructure::dto::conversion::encode_outbound_message;

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new();
/// pusher.register_client(peer_id.clone(), tx).await?;
/// pusher.push_to(peer_id.as_str(), &OutboundMessage::Open).await?;
/// ```
#[derive(Debug, Default)]
pub struct WebSocketMessagePusher {
    /// 接続中のピアの WebSocket sender
    ///
    /// Key: peer_id
    /// Value: PusherChannel
    clients: Mutex<HashMap<PeerId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(
        &self,
        peer_id: PeerId,
        sender: PusherChannel,
    ) -> Result<(), MessagePushError> {
        let mut clients = self.clients.lock().await;
        if clients.contains_key(peer_id.as_str()) {
            return Err(MessagePushError::AlreadyRegistered(peer_id.into_string()));
        }
        tracing::debug!("Peer '{}' registered to MessagePusher", peer_id);
        clients.insert(peer_id, sender);
        Ok(())
    }

    async fn unregister_client(&self, peer_id: &PeerId) {
        let mut clients = self.clients.lock().await;
        clients.remove(peer_id.as_str());
        tracing::debug!("Peer '{}' unregistered from MessagePusher", peer_id);
    }

    async fn is_connected(&self, peer_id: &str) -> bool {
        self.clients.lock().await.contains_key(peer_id)
    }

    async fn push_to(
        &self,
        peer_id: &str,
        message: &OutboundMessage,
    ) -> Result<(), MessagePushError> {
        let content =
            encode_outbound_message(message).map_err(|e| MessagePushError::Encode(e.to_string()))?;
        let clients = self.clients.lock().await;

        let sender = clients
            .get(peer_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(peer_id.to_string()))?;
        sender
            .send(content)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed message to peer '{}'", peer_id);
        Ok(())
    }
}
