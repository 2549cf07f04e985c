//! UseCase 共通の送信ヘルパー

use crate::domain::{MessagePusher, OutboundMessage};

/// `peer_id` にメッセージを送信する
///
/// 送信失敗はログに記録するだけで呼び出し元には返さない。
/// 1 ピアのチャンネルが閉じていても他のピアの処理は継続する。
pub(crate) async fn push_message(
    message_pusher: &dyn MessagePusher,
    peer_id: &str,
    message: &OutboundMessage,
) {
    if let Err(e) = message_pusher.push_to(peer_id, message).await {
        tracing::warn!("Failed to send {:?} to '{}': {}", message, peer_id, e);
    }
}
