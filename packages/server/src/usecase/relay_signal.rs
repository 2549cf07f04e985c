//! UseCase: SDP / ICE エンベロープの中継
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelaySignalUseCase::execute() メソッド
//! - `src` を付与したエンベロープの宛先への転送
//!
//! ### なぜこのテストが必要か
//! - WebRTC のネゴシエーションはサーバーを経由して相手に届く必要がある
//! - 宛先が切断済みの場合、送信者に EXPIRE で知らせる必要がある
//!
//! ### どのような状況を想定しているか
//! - 正常系：OFFER の転送
//! - 異常系：宛先が接続していない
//! - エッジケース：LEAVE の宛先が存在しない（EXPIRE を返さない）

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{MessageKind, MessagePushError, MessagePusher, OutboundMessage, PeerId};

use super::{error::RelayError, notify::push_message};

/// エンベロープ中継のユースケース
pub struct RelaySignalUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelaySignalUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// エンベロープを `dst` に転送する
    ///
    /// # Arguments
    ///
    /// * `src` - 送信者のピア ID（エンベロープの `src` に設定される）
    /// * `kind` - エンベロープの種別
    /// * `dst` - 宛先のピア ID
    /// * `envelope` - 受信したエンベロープ（JSON オブジェクト）
    pub async fn execute(
        &self,
        src: &PeerId,
        kind: &MessageKind,
        dst: &str,
        mut envelope: Value,
    ) -> Result<(), RelayError> {
        let Some(fields) = envelope.as_object_mut() else {
            return Err(RelayError::Encode("envelope is not a JSON object".to_string()));
        };
        fields.insert("src".to_string(), Value::String(src.to_string()));

        match self
            .message_pusher
            .push_to(dst, &OutboundMessage::Relayed(envelope))
            .await
        {
            Ok(()) => {
                tracing::debug!("Relayed '{}' from '{}' to '{}'", kind.as_str(), src, dst);
                Ok(())
            }
            Err(MessagePushError::ClientNotFound(_)) => {
                if !matches!(kind, MessageKind::Leave | MessageKind::Expire) {
                    let expire = OutboundMessage::Expire {
                        src: dst.to_string(),
                    };
                    push_message(self.message_pusher.as_ref(), src.as_str(), &expire).await;
                }
                Err(RelayError::DestinationNotFound(dst.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
