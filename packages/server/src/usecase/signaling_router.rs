//! UseCase: シグナリングメッセージのディスパッチ
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SignalingMessageRouter::route() メソッド
//! - メッセージ種別ごとの状態更新と応答メッセージ
//!
//! ### なぜこのテストが必要か
//! - NEW_REMOTE_PEER は要求ごとに必ず 1 回返す必要がある（相手がいない場合も空で返す）
//! - 国・目的の変更時に旧スロットの待機が解除されることを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：マッチング、国・目的の変更、ANSWER への応答
//! - 異常系：未登録ピアからのメッセージ
//! - エッジケース：未知のメッセージ種別、送信失敗

use std::sync::Arc;

use crate::domain::{
    MatchmakingRepository, MessagePusher, OutboundMessage, PeerId, PeerUpdate, SignalingMessage,
};

use super::notify::push_message;

/// 制御メッセージをレジストリ・マッチャーの操作に振り分ける
pub struct SignalingMessageRouter {
    repository: Arc<dyn MatchmakingRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl SignalingMessageRouter {
    pub fn new(
        repository: Arc<dyn MatchmakingRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 1 件の制御メッセージを処理する
    pub async fn route(&self, peer_id: &PeerId, message: SignalingMessage) {
        match message {
            SignalingMessage::NewRemotePeerRequest { updates } => {
                self.request_remote_peer(peer_id, updates).await
            }
            SignalingMessage::CountrySet { country_code } => {
                self.update_peer(peer_id, PeerUpdate::CountryCode(country_code))
                    .await
            }
            SignalingMessage::PurposeSet { purpose } => {
                self.update_peer(peer_id, PeerUpdate::Purpose(purpose)).await
            }
            SignalingMessage::Answer { dst } => self.notify_remote_country(peer_id, dst).await,
            SignalingMessage::Relayed(kind) => {
                tracing::debug!("'{}' from '{}' handled by relay", kind.as_str(), peer_id);
            }
            SignalingMessage::Heartbeat => {
                tracing::debug!("Heartbeat from '{}'", peer_id);
            }
            SignalingMessage::Unknown(kind) => {
                tracing::warn!("Unknown message type '{}' from '{}'", kind, peer_id);
            }
        }
    }

    async fn request_remote_peer(&self, peer_id: &PeerId, updates: Vec<PeerUpdate>) {
        let matched = match self.repository.request_match(peer_id, updates).await {
            Ok(matched) => matched,
            Err(e) => {
                tracing::warn!("Match request from unregistered peer: {}", e);
                None
            }
        };

        let response = match matched {
            Some(matched) => {
                tracing::info!("Matched '{}' with '{}'", peer_id, matched.peer_id);
                OutboundMessage::NewRemotePeer {
                    peer_id: matched.peer_id.into_string(),
                    country_code: matched.country_code_detected,
                }
            }
            None => {
                tracing::debug!("No partner for '{}' yet", peer_id);
                OutboundMessage::NewRemotePeer {
                    peer_id: String::new(),
                    country_code: String::new(),
                }
            }
        };
        push_message(self.message_pusher.as_ref(), peer_id.as_str(), &response).await;
    }

    async fn update_peer(&self, peer_id: &PeerId, update: PeerUpdate) {
        if let Err(e) = self.repository.update_peer(peer_id, update).await {
            tracing::warn!("Ignoring preference change: {}", e);
        }
    }

    async fn notify_remote_country(&self, peer_id: &PeerId, dst: Option<String>) {
        let dst = dst.unwrap_or_default();
        let country_code = self
            .repository
            .detected_country(&dst)
            .await
            .unwrap_or_default();
        let message = OutboundMessage::RemoteCountrySet {
            peer_id: dst,
            country_code,
        };
        push_message(self.message_pusher.as_ref(), peer_id.as_str(), &message).await;
    }
}
