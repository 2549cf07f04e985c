//! UseCase: ピア切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectPeerUseCase::execute() メソッド
//! - レジストリからの削除、待機スロットの解除、MessagePusher からの登録解除
//!
//! ### なぜこのテストが必要か
//! - 切断したピアが待機スロットに残ると、次の要求者が存在しない相手とマッチしてしまう
//!
//! ### どのような状況を想定しているか
//! - 正常系：待機中のピアの切断
//! - エッジケース：接続していないピアの切断（何も起きない）

use std::sync::Arc;

use crate::domain::{MatchmakingRepository, MessagePusher, PeerId};

/// ピア切断のユースケース
pub struct DisconnectPeerUseCase {
    /// Repository（レジストリと待機スロットの抽象化）
    repository: Arc<dyn MatchmakingRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectPeerUseCase {
    /// 新しい DisconnectPeerUseCase を作成
    pub fn new(
        repository: Arc<dyn MatchmakingRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// ピア切断を実行
    ///
    /// # Returns
    ///
    /// レジストリにピアが存在した場合は `true`
    pub async fn execute(&self, peer_id: &PeerId) -> bool {
        // 1. 待機スロットを解除してレジストリから削除
        let removed = self.repository.unregister_peer(peer_id).await;

        // 2. 送信チャンネルを解除
        self.message_pusher.unregister_client(peer_id).await;

        if removed {
            tracing::info!("Peer '{}' disconnected and removed from registry", peer_id);
        } else {
            tracing::debug!("Peer '{}' was not registered", peer_id);
        }
        removed
    }
}
