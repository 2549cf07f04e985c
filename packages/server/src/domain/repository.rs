//! Repository trait 定義
//!
//! ClientRegistry と WaitingQueueMatcher をまとめて扱うデータアクセスのインターフェース。
//! 待機スロットの読み取り・更新はアトミックでなければならないため、
//! 実装は両者を単一のロックで保護すること。

use async_trait::async_trait;

use super::{
    GeoLocation, Peer, PeerId, PeerUpdate, RepositoryError, Timestamp, WaitingSlot,
};

/// マッチした相手ピア
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPeer {
    pub peer_id: PeerId,
    /// 相手ピアの検出国コード（空の場合あり）
    pub country_code_detected: String,
}

/// レジストリと待機スロットのスナップショット
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchmakingSnapshot {
    pub peers: Vec<Peer>,
    pub waiting: Vec<WaitingSlot>,
}

/// Matchmaking Repository trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchmakingRepository: Send + Sync {
    /// ピアを登録（同じ ID は上書き）
    async fn register_peer(&self, peer_id: PeerId, location: GeoLocation, connected_at: Timestamp);

    /// 待機スロットを解除してからピアを削除。存在した場合は true
    async fn unregister_peer(&self, peer_id: &PeerId) -> bool;

    /// ピアが登録済みかどうか
    async fn has_peer(&self, peer_id: &PeerId) -> bool;

    /// 待機スロットを解除してから属性を更新
    async fn update_peer(&self, peer_id: &PeerId, update: PeerUpdate)
    -> Result<(), RepositoryError>;

    /// 待機スロットを解除し、更新を適用してからマッチングを行う
    ///
    /// 相手が見つからない場合は `Ok(None)`（要求者は待機者になる）
    async fn request_match(
        &self,
        peer_id: &PeerId,
        updates: Vec<PeerUpdate>,
    ) -> Result<Option<MatchedPeer>, RepositoryError>;

    /// ピアの検出国コード。未登録の場合は None
    async fn detected_country(&self, peer_id: &str) -> Option<String>;

    /// 接続中のピア数
    async fn count_peers(&self) -> usize;

    /// 管理用のスナップショット
    async fn snapshot(&self) -> MatchmakingSnapshot;
}
