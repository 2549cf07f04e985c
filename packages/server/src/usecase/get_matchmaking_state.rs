//! UseCase: マッチング状態の参照（/debug/state, /api/peers/count 用）

use std::sync::Arc;

use crate::domain::{MatchmakingRepository, MatchmakingSnapshot};

pub struct GetMatchmakingStateUseCase {
    repository: Arc<dyn MatchmakingRepository>,
}

impl GetMatchmakingStateUseCase {
    pub fn new(repository: Arc<dyn MatchmakingRepository>) -> Self {
        Self { repository }
    }

    /// レジストリと待機スロットのスナップショットを取得
    pub async fn execute(&self) -> MatchmakingSnapshot {
        self.repository.snapshot().await
    }

    pub async fn count_peers(&self) -> usize {
        self.repository.count_peers().await
    }
}
