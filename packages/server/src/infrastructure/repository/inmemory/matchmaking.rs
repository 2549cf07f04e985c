//! InMemory Matchmaking Repository 実装
//!
//! ドメイン層が定義する MatchmakingRepository trait の具体的な実装。
//! ClientRegistry と WaitingQueueMatcher を 1 つの `Mutex` で保護し、
//! 待機スロットの読み取り・更新を 1 回のロック取得の中で完結させます。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ClientRegistry, GeoLocation, MatchedPeer, MatchmakingRepository, MatchmakingSnapshot,
    PeerField, PeerId, PeerUpdate, RepositoryError, Timestamp, WaitingQueueMatcher,
};

/// ロックで保護される状態
#[derive(Debug, Default)]
struct MatchmakingState {
    registry: ClientRegistry,
    matcher: WaitingQueueMatcher,
}

/// インメモリ Matchmaking Repository 実装
#[derive(Debug, Default)]
pub struct InMemoryMatchmakingRepository {
    state: Mutex<MatchmakingState>,
}

impl InMemoryMatchmakingRepository {
    /// 新しい InMemoryMatchmakingRepository を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MatchmakingRepository for InMemoryMatchmakingRepository {
    async fn register_peer(&self, peer_id: PeerId, location: GeoLocation, connected_at: Timestamp) {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        // 上書き時に旧キーの待機が残らないようにする
        state.matcher.clear_waiting_data(&state.registry, peer_id.as_str());
        state.registry.add(
            peer_id,
            &location.country_code,
            &location.country_name,
            connected_at,
        );
    }

    async fn unregister_peer(&self, peer_id: &PeerId) -> bool {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        state.matcher.clear_waiting_data(&state.registry, peer_id.as_str());
        state.registry.remove(peer_id.as_str()).is_some()
    }

    async fn has_peer(&self, peer_id: &PeerId) -> bool {
        self.state.lock().await.registry.has(peer_id.as_str())
    }

    async fn update_peer(
        &self,
        peer_id: &PeerId,
        update: PeerUpdate,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        if !state.registry.has(peer_id.as_str()) {
            return Err(RepositoryError::PeerNotFound(peer_id.to_string()));
        }
        state.matcher.clear_waiting_data(&state.registry, peer_id.as_str());
        state.registry.set(peer_id.as_str(), update);
        Ok(())
    }

    async fn request_match(
        &self,
        peer_id: &PeerId,
        updates: Vec<PeerUpdate>,
    ) -> Result<Option<MatchedPeer>, RepositoryError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        if !state.registry.has(peer_id.as_str()) {
            return Err(RepositoryError::PeerNotFound(peer_id.to_string()));
        }

        // 1. 旧キーの待機を解除
        state.matcher.clear_waiting_data(&state.registry, peer_id.as_str());

        // 2. 国・目的の更新を適用
        for update in updates {
            state.registry.set(peer_id.as_str(), update);
        }

        // 3. マッチング
        let matched = state
            .matcher
            .next_peer_id(&state.registry, peer_id.as_str())
            .map(|matched_id| MatchedPeer {
                country_code_detected: state.registry.get(
                    matched_id.as_str(),
                    PeerField::CountryCodeDetected,
                    "",
                ),
                peer_id: matched_id,
            });
        Ok(matched)
    }

    async fn detected_country(&self, peer_id: &str) -> Option<String> {
        let state = self.state.lock().await;
        state
            .registry
            .peer(peer_id)
            .map(|peer| peer.country_code_detected.clone())
    }

    async fn count_peers(&self) -> usize {
        self.state.lock().await.registry.count()
    }

    async fn snapshot(&self) -> MatchmakingSnapshot {
        let state = self.state.lock().await;
        let mut peers: Vec<_> = state.registry.peers().cloned().collect();
        peers.sort_by(|a, b| a.id.cmp(&b.id));
        MatchmakingSnapshot {
            peers,
            waiting: state.matcher.waiting_slots(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{CountryCode, Purpose, WaitingKey};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryMatchmakingRepository の登録・削除・更新・マッチング
    // - 待機スロットの解除が各操作の前に行われること
    //
    // 【なぜこのテストが必要か】
    // - Repository は UseCase から呼ばれるデータアクセス層の中核
    // - レジストリと待機スロットの整合性を保証する必要がある
    //
    // 【どのようなシナリオをテストするか】
    // 1. 同じキーの 2 ピアのマッチング
    // 2. 切断時の待機解除
    // 3. 属性変更時の待機解除
    // 4. 同時リクエストで二重マッチが起きないこと
    // ========================================

    fn peer_id(id: &str) -> PeerId {
        PeerId::new(id.to_string()).unwrap()
    }

    async fn repository_with(peers: &[(&str, &str)]) -> InMemoryMatchmakingRepository {
        let repo = InMemoryMatchmakingRepository::new();
        for (id, country) in peers {
            repo.register_peer(
                peer_id(id),
                GeoLocation::new(*country, "Somewhere"),
                Timestamp::new(1000),
            )
            .await;
        }
        repo
    }

    fn waiting_under(snapshot: &MatchmakingSnapshot, key: &WaitingKey) -> Option<String> {
        snapshot
            .waiting
            .iter()
            .find(|slot| &slot.key == key)
            .and_then(|slot| slot.peer_id.as_ref())
            .map(|id| id.to_string())
    }

    #[tokio::test]
    async fn test_register_and_count() {
        // テスト項目: 登録したピアがカウントされ、検出国を参照できる
        // given (前提条件):
        let repo = repository_with(&[("p1", "US"), ("p2", "")]).await;

        // when (操作) / then (期待する結果):
        assert_eq!(repo.count_peers().await, 2);
        assert!(repo.has_peer(&peer_id("p1")).await);
        assert_eq!(repo.detected_country("p1").await, Some("US".to_string()));
        assert_eq!(repo.detected_country("p2").await, Some(String::new()));
        assert_eq!(repo.detected_country("ghost").await, None);
    }

    #[tokio::test]
    async fn test_request_match_pairs_two_peers() {
        // テスト項目: 同じキーの 2 ピアがマッチし、相手の検出国が返される
        // given (前提条件):
        let repo = repository_with(&[("p1", "US"), ("p2", "US")]).await;

        // when (操作):
        let first = repo.request_match(&peer_id("p1"), vec![]).await;
        let second = repo.request_match(&peer_id("p2"), vec![]).await;

        // then (期待する結果):
        assert_eq!(first, Ok(None));
        assert_eq!(
            second,
            Ok(Some(MatchedPeer {
                peer_id: peer_id("p1"),
                country_code_detected: "US".to_string(),
            }))
        );
        let snapshot = repo.snapshot().await;
        assert_eq!(
            waiting_under(&snapshot, &WaitingKey::new("US", Purpose::Discussion)),
            None
        );
    }

    #[tokio::test]
    async fn test_request_match_applies_updates_after_releasing_old_slot() {
        // テスト項目: 更新付きの再要求では旧キーの待機が解除され、新キーで待機する
        // given (前提条件):
        let repo = repository_with(&[("p1", "US")]).await;
        repo.request_match(&peer_id("p1"), vec![]).await.unwrap();

        // when (操作):
        let result = repo
            .request_match(
                &peer_id("p1"),
                vec![
                    PeerUpdate::CountryCode(CountryCode::sanitize("FR")),
                    PeerUpdate::Purpose(Purpose::Language),
                ],
            )
            .await;

        // then (期待する結果):
        assert_eq!(result, Ok(None));
        let snapshot = repo.snapshot().await;
        assert_eq!(
            waiting_under(&snapshot, &WaitingKey::new("US", Purpose::Discussion)),
            None
        );
        assert_eq!(
            waiting_under(&snapshot, &WaitingKey::new("FR", Purpose::Language)),
            Some("p1".to_string())
        );
    }

    #[tokio::test]
    async fn test_request_match_for_unknown_peer() {
        // テスト項目: 未登録ピアのマッチ要求はエラーになり、状態は変わらない
        // given (前提条件):
        let repo = repository_with(&[]).await;

        // when (操作):
        let result = repo.request_match(&peer_id("ghost"), vec![]).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RepositoryError::PeerNotFound("ghost".to_string()))
        );
        assert!(repo.snapshot().await.waiting.is_empty());
    }

    #[tokio::test]
    async fn test_unregister_releases_waiting_slot() {
        // テスト項目: 切断時に待機スロットが解除され、ピアが削除される
        // given (前提条件):
        let repo = repository_with(&[("p1", "US")]).await;
        repo.request_match(&peer_id("p1"), vec![]).await.unwrap();

        // when (操作):
        let removed = repo.unregister_peer(&peer_id("p1")).await;

        // then (期待する結果):
        assert!(removed);
        assert_eq!(repo.count_peers().await, 0);
        let snapshot = repo.snapshot().await;
        assert_eq!(
            waiting_under(&snapshot, &WaitingKey::new("US", Purpose::Discussion)),
            None
        );
    }

    #[tokio::test]
    async fn test_unregister_unknown_peer_is_noop() {
        // テスト項目: 存在しないピアの削除は false を返すだけで問題なく処理される
        // given (前提条件):
        let repo = repository_with(&[]).await;

        // when (操作):
        let removed = repo.unregister_peer(&peer_id("ghost")).await;

        // then (期待する結果):
        assert!(!removed);
    }

    #[tokio::test]
    async fn test_update_peer_releases_waiting_slot() {
        // テスト項目: 目的を変更すると旧スロットの待機が解除される
        // given (前提条件):
        let repo = repository_with(&[("p1", "US"), ("p2", "US")]).await;
        repo.request_match(&peer_id("p1"), vec![]).await.unwrap();

        // when (操作):
        repo.update_peer(&peer_id("p1"), PeerUpdate::Purpose(Purpose::Dating))
            .await
            .unwrap();
        let result = repo.request_match(&peer_id("p2"), vec![]).await;

        // then (期待する結果): p2 は p1 とマッチせず待機者になる
        assert_eq!(result, Ok(None));
    }

    #[tokio::test]
    async fn test_update_unknown_peer_returns_error() {
        // テスト項目: 未登録ピアの更新はエラーになる
        // given (前提条件):
        let repo = repository_with(&[]).await;

        // when (操作):
        let result = repo
            .update_peer(&peer_id("ghost"), PeerUpdate::CountryCode(None))
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RepositoryError::PeerNotFound("ghost".to_string()))
        );
    }

    #[tokio::test]
    async fn test_concurrent_requests_never_double_match() {
        // テスト項目: 同時に要求しても同じ待機者が 2 回返されることはない
        // given (前提条件):
        let ids: Vec<String> = (0..50).map(|i| format!("p{i}")).collect();
        let peers: Vec<(&str, &str)> = ids.iter().map(|id| (id.as_str(), "US")).collect();
        let repo = Arc::new(repository_with(&peers).await);

        // when (操作):
        let handles: Vec<_> = ids
            .iter()
            .map(|id| {
                let repo = repo.clone();
                let id = peer_id(id);
                tokio::spawn(async move { repo.request_match(&id, vec![]).await })
            })
            .collect();
        let mut matched = Vec::new();
        for handle in handles {
            if let Ok(Some(peer)) = handle.await.unwrap() {
                matched.push(peer.peer_id);
            }
        }

        // then (期待する結果):
        let total = matched.len();
        matched.sort();
        matched.dedup();
        assert_eq!(matched.len(), total);
        assert_eq!(total, 25);
    }
}
