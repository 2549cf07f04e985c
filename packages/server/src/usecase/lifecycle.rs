//! UseCase: 接続ライフサイクルとコアの橋渡し
//!
//! トランスポート（WebSocket ハンドラ）から呼ばれる 4 つのフック
//! `on_connect` / `on_message` / `on_disconnect` / `on_error` を提供します。
//! `on_message` はデコード済みのエンベロープを受け取り、中継対象であれば
//! 先に宛先へ転送してから、制御メッセージとしてルーターに渡します。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - 接続 → マッチ要求 → 中継 → 切断の一連の流れ
//!
//! ### なぜこのテストが必要か
//! - 各ユースケースが正しい順序で呼ばれることを、実際の Repository / MessagePusher で確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：2 ピアのマッチングと OFFER の中継
//! - 異常系：宛先のない中継エンベロープ
//! - エッジケース：接続前の切断、接続していないピアからのメッセージ

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{GeoLocation, InboundEnvelope, MessageKind, PeerId, PusherChannel};

use super::{
    ConnectPeerUseCase, DisconnectPeerUseCase, RelaySignalUseCase, SignalingMessageRouter,
    error::{ConnectError, RelayError},
};

pub struct ConnectionLifecycleBinder {
    connect_peer_usecase: Arc<ConnectPeerUseCase>,
    disconnect_peer_usecase: Arc<DisconnectPeerUseCase>,
    router: Arc<SignalingMessageRouter>,
    relay_signal_usecase: Arc<RelaySignalUseCase>,
}

impl ConnectionLifecycleBinder {
    pub fn new(
        connect_peer_usecase: Arc<ConnectPeerUseCase>,
        disconnect_peer_usecase: Arc<DisconnectPeerUseCase>,
        router: Arc<SignalingMessageRouter>,
        relay_signal_usecase: Arc<RelaySignalUseCase>,
    ) -> Self {
        Self {
            connect_peer_usecase,
            disconnect_peer_usecase,
            router,
            relay_signal_usecase,
        }
    }

    pub async fn on_connect(
        &self,
        peer_id: PeerId,
        ip_address: &str,
        sender: PusherChannel,
    ) -> Result<GeoLocation, ConnectError> {
        self.connect_peer_usecase
            .execute(peer_id, ip_address, sender)
            .await
    }

    pub async fn on_message(&self, peer_id: &PeerId, envelope: InboundEnvelope) {
        let kind = &envelope.kind;
        if kind.is_relayed() {
            match envelope.dst.as_deref() {
                Some(dst) => self.relay(peer_id, kind, dst, envelope.raw.clone()).await,
                None => tracing::warn!(
                    "'{}' from '{}' has no destination",
                    kind.as_str(),
                    peer_id
                ),
            }
        }

        self.router.route(peer_id, envelope.to_message()).await;
    }

    pub async fn on_disconnect(&self, peer_id: &PeerId) {
        self.disconnect_peer_usecase.execute(peer_id).await;
    }

    pub fn on_error(&self, peer_id: &PeerId, error: &dyn std::error::Error) {
        tracing::error!("Connection error for '{}': {}", peer_id, error);
    }

    async fn relay(&self, peer_id: &PeerId, kind: &MessageKind, dst: &str, envelope: Value) {
        match self
            .relay_signal_usecase
            .execute(peer_id, kind, dst, envelope)
            .await
        {
            Ok(()) => {}
            Err(RelayError::DestinationNotFound(dst)) => {
                tracing::info!(
                    "'{}' from '{}' dropped: '{}' is not connected",
                    kind.as_str(),
                    peer_id,
                    dst
                );
            }
            Err(e) => tracing::warn!("Failed to relay '{}': {}", kind.as_str(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{GeoLocator, MatchmakingRepository, MessagePusher, geo::MockGeoLocator},
        infrastructure::{
            dto::conversion::decode_envelope, message_pusher::WebSocketMessagePusher,
            repository::InMemoryMatchmakingRepository,
        },
    };
    use chatroulette_shared::time::FixedClock;
    use serde_json::json;
    use tokio::sync::mpsc;

    struct Fixture {
        binder: ConnectionLifecycleBinder,
        repository: Arc<InMemoryMatchmakingRepository>,
        message_pusher: Arc<WebSocketMessagePusher>,
    }

    fn create_binder() -> Fixture {
        let repository = Arc::new(InMemoryMatchmakingRepository::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let mut geo_locator = MockGeoLocator::new();
        geo_locator.expect_lookup().returning(|ip| match ip {
            "203.0.113.1" => GeoLocation::new("US", "United States"),
            "203.0.113.2" => GeoLocation::new("JP", "Japan"),
            _ => GeoLocation::unknown(),
        });
        let geo_locator: Arc<dyn GeoLocator> = Arc::new(geo_locator);

        let binder = ConnectionLifecycleBinder::new(
            Arc::new(ConnectPeerUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                geo_locator,
                Arc::new(FixedClock::new(1000)),
            )),
            Arc::new(DisconnectPeerUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            Arc::new(SignalingMessageRouter::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            Arc::new(RelaySignalUseCase::new(message_pusher.clone())),
        );
        Fixture {
            binder,
            repository,
            message_pusher,
        }
    }

    fn peer_id(id: &str) -> PeerId {
        PeerId::new(id.to_string()).unwrap()
    }

    async fn connect(
        fixture: &Fixture,
        id: &str,
        ip: &str,
    ) -> mpsc::UnboundedReceiver<String> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        fixture.binder.on_connect(peer_id(id), ip, tx).await.unwrap();
        // OPEN と COUNTRY_DETECTED を読み捨てる
        rx.try_recv().unwrap();
        rx.try_recv().unwrap();
        rx
    }

    fn next_json(rx: &mut mpsc::UnboundedReceiver<String>) -> Value {
        serde_json::from_str(&rx.try_recv().unwrap()).unwrap()
    }

    async fn send(fixture: &Fixture, id: &str, text: &str) {
        fixture
            .binder
            .on_message(&peer_id(id), decode_envelope(text).unwrap())
            .await;
    }

    #[tokio::test]
    async fn test_match_then_relay_offer_and_answer() {
        // テスト項目: 国を問わない p1 が待機し、p2 が p1 とマッチし、OFFER / ANSWER が中継される
        // given (前提条件):
        let fixture = create_binder();
        let mut rx1 = connect(&fixture, "p1", "203.0.113.1").await;
        let mut rx2 = connect(&fixture, "p2", "203.0.113.2").await;
        let any_country = r#"{"type":"NEW_REMOTE_PEER_REQUEST","payload":"{\"countryCode\":\"\"}"}"#;

        // when (操作):
        send(&fixture, "p1", any_country).await;
        send(&fixture, "p2", any_country).await;
        send(
            &fixture,
            "p2",
            r#"{"type":"OFFER","dst":"p1","payload":{"sdp":"offer"}}"#,
        )
        .await;
        send(
            &fixture,
            "p1",
            r#"{"type":"ANSWER","dst":"p2","payload":{"sdp":"answer"}}"#,
        )
        .await;

        // then (期待する結果):
        assert_eq!(
            next_json(&mut rx1),
            json!({"type": "NEW_REMOTE_PEER", "peerId": "", "countryCode": ""})
        );
        assert_eq!(
            next_json(&mut rx2),
            json!({"type": "NEW_REMOTE_PEER", "peerId": "p1", "countryCode": "US"})
        );
        assert_eq!(
            next_json(&mut rx1),
            json!({"type": "OFFER", "dst": "p1", "src": "p2", "payload": {"sdp": "offer"}})
        );
        assert_eq!(
            next_json(&mut rx2),
            json!({"type": "ANSWER", "dst": "p2", "src": "p1", "payload": {"sdp": "answer"}})
        );
        assert_eq!(
            next_json(&mut rx1),
            json!({"type": "REMOTE_COUNTRY_SET", "peerId": "p2", "countryCode": "JP"})
        );
    }

    #[tokio::test]
    async fn test_match_request_with_payload_and_purpose_set() {
        // テスト項目: ペイロードで指定した目的で待機し、PURPOSE_SET で待機が解除される
        // given (前提条件):
        let fixture = create_binder();
        let _rx1 = connect(&fixture, "p1", "203.0.113.1").await;
        let mut rx2 = connect(&fixture, "p2", "203.0.113.2").await;
        send(
            &fixture,
            "p1",
            r#"{"type":"NEW_REMOTE_PEER_REQUEST","payload":"{\"countryCode\":\"us\",\"purpose\":\"language\"}"}"#,
        )
        .await;

        // when (操作):
        send(&fixture, "p1", r#"{"type":"PURPOSE_SET","payload":"dating"}"#).await;
        send(
            &fixture,
            "p2",
            r#"{"type":"NEW_REMOTE_PEER_REQUEST","payload":"{\"countryCode\":\"US\",\"purpose\":\"language\"}"}"#,
        )
        .await;

        // then (期待する結果): p1 はもう language のスロットにいない
        assert_eq!(next_json(&mut rx2)["peerId"], json!(""));
        let snapshot = fixture.repository.snapshot().await;
        let p1 = snapshot
            .peers
            .iter()
            .find(|peer| peer.id.as_str() == "p1")
            .unwrap();
        assert_eq!(p1.purpose, crate::domain::Purpose::Dating);
    }

    #[tokio::test]
    async fn test_unknown_country_peer_is_matched_with_empty_code() {
        // テスト項目: 国が検出できないピアは空の国コードでマッチ相手に通知される
        // given (前提条件):
        let fixture = create_binder();
        let _rx1 = connect(&fixture, "p1", "10.0.0.1").await;
        let mut rx2 = connect(&fixture, "p2", "10.0.0.2").await;

        // when (操作):
        for id in ["p1", "p2"] {
            send(&fixture, id, r#"{"type":"NEW_REMOTE_PEER_REQUEST"}"#).await;
        }

        // then (期待する結果):
        assert_eq!(
            next_json(&mut rx2),
            json!({"type": "NEW_REMOTE_PEER", "peerId": "p1", "countryCode": ""})
        );
    }

    #[tokio::test]
    async fn test_silent_envelopes_are_ignored() {
        // テスト項目: HEARTBEAT や宛先のない中継エンベロープには応答しない
        // given (前提条件):
        let fixture = create_binder();
        let mut rx1 = connect(&fixture, "p1", "203.0.113.1").await;
        let _rx2 = connect(&fixture, "p2", "203.0.113.2").await;

        // when (操作):
        send(&fixture, "p1", r#"{"type":"HEARTBEAT"}"#).await;
        send(&fixture, "p1", r#"{"type":"OFFER","payload":{"sdp":"v=0"}}"#).await;

        // then (期待する結果):
        assert!(rx1.try_recv().is_err());
        assert_eq!(fixture.repository.count_peers().await, 2);
    }

    #[tokio::test]
    async fn test_disconnect_releases_peer() {
        // テスト項目: 切断後はピアが削除され、中継先として EXPIRE が返される
        // given (前提条件):
        let fixture = create_binder();
        let mut rx1 = connect(&fixture, "p1", "203.0.113.1").await;
        let _rx2 = connect(&fixture, "p2", "203.0.113.2").await;

        // when (操作):
        fixture.binder.on_disconnect(&peer_id("p2")).await;
        send(&fixture, "p1", r#"{"type":"CANDIDATE","dst":"p2"}"#).await;

        // then (期待する結果):
        assert_eq!(fixture.repository.count_peers().await, 1);
        assert!(!fixture.message_pusher.is_connected("p2").await);
        assert_eq!(next_json(&mut rx1), json!({"type": "EXPIRE", "src": "p2"}));
    }

    #[tokio::test]
    async fn test_disconnect_without_connect_is_noop() {
        // テスト項目: 接続していないピアの切断は何もしない
        // given (前提条件):
        let fixture = create_binder();

        // when (操作):
        fixture.binder.on_disconnect(&peer_id("ghost")).await;

        // then (期待する結果):
        assert_eq!(fixture.repository.count_peers().await, 0);
    }
}
