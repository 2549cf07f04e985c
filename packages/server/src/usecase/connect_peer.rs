//! UseCase: ピア接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectPeerUseCase::execute() メソッド
//! - 国の検出、レジストリへの登録、OPEN / COUNTRY_DETECTED の送信
//!
//! ### なぜこのテストが必要か
//! - 接続時に検出した国は以後のマッチング（NEW_REMOTE_PEER の countryCode）の元になる
//! - 重複接続を防ぐ
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規ピアの接続
//! - 異常系：重複したピア ID での接続試行
//! - エッジケース：国が検出できない IP

use std::sync::Arc;

use chatroulette_shared::time::Clock;

use crate::domain::{
    GeoLocation, GeoLocator, MatchmakingRepository, MessagePushError, MessagePusher,
    OutboundMessage, PeerId, PusherChannel, Timestamp,
};

use super::{error::ConnectError, notify::push_message};

/// ピア接続のユースケース
pub struct ConnectPeerUseCase {
    /// Repository（レジストリと待機スロットの抽象化）
    repository: Arc<dyn MatchmakingRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// GeoLocator（IP → 国の解決）
    geo_locator: Arc<dyn GeoLocator>,
    clock: Arc<dyn Clock>,
}

impl ConnectPeerUseCase {
    /// 新しい ConnectPeerUseCase を作成
    pub fn new(
        repository: Arc<dyn MatchmakingRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        geo_locator: Arc<dyn GeoLocator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            geo_locator,
            clock,
        }
    }

    /// ピア接続を実行
    ///
    /// # Arguments
    ///
    /// * `peer_id` - 接続するピアの ID
    /// * `ip_address` - ピアの実 IP（プロキシヘッダ考慮済み）
    /// * `sender` - ピアへのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(GeoLocation)` - 接続成功（検出した国を返す）
    /// * `Err(ConnectError)` - 接続失敗
    pub async fn execute(
        &self,
        peer_id: PeerId,
        ip_address: &str,
        sender: PusherChannel,
    ) -> Result<GeoLocation, ConnectError> {
        // 1. MessagePusher に登録（重複チェックを兼ねる）
        self.message_pusher
            .register_client(peer_id.clone(), sender)
            .await
            .map_err(|e| match e {
                MessagePushError::AlreadyRegistered(id) => ConnectError::DuplicatePeerId(id),
                other => ConnectError::Transport(other.to_string()),
            })?;
        push_message(
            self.message_pusher.as_ref(),
            peer_id.as_str(),
            &OutboundMessage::Open,
        )
        .await;

        // 2. 国を検出してレジストリに登録
        let location = self.geo_locator.lookup(ip_address);
        tracing::info!(
            "Peer '{}' connected from '{}' ({} / {})",
            peer_id,
            ip_address,
            location.country_code,
            location.country_name
        );
        self.repository
            .register_peer(
                peer_id.clone(),
                location.clone(),
                Timestamp::new(self.clock.now_millis()),
            )
            .await;

        // 3. 検出した国を本人にだけ通知
        let detected = OutboundMessage::CountryDetected {
            country_code: location.country_code.clone(),
            country_name: location.country_name.clone(),
        };
        push_message(self.message_pusher.as_ref(), peer_id.as_str(), &detected).await;

        Ok(location)
    }
}
