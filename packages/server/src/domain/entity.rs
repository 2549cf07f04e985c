//! ドメインエンティティ

use serde::Serialize;

use super::value_object::{CountryCode, PeerId, Purpose, Timestamp};

/// 接続中のチャット参加者
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Peer {
    pub id: PeerId,
    /// ピアが選んだ国フィルタ（`None` はすべての国）
    pub country_code: Option<CountryCode>,
    /// 接続時に IP から検出した国（空の場合あり）
    pub country_code_detected: String,
    pub country_name_detected: String,
    pub purpose: Purpose,
    pub connected_at: Timestamp,
}

impl Peer {
    /// 検出した国からピアを作成
    ///
    /// 国フィルタの初期値は検出した国になる。
    pub fn new(
        id: PeerId,
        country_code_detected: String,
        country_name_detected: String,
        connected_at: Timestamp,
    ) -> Self {
        Self {
            id,
            country_code: CountryCode::sanitize(&country_code_detected),
            country_code_detected,
            country_name_detected,
            purpose: Purpose::default(),
            connected_at,
        }
    }
}
