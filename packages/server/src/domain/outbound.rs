//! ピアへ送信するメッセージ
//!
//! UseCase 層はこの型だけを扱い、ワイヤーフォーマットへの変換は
//! Infrastructure 層（DTO）が行います。

use serde_json::Value;

/// サーバーからピアへのメッセージ
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// 接続の受け付け
    Open,
    /// 接続時に IP から検出した国
    CountryDetected {
        country_code: String,
        country_name: String,
    },
    /// マッチ要求の結果（相手がいない場合は `peer_id` が空）
    NewRemotePeer {
        peer_id: String,
        country_code: String,
    },
    /// ANSWER の宛先ピアの検出国
    RemoteCountrySet {
        peer_id: String,
        country_code: String,
    },
    /// 中継先 `src` に届けられなかった
    Expire { src: String },
    /// 中継するエンベロープ（`src` 付与済み）
    Relayed(Value),
}
