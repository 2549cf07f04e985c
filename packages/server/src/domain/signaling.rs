//! 受信するシグナリングメッセージ

use serde_json::{Map, Value};

use super::{
    registry::PeerUpdate,
    value_object::{CountryCode, Purpose},
};

/// エンベロープの `type` フィールドが示すメッセージ種別
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    NewRemotePeerRequest,
    CountrySet,
    PurposeSet,
    Heartbeat,
    Offer,
    Answer,
    Candidate,
    Leave,
    Expire,
    Unknown(String),
}

impl MessageKind {
    pub fn parse(kind: &str) -> Self {
        match kind {
            "NEW_REMOTE_PEER_REQUEST" => Self::NewRemotePeerRequest,
            "COUNTRY_SET" => Self::CountrySet,
            "PURPOSE_SET" => Self::PurposeSet,
            "HEARTBEAT" => Self::Heartbeat,
            "OFFER" => Self::Offer,
            "ANSWER" => Self::Answer,
            "CANDIDATE" => Self::Candidate,
            "LEAVE" => Self::Leave,
            "EXPIRE" => Self::Expire,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::NewRemotePeerRequest => "NEW_REMOTE_PEER_REQUEST",
            Self::CountrySet => "COUNTRY_SET",
            Self::PurposeSet => "PURPOSE_SET",
            Self::Heartbeat => "HEARTBEAT",
            Self::Offer => "OFFER",
            Self::Answer => "ANSWER",
            Self::Candidate => "CANDIDATE",
            Self::Leave => "LEAVE",
            Self::Expire => "EXPIRE",
            Self::Unknown(kind) => kind.as_str(),
        }
    }

    /// `dst` に中継されるエンベロープかどうか
    pub fn is_relayed(&self) -> bool {
        matches!(
            self,
            Self::Offer | Self::Answer | Self::Candidate | Self::Leave | Self::Expire
        )
    }
}

/// デコード済みの制御メッセージ（クライアント入力はサニタイズ済み）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalingMessage {
    /// 相手の要求（必要なら先に国・目的を変更する）
    NewRemotePeerRequest { updates: Vec<PeerUpdate> },
    CountrySet { country_code: Option<CountryCode> },
    PurposeSet { purpose: Purpose },
    /// OFFER への応答。送信者には `dst` の国が通知される
    Answer { dst: Option<String> },
    /// OFFER / CANDIDATE / LEAVE / EXPIRE（中継のみで処理する）
    Relayed(MessageKind),
    Heartbeat,
    Unknown(String),
}

impl SignalingMessage {
    /// エンベロープのフィールドからメッセージを作成
    pub fn from_parts(kind: MessageKind, payload: Option<&Value>, dst: Option<String>) -> Self {
        match kind {
            MessageKind::NewRemotePeerRequest => Self::NewRemotePeerRequest {
                updates: payload.map(preference_updates).unwrap_or_default(),
            },
            MessageKind::CountrySet => Self::CountrySet {
                country_code: payload.and_then(CountryCode::from_json),
            },
            MessageKind::PurposeSet => Self::PurposeSet {
                purpose: payload.map(Purpose::from_json).unwrap_or_default(),
            },
            MessageKind::Answer => Self::Answer { dst },
            MessageKind::Heartbeat => Self::Heartbeat,
            MessageKind::Unknown(kind) => Self::Unknown(kind),
            relayed => Self::Relayed(relayed),
        }
    }
}

/// 受信したエンベロープ
///
/// `raw` は受信した JSON そのもので、中継時はこれに `src` を付けて転送する。
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEnvelope {
    pub kind: MessageKind,
    pub dst: Option<String>,
    pub payload: Option<Value>,
    pub raw: Value,
}

impl InboundEnvelope {
    /// ルーターに渡す制御メッセージ
    pub fn to_message(&self) -> SignalingMessage {
        SignalingMessage::from_parts(self.kind.clone(), self.payload.as_ref(), self.dst.clone())
    }
}

/// マッチ要求のペイロード `{countryCode?, purpose?}` を解釈する
///
/// 通常は JSON 文字列だが、オブジェクトもそのまま受け付ける。
/// 不正なペイロードはログに残して無視する。
pub fn preference_updates(payload: &Value) -> Vec<PeerUpdate> {
    match payload {
        Value::Null => Vec::new(),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(fields)) => updates_from_fields(&fields),
            Ok(other) => {
                tracing::warn!("Ignoring non-object match payload: {}", other);
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Failed to parse match payload as JSON: {}", e);
                Vec::new()
            }
        },
        Value::Object(fields) => updates_from_fields(fields),
        other => {
            tracing::warn!("Ignoring match payload of unexpected type: {}", other);
            Vec::new()
        }
    }
}

fn updates_from_fields(fields: &Map<String, Value>) -> Vec<PeerUpdate> {
    let mut updates = Vec::new();
    match fields.get("countryCode") {
        // 文字列以外は現在のフィルタを維持
        Some(Value::String(raw)) => {
            updates.push(PeerUpdate::CountryCode(CountryCode::sanitize(raw)))
        }
        Some(Value::Null) => updates.push(PeerUpdate::CountryCode(None)),
        Some(other) => tracing::debug!("Ignoring countryCode of unexpected type: {}", other),
        None => {}
    }
    if let Some(purpose) = fields.get("purpose") {
        updates.push(PeerUpdate::Purpose(Purpose::from_json(purpose)));
    }
    updates
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_kind_round_trips_known_types() {
        // テスト項目: 既知のメッセージ種別は文字列と相互変換できる
        // given (前提条件):
        let kinds = [
            "NEW_REMOTE_PEER_REQUEST",
            "COUNTRY_SET",
            "PURPOSE_SET",
            "HEARTBEAT",
            "OFFER",
            "ANSWER",
            "CANDIDATE",
            "LEAVE",
            "EXPIRE",
        ];

        // when (操作) / then (期待する結果):
        for kind in kinds {
            let parsed = MessageKind::parse(kind);
            assert!(!matches!(parsed, MessageKind::Unknown(_)), "{kind}");
            assert_eq!(parsed.as_str(), kind);
        }
        assert_eq!(
            MessageKind::parse("SOMETHING"),
            MessageKind::Unknown("SOMETHING".to_string())
        );
    }

    #[test]
    fn test_only_transport_envelopes_are_relayed() {
        // テスト項目: SDP/ICE 系の種別のみが中継対象になる
        // when (操作) / then (期待する結果):
        assert!(MessageKind::Offer.is_relayed());
        assert!(MessageKind::Answer.is_relayed());
        assert!(MessageKind::Candidate.is_relayed());
        assert!(!MessageKind::NewRemotePeerRequest.is_relayed());
        assert!(!MessageKind::Heartbeat.is_relayed());
    }

    #[test]
    fn test_match_request_with_string_payload() {
        // テスト項目: JSON 文字列のペイロードから国と目的の更新が作られる
        // given (前提条件):
        let payload = json!(r#"{"countryCode":"de","purpose":"language"}"#);

        // when (操作):
        let message =
            SignalingMessage::from_parts(MessageKind::NewRemotePeerRequest, Some(&payload), None);

        // then (期待する結果):
        assert_eq!(
            message,
            SignalingMessage::NewRemotePeerRequest {
                updates: vec![
                    PeerUpdate::CountryCode(CountryCode::sanitize("DE")),
                    PeerUpdate::Purpose(Purpose::Language),
                ]
            }
        );
    }

    #[test]
    fn test_match_request_sanitizes_each_field_independently() {
        // テスト項目: 各フィールドは独立にサニタイズされる
        // given (前提条件):
        let payload = json!(r#"{"countryCode":"X","purpose":"party"}"#);

        // when (操作):
        let updates = preference_updates(&payload);

        // then (期待する結果):
        assert_eq!(
            updates,
            vec![
                PeerUpdate::CountryCode(None),
                PeerUpdate::Purpose(Purpose::Discussion),
            ]
        );
    }

    #[test]
    fn test_match_request_keeps_current_country_for_non_string() {
        // テスト項目: 文字列以外の countryCode は無視され、現在の値が維持される
        // given (前提条件):
        let payload = json!({"countryCode": 42});

        // when (操作):
        let updates = preference_updates(&payload);

        // then (期待する結果):
        assert!(updates.is_empty());
    }

    #[test]
    fn test_malformed_payload_is_treated_as_absent() {
        // テスト項目: 不正な JSON ペイロードは無視され、ペイロードなしとして扱われる
        // given (前提条件):
        let payload = json!("{not json");

        // when (操作):
        let message =
            SignalingMessage::from_parts(MessageKind::NewRemotePeerRequest, Some(&payload), None);

        // then (期待する結果):
        assert_eq!(
            message,
            SignalingMessage::NewRemotePeerRequest { updates: vec![] }
        );
    }

    #[test]
    fn test_country_and_purpose_set_are_sanitized() {
        // テスト項目: COUNTRY_SET / PURPOSE_SET の値はサニタイズされる
        // when (操作):
        let country =
            SignalingMessage::from_parts(MessageKind::CountrySet, Some(&json!("usa")), None);
        let any = SignalingMessage::from_parts(MessageKind::CountrySet, Some(&json!(1)), None);
        let purpose =
            SignalingMessage::from_parts(MessageKind::PurposeSet, Some(&json!("dating")), None);
        let fallback = SignalingMessage::from_parts(MessageKind::PurposeSet, None, None);

        // then (期待する結果):
        assert_eq!(
            country,
            SignalingMessage::CountrySet {
                country_code: CountryCode::sanitize("US")
            }
        );
        assert_eq!(any, SignalingMessage::CountrySet { country_code: None });
        assert_eq!(
            purpose,
            SignalingMessage::PurposeSet {
                purpose: Purpose::Dating
            }
        );
        assert_eq!(
            fallback,
            SignalingMessage::PurposeSet {
                purpose: Purpose::Discussion
            }
        );
    }

    #[test]
    fn test_inbound_envelope_to_message() {
        // テスト項目: 受信エンベロープからルーター用の制御メッセージが作られる
        // given (前提条件):
        let envelope = InboundEnvelope {
            kind: MessageKind::PurposeSet,
            dst: None,
            payload: Some(json!("language")),
            raw: json!({"type": "PURPOSE_SET", "payload": "language"}),
        };

        // when (操作):
        let message = envelope.to_message();

        // then (期待する結果):
        assert_eq!(
            message,
            SignalingMessage::PurposeSet {
                purpose: Purpose::Language
            }
        );
    }

    #[test]
    fn test_answer_carries_destination() {
        // テスト項目: ANSWER は宛先 ID を保持する
        // when (操作):
        let message =
            SignalingMessage::from_parts(MessageKind::Answer, None, Some("p2".to_string()));

        // then (期待する結果):
        assert_eq!(
            message,
            SignalingMessage::Answer {
                dst: Some("p2".to_string())
            }
        );
    }
}
