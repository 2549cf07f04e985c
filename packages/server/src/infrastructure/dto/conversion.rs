//! Conversion logic between DTOs and domain types.

use chatroulette_shared::time::timestamp_to_rfc3339;
use serde_json::Value;

use crate::domain::{
    InboundEnvelope, MatchmakingSnapshot, MessageKind, OutboundMessage, Peer, WaitingSlot,
};
use crate::infrastructure::dto::{http as http_dto, websocket as ws_dto};

// ========================================
// DTO → Domain
// ========================================

/// Decode an inbound text frame.
///
/// The raw JSON is kept so relayed envelopes can be forwarded with their extra fields.
pub fn decode_envelope(text: &str) -> Result<InboundEnvelope, serde_json::Error> {
    let raw: Value = serde_json::from_str(text)?;
    let envelope: ws_dto::ClientEnvelope = serde_json::from_value(raw.clone())?;
    Ok(InboundEnvelope {
        kind: MessageKind::parse(&envelope.kind),
        dst: envelope.dst,
        payload: envelope.payload,
        raw,
    })
}

// ========================================
// Domain → DTO
// ========================================

/// Encode an outbound message as a text frame.
pub fn encode_outbound_message(message: &OutboundMessage) -> Result<String, serde_json::Error> {
    let server_message = match message {
        OutboundMessage::Relayed(envelope) => return serde_json::to_string(envelope),
        OutboundMessage::Open => ws_dto::ServerMessage::Open,
        OutboundMessage::CountryDetected {
            country_code,
            country_name,
        } => ws_dto::ServerMessage::CountryDetected {
            country_code: country_code.clone(),
            country_name: country_name.clone(),
        },
        OutboundMessage::NewRemotePeer {
            peer_id,
            country_code,
        } => ws_dto::ServerMessage::NewRemotePeer {
            peer_id: peer_id.clone(),
            country_code: country_code.clone(),
        },
        OutboundMessage::RemoteCountrySet {
            peer_id,
            country_code,
        } => ws_dto::ServerMessage::RemoteCountrySet {
            peer_id: peer_id.clone(),
            country_code: country_code.clone(),
        },
        OutboundMessage::Expire { src } => ws_dto::ServerMessage::Expire { src: src.clone() },
    };
    server_message.to_json()
}

impl From<Peer> for http_dto::PeerDetailDto {
    fn from(peer: Peer) -> Self {
        Self {
            peer_id: peer.id.into_string(),
            country_code: peer
                .country_code
                .map(|code| code.to_string())
                .unwrap_or_default(),
            country_code_detected: peer.country_code_detected,
            country_name_detected: peer.country_name_detected,
            purpose: peer.purpose.to_string(),
            connected_at: timestamp_to_rfc3339(peer.connected_at.value()),
        }
    }
}

impl From<WaitingSlot> for http_dto::WaitingSlotDto {
    fn from(slot: WaitingSlot) -> Self {
        Self {
            country_code: slot.key.country,
            purpose: slot.key.purpose.to_string(),
            peer_id: slot.peer_id.map(|id| id.into_string()).unwrap_or_default(),
        }
    }
}

impl From<MatchmakingSnapshot> for http_dto::MatchmakingStateDto {
    fn from(snapshot: MatchmakingSnapshot) -> Self {
        Self {
            peer_count: snapshot.peers.len(),
            peers: snapshot.peers.into_iter().map(Into::into).collect(),
            waiting: snapshot.waiting.into_iter().map(Into::into).collect(),
        }
    }
}
