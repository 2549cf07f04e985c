//! Signaling envelopes exchanged over the WebSocket connection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound envelope: `{type, payload?, dst?, ...}`.
///
/// Unknown fields are ignored here; relayed envelopes are forwarded as raw JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Option<Value>,
    #[serde(default)]
    pub dst: Option<String>,
}

/// Outbound server → client messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// Connection accepted
    Open,
    /// Country detected from the peer's IP at connect time
    CountryDetected {
        country_code: String,
        country_name: String,
    },
    /// Result of a match request; `peer_id` is empty when no partner was found
    NewRemotePeer {
        peer_id: String,
        country_code: String,
    },
    /// Detected country of the peer a caller just reached
    RemoteCountrySet {
        peer_id: String,
        country_code: String,
    },
    /// A relayed envelope could not be delivered to `src`
    Expire { src: String },
    /// The requested id belongs to a live connection
    #[serde(rename = "ID-TAKEN")]
    IdTaken { payload: ErrorPayload },
    /// The connection was refused (bad key or malformed id)
    Error { payload: ErrorPayload },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub msg: String,
}

impl ServerMessage {
    pub fn id_taken() -> Self {
        Self::IdTaken {
            payload: ErrorPayload {
                msg: "ID is taken".to_string(),
            },
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error {
            payload: ErrorPayload { msg: msg.into() },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
