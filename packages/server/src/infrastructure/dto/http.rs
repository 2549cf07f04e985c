//! HTTP API response DTOs.

use serde::Serialize;

/// Connected peer as shown by the admin dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerDetailDto {
    pub peer_id: String,
    /// Country filter, empty when any country is accepted
    pub country_code: String,
    pub country_code_detected: String,
    pub country_name_detected: String,
    pub purpose: String,
    /// RFC 3339 (UTC)
    pub connected_at: String,
}

/// One waiting slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingSlotDto {
    pub country_code: String,
    pub purpose: String,
    /// Waiting peer, empty when the slot is free
    pub peer_id: String,
}

/// Read-only dump of the registry and waiting slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchmakingStateDto {
    pub peer_count: usize,
    pub peers: Vec<PeerDetailDto>,
    pub waiting: Vec<WaitingSlotDto>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeerCountDto {
    pub count: usize,
}
