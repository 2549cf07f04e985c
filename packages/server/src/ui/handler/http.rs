//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    domain::PeerId,
    infrastructure::dto::http::{MatchmakingStateDto, PeerCountDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Hand out a fresh peer id (plain text), as PeerJS clients expect
pub async fn generate_peer_id() -> String {
    PeerId::generate().into_string()
}

/// Number of registered peers
pub async fn peer_count(State(state): State<Arc<AppState>>) -> Json<PeerCountDto> {
    let count = state.get_matchmaking_state_usecase.count_peers().await;
    Json(PeerCountDto { count })
}

/// Debug endpoint: registry and waiting slots (read-only)
pub async fn debug_state(State(state): State<Arc<AppState>>) -> Json<MatchmakingStateDto> {
    let snapshot = state.get_matchmaking_state_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(snapshot.into())
}
