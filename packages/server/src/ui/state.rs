//! Server state shared by the handlers.

use std::sync::Arc;

use crate::usecase::{ConnectionLifecycleBinder, GetMatchmakingStateUseCase};

/// Shared application state
pub struct AppState {
    /// 接続ライフサイクル（接続・受信・切断）
    pub binder: Arc<ConnectionLifecycleBinder>,
    /// マッチング状態の参照
    pub get_matchmaking_state_usecase: Arc<GetMatchmakingStateUseCase>,
    /// `key` query parameter clients must present on `/peerjs`
    pub peer_key: String,
}
