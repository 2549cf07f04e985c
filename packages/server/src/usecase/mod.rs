//! UseCase 層：接続ライフサイクル・シグナリング・管理用の参照

mod connect_peer;
mod disconnect_peer;
mod error;
mod get_matchmaking_state;
mod lifecycle;
mod notify;
mod relay_signal;
mod signaling_router;

pub use connect_peer::ConnectPeerUseCase;
pub use disconnect_peer::DisconnectPeerUseCase;
pub use error::{ConnectError, RelayError};
pub use get_matchmaking_state::GetMatchmakingStateUseCase;
pub use lifecycle::ConnectionLifecycleBinder;
pub use relay_signal::RelaySignalUseCase;
pub use signaling_router::SignalingMessageRouter;
