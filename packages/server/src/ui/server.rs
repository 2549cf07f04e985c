//! Server execution logic.

use std::{net::SocketAddr, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::{ConnectionLifecycleBinder, GetMatchmakingStateUseCase};

use super::{
    handler::{debug_state, generate_peer_id, health_check, peer_count, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Matchmaking and signaling server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     binder,
///     get_matchmaking_state_usecase,
///     "peerjs".to_string(),
///     "/openchatroulette",
/// );
/// server.run("127.0.0.1".to_string(), 9000).await?;
/// ```
pub struct Server {
    /// ConnectionLifecycleBinder（接続ライフサイクルの橋渡し）
    binder: Arc<ConnectionLifecycleBinder>,
    /// GetMatchmakingStateUseCase（マッチング状態参照のユースケース）
    get_matchmaking_state_usecase: Arc<GetMatchmakingStateUseCase>,
    peer_key: String,
    /// Prefix of the PeerJS routes, `None` to mount them at the root
    base_path: Option<String>,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `binder` - Lifecycle hooks called by the WebSocket handler
    /// * `get_matchmaking_state_usecase` - UseCase behind the read-only HTTP endpoints
    /// * `peer_key` - API key clients must pass as `key` on `/peerjs`
    /// * `base_path` - Path the PeerJS routes are mounted under (`/` for the root)
    pub fn new(
        binder: Arc<ConnectionLifecycleBinder>,
        get_matchmaking_state_usecase: Arc<GetMatchmakingStateUseCase>,
        peer_key: String,
        base_path: &str,
    ) -> Self {
        Self {
            binder,
            get_matchmaking_state_usecase,
            peer_key,
            base_path: normalize_base_path(base_path),
        }
    }

    /// Build the axum router with all endpoints
    pub fn router(self) -> Router {
        let app_state = Arc::new(AppState {
            binder: self.binder,
            get_matchmaking_state_usecase: self.get_matchmaking_state_usecase,
            peer_key: self.peer_key,
        });

        // PeerJS エンドポイント（WebSocket と ID 発行）
        let peerjs_routes = Router::new()
            .route("/peerjs", get(websocket_handler))
            .route("/peerjs/id", get(generate_peer_id));
        let peerjs_routes = match &self.base_path {
            Some(path) => Router::new().nest(path, peerjs_routes),
            None => peerjs_routes,
        };

        Router::new()
            .merge(peerjs_routes)
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/peers/count", get(peer_count))
            .route("/debug/state", get(debug_state))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Serve on an already bound listener until a shutdown signal arrives
    pub async fn serve(self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        tracing::info!(
            "Matchmaking server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Run the server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;
        tracing::info!(
            "Connect to: ws://{}{}/peerjs?id=<peer id>&key=<key>",
            bind_addr,
            self.base_path.as_deref().unwrap_or_default()
        );
        self.serve(listener).await
    }
}

/// `"/openchatroulette/"` → `Some("/openchatroulette")`, `"/"` or `""` → `None`
fn normalize_base_path(path: &str) -> Option<String> {
    let trimmed = path.trim_matches('/');
    (!trimmed.is_empty()).then(|| format!("/{trimmed}"))
}
