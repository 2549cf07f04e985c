//! Chat Roulette matchmaking and signaling server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chatroulette-server
//! cargo run --bin chatroulette-server -- --host 0.0.0.0 --port 9000 --geoip-db ./GeoLite2-Country.mmdb --path /openchatroulette
//! ```

use std::sync::Arc;

use chatroulette_server::{
    infrastructure::{
        geo::MaxMindGeoLocator, message_pusher::WebSocketMessagePusher,
        repository::InMemoryMatchmakingRepository,
    },
    ui::Server,
    usecase::{
        ConnectPeerUseCase, ConnectionLifecycleBinder, DisconnectPeerUseCase,
        GetMatchmakingStateUseCase, RelaySignalUseCase, SignalingMessageRouter,
    },
};
use chatroulette_shared::{logger::setup_logger, time::SystemClock};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chatroulette-server")]
#[command(about = "Peer matching and WebRTC signaling server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "9000")]
    port: u16,

    /// Path to a MaxMind GeoLite2/GeoIP2 country database
    #[arg(long, env = "GEOIP_DB", default_value = "GeoLite2-Country.mmdb")]
    geoip_db: String,

    /// Key clients must pass on the signaling endpoint
    #[arg(long, env = "PEER_KEY", default_value = "peerjs")]
    key: String,

    /// Base path the PeerJS endpoints are mounted under
    #[arg(long, env = "PEER_PATH", default_value = "/openchatroulette")]
    path: String,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher / GeoLocator
    // 3. UseCases
    // 4. Server

    // 1. Create Repository (in-memory registry and waiting slots)
    let repository = Arc::new(InMemoryMatchmakingRepository::new());

    // 2. Create MessagePusher (WebSocket implementation) and GeoLocator
    let message_pusher = Arc::new(WebSocketMessagePusher::new());
    let geo_locator = Arc::new(MaxMindGeoLocator::open(&args.geoip_db));

    // 3. Create UseCases
    let connect_peer_usecase = Arc::new(ConnectPeerUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        geo_locator,
        Arc::new(SystemClock),
    ));
    let disconnect_peer_usecase = Arc::new(DisconnectPeerUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let router = Arc::new(SignalingMessageRouter::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let relay_signal_usecase = Arc::new(RelaySignalUseCase::new(message_pusher.clone()));
    let binder = Arc::new(ConnectionLifecycleBinder::new(
        connect_peer_usecase,
        disconnect_peer_usecase,
        router,
        relay_signal_usecase,
    ));
    let get_matchmaking_state_usecase =
        Arc::new(GetMatchmakingStateUseCase::new(repository.clone()));

    // 4. Create and run the server
    let server = Server::new(
        binder,
        get_matchmaking_state_usecase,
        args.key,
        &args.path,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
