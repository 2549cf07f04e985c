//! WebSocket connection handler for the `/peerjs` signaling endpoint.
//!
//! The upgrade always succeeds. A bad key, a malformed id or an id that is
//! already live is reported to the client as an `ERROR` / `ID-TAKEN` message
//! followed by a close frame, the way PeerJS clients expect.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{
        ConnectInfo, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::HeaderMap,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::PeerId,
    infrastructure::dto::{conversion::decode_envelope, websocket::ServerMessage},
    ui::{client_ip::extract_client_ip, state::AppState},
    usecase::ConnectError,
};

/// Query parameters of `GET /peerjs`
#[derive(Debug, Deserialize)]
pub struct PeerQuery {
    pub id: Option<String>,
    pub key: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<PeerQuery>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let admission = admit(&state.peer_key, query);
    let ip_address = extract_client_ip(&headers, remote_addr);
    ws.on_upgrade(move |socket| handle_socket(socket, state, admission, ip_address))
}

/// Check the key and resolve the peer id. A missing or empty id gets a fresh UUID.
fn admit(peer_key: &str, query: PeerQuery) -> Result<PeerId, ServerMessage> {
    if query.key.as_deref() != Some(peer_key) {
        tracing::warn!("Rejecting connection with invalid key");
        return Err(ServerMessage::error("Invalid key provided"));
    }

    // Convert String -> PeerId (Domain Model)
    match query.id.filter(|id| !id.is_empty()) {
        Some(id) => PeerId::try_from(id).map_err(|e| {
            tracing::warn!("Invalid peer id: {}", e);
            ServerMessage::error("Invalid id provided")
        }),
        None => Ok(PeerId::generate()),
    }
}

/// Send a single rejection message and close the socket.
async fn reject(mut socket: WebSocket, message: ServerMessage) {
    match message.to_json() {
        Ok(json) => {
            if let Err(e) = socket.send(Message::Text(json.into())).await {
                tracing::debug!("Failed to send rejection: {}", e);
            }
        }
        Err(e) => tracing::error!("Failed to serialize {:?}: {}", message, e),
    }
    let _ = socket.send(Message::Close(None)).await;
}

/// Spawns a task that drains the peer's channel into the WebSocket sink.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    admission: Result<PeerId, ServerMessage>,
    ip_address: String,
) {
    let peer_id = match admission {
        Ok(peer_id) => peer_id,
        Err(message) => return reject(socket, message).await,
    };

    // Create a channel for this peer to receive messages
    let (tx, rx) = mpsc::unbounded_channel();

    match state.binder.on_connect(peer_id.clone(), &ip_address, tx).await {
        Ok(_) => {}
        Err(ConnectError::DuplicatePeerId(id)) => {
            tracing::warn!(
                "Peer with ID '{}' is already connected. Rejecting connection.",
                id
            );
            return reject(socket, ServerMessage::id_taken()).await;
        }
        Err(e) => {
            tracing::error!("Failed to connect peer: {}", e);
            return reject(socket, ServerMessage::error("Failed to register peer")).await;
        }
    }

    let (sender, mut receiver) = socket.split();

    let recv_state = state.clone();
    let recv_peer_id = peer_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    recv_state.binder.on_error(&recv_peer_id, &e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received from '{}': {}", recv_peer_id, text.as_str());
                    match decode_envelope(text.as_str()) {
                        Ok(envelope) => recv_state.binder.on_message(&recv_peer_id, envelope).await,
                        Err(e) => {
                            tracing::warn!("Invalid envelope from '{}': {}", recv_peer_id, e)
                        }
                    }
                }
                Message::Binary(_) => {
                    tracing::warn!("Ignoring binary frame from '{}'", recv_peer_id);
                }
                Message::Close(_) => {
                    tracing::info!("Peer '{}' requested close", recv_peer_id);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.binder.on_disconnect(&peer_id).await;
}
