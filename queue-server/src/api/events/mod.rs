//! WebSocket 事件推送
//!
//! `GET /ws` upgrades to a WebSocket that streams ticket lifecycle
//! events as JSON text frames. Observers (kiosk, dashboard, display)
//! only listen; anything they send is ignored.
//!
//! Delivery is best-effort: a subscriber that lags past the broadcast
//! buffer skips the missed events and keeps receiving, which is fine
//! for display screens that only care about the latest state.

use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::core::ServerState;

/// Connection counter for logging
static NEXT_CONNECTION_ID: AtomicUsize = AtomicUsize::new(1);
static ACTIVE_CONNECTIONS: AtomicUsize = AtomicUsize::new(0);

pub fn router() -> Router<ServerState> {
    Router::new().route("/ws", get(ws_handler))
}

async fn ws_handler(State(state): State<ServerState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: ServerState) {
    let conn_id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
    let active = ACTIVE_CONNECTIONS.fetch_add(1, Ordering::Relaxed) + 1;
    tracing::info!(conn_id, active, "Observer connected");

    let mut rx = state.notifier.subscribe();
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        let payload = match serde_json::to_string(&event) {
                            Ok(json) => json,
                            Err(e) => {
                                tracing::error!(conn_id, error = %e, "Failed to serialize event");
                                continue;
                            }
                        };
                        if sender.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(conn_id, skipped, "Observer lagged, events skipped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    // Observers are read-only; ignore anything but close
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    let active = ACTIVE_CONNECTIONS.fetch_sub(1, Ordering::Relaxed) - 1;
    tracing::info!(conn_id, active, "Observer disconnected");
}
