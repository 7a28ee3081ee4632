//! `WebSocket` chat channel.
//!
//! Clients connect to `GET /ws/chat`. Every text frame a client sends is
//! published on the shared [`broadcast`](tokio::sync::broadcast) channel
//! and forwarded to every connected client, the sender included. There is
//! no per-client state and no delivery guarantee.
//!
//! If a client falls behind, lagged messages are silently skipped and
//! the client resumes from the most recent message.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` chat connection.
///
/// # Route
///
/// `GET /ws/chat`
pub async fn ws_chat(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Relay frames between one socket and the shared channel until either
/// side closes.
async fn handle_ws(mut socket: WebSocket, state: AppState) {
    debug!("Chat client connected");

    let mut rx = state.subscribe();

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(text) => {
                        if socket.send(Message::Text(text.into())).await.is_err() {
                            debug!("Chat client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "Chat client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Chat channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let receivers = state.broadcast(text.as_str());
                        debug!(receivers, "Chat message relayed");
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("Chat client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("Chat client disconnected");
                        return;
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    // Binary frames and pongs are ignored.
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}
