//! `WebSocket` handler for real-time frame streaming.
//!
//! Clients connect to `GET /ws/frames`, immediately receive the current
//! frame, and then a JSON-encoded [`Frame`](tally_core::Frame) each time the
//! driver publishes one.
//!
//! If a client falls behind, lagged frames are silently skipped and the
//! client resumes from the most recent one.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use serde::Serialize;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming frames.
///
/// # Route
///
/// `GET /ws/frames`
pub async fn ws_frames(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Serialize `value` and send it as a text message.
///
/// Returns `false` once the client is gone.
async fn send_json<T: Serialize>(socket: &mut WebSocket, value: &T) -> bool {
    let json = match serde_json::to_string(value) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize frame: {e}");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

/// Handle the `WebSocket` lifecycle: send the current frame, subscribe to
/// the broadcast channel and forward each frame.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");

    let mut rx = state.subscribe();
    let current = state.view.borrow().frame.clone();
    if !send_json(&mut socket, &current).await {
        debug!("WebSocket client disconnected (send failed)");
        return;
    }

    loop {
        tokio::select! {
            // Receive a frame from the driver.
            result = rx.recv() => {
                match result {
                    Ok(frame) => {
                        if !send_json(&mut socket, &frame).await {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            // Check if the client sent a close frame or disconnected.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    _ => {}
                }
            }
        }
    }
}
