//! WebSocket streaming of scene changes and engine events.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct WsQuery {
    /// Set to false to receive engine events only (legend, distance, objects)
    scene: Option<bool>,
}

/// Handler for WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(params): Query<WsQuery>,
) -> axum::response::Response {
    let include_scene = params.scene.unwrap_or(true);
    ws.on_upgrade(move |socket| handle_socket(socket, state, include_scene))
        .into_response()
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, include_scene: bool) {
    let mut rx = state.hub().subscribe();
    tracing::debug!(include_scene, "stream client connected");

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Ping(payload))) => {
                        if socket.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }
            event = rx.recv() => {
                match event {
                    Ok(payload) => {
                        if payload.is_scene && !include_scene {
                            continue;
                        }
                        if socket.send(Message::Text(payload.json.as_ref().to_owned())).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Client can resync from /v1/scene and its x-stream-seq header
                        tracing::warn!(skipped, "stream client lagged");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("stream client disconnected");
}
