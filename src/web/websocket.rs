//! WebSocket handler streaming field frames to the dashboard.

use crate::web::state::{DashboardState, FieldFrame};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::{debug, info, warn};

/// WebSocket upgrade handler.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<DashboardState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

fn encode(frame: &FieldFrame) -> Option<Message> {
    match serde_json::to_string(frame) {
        Ok(json) => Some(Message::Text(json)),
        Err(e) => {
            warn!("Failed to serialize field frame: {}", e);
            None
        }
    }
}

/// Handle a WebSocket connection.
async fn handle_websocket(socket: WebSocket, state: DashboardState) {
    let client_id = uuid::Uuid::new_v4().to_string();
    info!("Dashboard client connected: {}", client_id);
    state.client_connected();

    let (mut sender, mut receiver) = socket.split();
    let mut frames = BroadcastStream::new(state.subscribe());

    // Bring the client up to date before streaming.
    if let Some(message) = encode(&state.latest()) {
        if sender.send(message).await.is_err() {
            state.client_disconnected();
            return;
        }
    }

    loop {
        tokio::select! {
            frame = frames.next() => match frame {
                Some(Ok(frame)) => {
                    let Some(message) = encode(&frame) else { continue };
                    if let Err(e) = sender.send(message).await {
                        warn!("Failed to send frame to client {}: {}", client_id, e);
                        break;
                    }
                }
                Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                    debug!("Client {} lagged, skipped {} frames", client_id, skipped);
                }
                None => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("WebSocket error for client {}: {}", client_id, e);
                    break;
                }
            },
        }
    }

    state.client_disconnected();
    info!("Dashboard client disconnected: {}", client_id);
}
