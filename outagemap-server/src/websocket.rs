//! WebSocket implementation for realtime report snapshots

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{api::dto::ReportDto, state::AppState};

/// WebSocket message types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum WebSocketMessage {
    /// Connection established
    Connected { connection_id: String },

    /// The full report collection, newest first. Sent on connect and after
    /// every change.
    Snapshot { reports: Vec<ReportDto> },

    /// Ping message for keepalive
    Ping,

    /// Pong response
    Pong,

    /// Error message
    Error {
        message: String,
        code: Option<String>,
    },
}

/// Handle WebSocket upgrade
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_websocket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = Uuid::new_v4();
    info!("WebSocket connection established: {}", connection_id);
    state.add_websocket_connection(connection_id);

    let (tx, mut rx) = mpsc::unbounded_channel::<WebSocketMessage>();
    let (mut sender, mut receiver) = socket.split();

    let connect_msg = WebSocketMessage::Connected {
        connection_id: connection_id.to_string(),
    };
    if let Ok(msg_text) = serde_json::to_string(&connect_msg)
        && sender.send(Message::Text(msg_text.into())).await.is_err()
    {
        warn!("Failed to send connection message to {}", connection_id);
        state.remove_websocket_connection(&connection_id);
        return;
    }

    let snapshot_tx = tx.clone();
    let subscription = state.service.subscribe(move |reports| {
        let reports = reports.into_iter().map(ReportDto::from).collect();
        let _ = snapshot_tx.send(WebSocketMessage::Snapshot { reports });
    });

    let idle_timeout = Duration::from_secs(state.config.websocket_timeout.max(1));
    let incoming_task = tokio::spawn(async move {
        loop {
            let msg = match tokio::time::timeout(idle_timeout, receiver.next()).await {
                Ok(Some(msg)) => msg,
                Ok(None) => break,
                Err(_) => {
                    info!("WebSocket {} idle for {:?}, closing", connection_id, idle_timeout);
                    break;
                }
            };

            match msg {
                Ok(Message::Text(text)) => {
                    debug!("Received WebSocket message from {}: {}", connection_id, text);
                    match serde_json::from_str::<WebSocketMessage>(&text) {
                        Ok(WebSocketMessage::Ping) => {
                            let _ = tx.send(WebSocketMessage::Pong);
                        }
                        Ok(_) => {
                            debug!("Unhandled WebSocket message type from {}", connection_id);
                        }
                        Err(e) => {
                            let _ = tx.send(WebSocketMessage::Error {
                                message: format!("Invalid message: {}", e),
                                code: Some("invalid_message".to_string()),
                            });
                        }
                    }
                }
                Ok(Message::Close(_)) => {
                    info!("WebSocket connection closed by client: {}", connection_id);
                    break;
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", connection_id, e);
                    break;
                }
                _ => {}
            }
        }
    });

    let outgoing_task = tokio::spawn(async move {
        while let Some(ws_msg) = rx.recv().await {
            if let Ok(msg_text) = serde_json::to_string(&ws_msg)
                && sender.send(Message::Text(msg_text.into())).await.is_err()
            {
                error!("Failed to send message to WebSocket {}", connection_id);
                break;
            }
        }
    });

    let incoming_abort = incoming_task.abort_handle();
    let outgoing_abort = outgoing_task.abort_handle();
    tokio::select! {
        _ = incoming_task => {
            debug!("Incoming task completed for {}", connection_id);
        }
        _ = outgoing_task => {
            debug!("Outgoing task completed for {}", connection_id);
        }
    }
    incoming_abort.abort();
    outgoing_abort.abort();

    subscription.unsubscribe();
    state.remove_websocket_connection(&connection_id);
    info!("WebSocket connection closed: {}", connection_id);
}
