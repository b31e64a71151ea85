//! WebSocket integration tests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use outagemap::prelude::*;
use outagemap_server::config::ServerConfig;
use outagemap_server::websocket::WebSocketMessage;
use outagemap_server::{AppState, create_router};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Client = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

async fn start_server() -> (SocketAddr, Arc<AppState>) {
    let service = ReportService::with_store(Arc::new(MemoryReportStore::new()));
    let state = Arc::new(AppState::new(service, ServerConfig::default()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

async fn next_message(client: &mut Client) -> WebSocketMessage {
    loop {
        let msg = timeout(Duration::from_secs(5), client.next())
            .await
            .expect("Timeout waiting for message")
            .expect("No message received")
            .expect("WebSocket error");

        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).expect("Invalid JSON");
        }
    }
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{}/api/ws", addr))
        .await
        .expect("Failed to connect");
    client
}

#[tokio::test]
async fn test_connect_then_initial_snapshot() {
    let (addr, _state) = start_server().await;
    let mut client = connect(addr).await;

    match next_message(&mut client).await {
        WebSocketMessage::Connected { connection_id } => assert!(!connection_id.is_empty()),
        other => panic!("Expected Connected message, got: {:?}", other),
    }

    match next_message(&mut client).await {
        WebSocketMessage::Snapshot { reports } => assert!(reports.is_empty()),
        other => panic!("Expected Snapshot message, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_snapshot_after_change() {
    let (addr, state) = start_server().await;
    let mut client = connect(addr).await;

    // Connected, then the initial empty snapshot
    let _ = next_message(&mut client).await;
    let _ = next_message(&mut client).await;

    let draft = ReportDraft::new(ServiceType::Electricity, "ICE");
    state
        .service
        .create_from_draft(
            &Identity::new("user-1"),
            &draft,
            Coordinates::new(9.9281, -84.0907),
            None,
            None,
        )
        .await
        .unwrap();

    match next_message(&mut client).await {
        WebSocketMessage::Snapshot { reports } => {
            assert_eq!(reports.len(), 1);
            assert_eq!(reports[0].provider, "ICE");
            assert_eq!(reports[0].service_type, "electricity");
        }
        other => panic!("Expected Snapshot message, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_ping_pong() {
    let (addr, state) = start_server().await;
    let mut client = connect(addr).await;

    let _ = next_message(&mut client).await;
    let _ = next_message(&mut client).await;
    assert_eq!(state.websocket_connection_count(), 1);

    let ping = serde_json::to_string(&WebSocketMessage::Ping).unwrap();
    client.send(Message::Text(ping.into())).await.unwrap();

    match next_message(&mut client).await {
        WebSocketMessage::Pong => {}
        other => panic!("Expected Pong message, got: {:?}", other),
    }
}
