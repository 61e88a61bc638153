//! Integration tests for the `WebSocket` push endpoint.
//!
//! Each test serves the real router on an ephemeral local port and
//! connects a `tokio-tungstenite` client, so the upgrade, registration
//! and teardown paths run exactly as they do in production. Updates are
//! driven through the same shared state with `tower::ServiceExt`.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::{SinkExt, StreamExt};
use leaderboard_server::{AppState, Delivery, build_router};
use leaderboard_store::MemoryStore;
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn start_test_server() -> (Arc<AppState<MemoryStore>>, SocketAddr) {
    let state = Arc::new(AppState::new(MemoryStore::new()));
    let app = build_router(Arc::clone(&state));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (state, addr)
}

async fn connect(addr: SocketAddr) -> Client {
    let (socket, _) = connect_async(format!("ws://{addr}/ws-leaderboard"))
        .await
        .unwrap();
    socket
}

/// Poll until `live` connections are registered.
async fn wait_for_connections(state: &AppState<MemoryStore>, live: usize) {
    tokio::time::timeout(WAIT, async {
        while state.registry.len() != live {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("expected {live} connections, have {}", state.registry.len()));
}

async fn update_score(state: &Arc<AppState<MemoryStore>>, body: &str) {
    let response = build_router(Arc::clone(state))
        .oneshot(
            Request::post("/updateScore")
                .body(Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

async fn next_json(client: &mut Client) -> Value {
    let message = tokio::time::timeout(WAIT, client.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    match message {
        Message::Text(body) => serde_json::from_str(body.as_str()).unwrap(),
        other => panic!("expected text frame, got {other:?}"),
    }
}

/// Read until the server ends the stream, ignoring anything else.
async fn wait_for_server_close(client: &mut Client) {
    tokio::time::timeout(WAIT, async {
        loop {
            match client.next().await {
                Some(Ok(Message::Close(_)) | Err(_)) | None => return,
                Some(Ok(_)) => {}
            }
        }
    })
    .await
    .unwrap();
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_connect_registers_and_close_unregisters() {
    let (state, addr) = start_test_server().await;

    let mut client = connect(addr).await;
    wait_for_connections(&state, 1).await;

    client.close(None).await.unwrap();
    wait_for_connections(&state, 0).await;
}

#[tokio::test]
async fn test_update_is_pushed_to_every_socket() {
    let (state, addr) = start_test_server().await;
    let mut first = connect(addr).await;
    let mut second = connect(addr).await;
    wait_for_connections(&state, 2).await;

    update_score(&state, r#"{"name":"alice","score":5}"#).await;

    let expected = json!([{"name": "alice", "score": 5, "gamesPlayed": 0}]);
    assert_eq!(next_json(&mut first).await, expected);
    assert_eq!(next_json(&mut second).await, expected);

    update_score(&state, r#"{"name":"alice","score":3}"#).await;
    assert_eq!(next_json(&mut first).await[0]["score"], 8);
    assert_eq!(next_json(&mut second).await[0]["score"], 8);
}

#[tokio::test]
async fn test_client_frames_are_ignored() {
    let (state, addr) = start_test_server().await;
    let mut client = connect(addr).await;
    wait_for_connections(&state, 1).await;

    client.send(Message::Text("hello".into())).await.unwrap();
    client.send(Message::Binary(vec![1, 2, 3].into())).await.unwrap();

    update_score(&state, r#"{"name":"bob","score":1}"#).await;
    assert_eq!(next_json(&mut client).await[0]["name"], "bob");
    assert_eq!(state.registry.len(), 1);
}

#[tokio::test]
async fn test_abrupt_disconnect_unregisters() {
    let (state, addr) = start_test_server().await;
    let client = connect(addr).await;
    wait_for_connections(&state, 1).await;

    drop(client);
    wait_for_connections(&state, 0).await;

    update_score(&state, r#"{"name":"carol","score":2}"#).await;
    assert!(state.registry.is_empty());
}

#[tokio::test]
async fn test_server_side_removal_closes_socket() {
    let (state, addr) = start_test_server().await;
    let mut removed_client = connect(addr).await;
    wait_for_connections(&state, 1).await;

    // Drop it from the registry the way a failed broadcast send does.
    let removed = state.registry.for_each(|_| Delivery::Closed);
    assert_eq!(removed.len(), 1);

    let mut kept = connect(addr).await;
    wait_for_connections(&state, 1).await;

    wait_for_server_close(&mut removed_client).await;

    update_score(&state, r#"{"name":"dave","score":4}"#).await;
    assert_eq!(next_json(&mut kept).await[0]["score"], 4);
    assert_eq!(state.registry.len(), 1);
}
