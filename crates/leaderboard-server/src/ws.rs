//! Push endpoint: long-lived `WebSocket` connections for viewers.
//!
//! Clients connect to `GET /ws-leaderboard` and receive the leaderboard
//! as a JSON text frame every time it changes. The channel is push-only:
//! inbound frames are read solely to notice when the peer goes away.
//!
//! Each connection runs two halves. The writer task drains the
//! connection's outbound queue into the socket; the reader loop below
//! waits for close or error. Whichever half finishes first ends the
//! connection and unregisters it.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use leaderboard_store::KvStore;
use tracing::{debug, info};

use crate::registry::{ConnectionHandle, ConnectionId, ConnectionRegistry, FrameReceiver};
use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` push connection.
///
/// # Route
///
/// `GET /ws-leaderboard`
pub async fn ws_leaderboard<S: KvStore>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    let registry = Arc::clone(&state.registry);
    ws.on_upgrade(move |socket| handle_ws(socket, registry))
}

/// Run one connection from registration to teardown.
async fn handle_ws(socket: WebSocket, registry: Arc<ConnectionRegistry>) {
    let (handle, frames) = ConnectionHandle::channel();
    let id = handle.id();
    registry.register(handle);
    info!(connection = %id, live = registry.len(), "Push connection opened");

    let (sink, mut stream) = socket.split();
    let mut writer = tokio::spawn(write_frames(sink, frames, id));

    loop {
        tokio::select! {
            _ = &mut writer => {
                debug!(connection = %id, "Writer finished, closing connection");
                break;
            }
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(connection = %id, "Peer closed connection");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!(connection = %id, "WebSocket read error: {e}");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Inbound frames only prove the peer is alive.
                    }
                }
            }
        }
    }

    // A failed broadcast may already have removed it.
    if registry.unregister(id) {
        info!(connection = %id, live = registry.len(), "Push connection closed");
    }
    writer.abort();
}

/// Forward queued frames to the socket until the queue or the socket
/// closes.
///
/// Returning drops `frames`, so later sends to this connection fail and
/// the next broadcast prunes it.
async fn write_frames(
    mut sink: SplitSink<WebSocket, Message>,
    mut frames: FrameReceiver,
    id: ConnectionId,
) {
    while let Some(frame) = frames.recv().await {
        if let Err(e) = sink.send(frame).await {
            debug!(connection = %id, "WebSocket send failed: {e}");
            return;
        }
    }
    // Unregistered: the registry held the only sender.
    if let Err(e) = sink.close().await {
        debug!(connection = %id, "WebSocket close failed: {e}");
    }
}
