//! Connection registry: the set of open push channels.
//!
//! Every open `WebSocket` is represented by a [`ConnectionHandle`] holding
//! the sending half of that connection's bounded outbound queue. The
//! registry never touches sockets; it only tracks which handles are live.
//! A viewer that lets its queue fill up is treated like a broken one.
//!
//! All access goes through a single mutex, so `register`, `unregister`
//! and a broadcast pass in [`ConnectionRegistry::for_each`] never
//! interleave.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use axum::extract::ws::Message;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;
use uuid::Uuid;

/// Opaque identity of one push connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Frames a connection may have queued before it counts as stalled.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 32;

/// The sending half of a connection's outbound frame queue.
pub type FrameSender = mpsc::Sender<Message>;

/// The receiving half, drained by the connection's writer task.
pub type FrameReceiver = mpsc::Receiver<Message>;

/// A registered push connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: FrameSender,
}

impl ConnectionHandle {
    /// Create a handle and the receiver its writer task will drain.
    pub fn channel() -> (Self, FrameReceiver) {
        let (sender, receiver) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        let handle = Self {
            id: ConnectionId::new(),
            sender,
        };
        (handle, receiver)
    }

    /// This connection's identity.
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue `frame` for delivery without waiting.
    ///
    /// Returns [`Delivery::Closed`] if the writer side has gone away or
    /// its queue is full. A full queue means the peer stopped reading;
    /// frames are never held back for a later retry.
    pub fn send(&self, frame: Message) -> Delivery {
        match self.sender.try_send(frame) {
            Ok(()) => Delivery::Queued,
            Err(TrySendError::Full(_)) => {
                debug!(connection = %self.id, "Outbound queue full, dropping connection");
                Delivery::Closed
            }
            Err(TrySendError::Closed(_)) => Delivery::Closed,
        }
    }
}

/// Outcome of handing a frame to one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The frame is queued for the writer task.
    Queued,
    /// The connection is gone and should be dropped from the registry.
    Closed,
}

/// Thread-safe set of live push connections.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<ConnectionId, ConnectionHandle>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConnectionId, ConnectionHandle>> {
        // The map stays consistent even if a holder panicked mid-pass.
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Add `handle` to the set. Registering the same id again is a no-op.
    ///
    /// Returns `true` if the handle was newly added.
    pub fn register(&self, handle: ConnectionHandle) -> bool {
        let mut connections = self.lock();
        if connections.contains_key(&handle.id) {
            return false;
        }
        connections.insert(handle.id, handle);
        true
    }

    /// Remove the connection with `id` if present.
    ///
    /// Returns `true` if this call removed it, so exactly one caller
    /// observes the removal even when the reader and a broadcast race.
    pub fn unregister(&self, id: ConnectionId) -> bool {
        self.lock().remove(&id).is_some()
    }

    /// Whether a connection with `id` is registered.
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.lock().contains_key(&id)
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no connections are registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Visit every registered connection while holding the lock.
    ///
    /// `visit` returns [`Delivery::Closed`] to have that handle removed
    /// in the same pass. Each handle is visited exactly once, and
    /// concurrent `register`/`unregister` calls wait until the pass ends.
    /// Returns the ids that were removed.
    pub fn for_each<F>(&self, mut visit: F) -> Vec<ConnectionId>
    where
        F: FnMut(&ConnectionHandle) -> Delivery,
    {
        let mut removed = Vec::new();
        self.lock().retain(|id, handle| match visit(handle) {
            Delivery::Queued => true,
            Delivery::Closed => {
                removed.push(*id);
                false
            }
        });
        removed
    }
}
