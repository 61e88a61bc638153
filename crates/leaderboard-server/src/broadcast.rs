//! Broadcast coordinator: fan a fresh leaderboard out to every viewer.
//!
//! [`BroadcastCoordinator::publish`] is called once after every
//! successful ledger mutation. Calls are not batched or debounced, so a
//! burst of updates produces one full broadcast each.

use std::sync::Arc;

use axum::extract::ws::{Message, Utf8Bytes};
use leaderboard_store::KvStore;
use tracing::{debug, info, warn};

use crate::ledger::Ledger;
use crate::registry::{ConnectionId, ConnectionRegistry, Delivery};

/// Result of a single [`BroadcastCoordinator::publish`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The snapshot was sent to every live connection.
    Sent {
        /// Connections the payload was queued for.
        delivered: usize,
        /// Connections found dead and removed during the pass.
        pruned: Vec<ConnectionId>,
    },
    /// The snapshot could not be read or encoded; nothing was sent.
    Aborted,
}

/// Computes leaderboard snapshots and pushes them to the registry.
#[derive(Debug)]
pub struct BroadcastCoordinator<S> {
    ledger: Arc<Ledger<S>>,
    registry: Arc<ConnectionRegistry>,
}

impl<S> Clone for BroadcastCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<S: KvStore> BroadcastCoordinator<S> {
    /// Create a coordinator over a shared ledger and registry.
    pub const fn new(ledger: Arc<Ledger<S>>, registry: Arc<ConnectionRegistry>) -> Self {
        Self { ledger, registry }
    }

    /// Snapshot the ledger and send it to every registered connection.
    ///
    /// The snapshot is serialized once and the identical text frame goes
    /// to every handle. A handle whose send fails is unregistered in the
    /// same pass, so when this returns every connection registered at the
    /// start has either been handed the payload or removed. If the
    /// snapshot fails, the publish is logged and abandoned without
    /// sending anything.
    pub async fn publish(&self) -> PublishOutcome {
        let leaderboard = match self.ledger.snapshot().await {
            Ok(board) => board,
            Err(e) => {
                warn!(error = %e, "Leaderboard snapshot failed, publish aborted");
                return PublishOutcome::Aborted;
            }
        };

        let payload = match serde_json::to_string(&leaderboard) {
            Ok(json) => Utf8Bytes::from(json),
            Err(e) => {
                warn!("Failed to serialize leaderboard: {e}");
                return PublishOutcome::Aborted;
            }
        };

        let mut delivered: usize = 0;
        let pruned = self.registry.for_each(|handle| {
            let outcome = handle.send(Message::Text(payload.clone()));
            if outcome == Delivery::Queued {
                delivered = delivered.saturating_add(1);
            }
            outcome
        });

        for id in &pruned {
            info!(connection = %id, "Push connection dropped after failed send");
        }
        debug!(
            players = leaderboard.len(),
            delivered,
            pruned = pruned.len(),
            "Leaderboard published"
        );

        PublishOutcome::Sent { delivered, pruned }
    }
}
