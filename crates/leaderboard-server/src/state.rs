//! Shared application state for the leaderboard server.
//!
//! [`AppState`] owns the ledger, the connection registry and the
//! coordinator that ties them together. It is wrapped in [`Arc`] and
//! injected into every handler via Axum's `State` extractor.

use std::sync::Arc;

use leaderboard_store::KvStore;

use crate::broadcast::BroadcastCoordinator;
use crate::ledger::Ledger;
use crate::registry::ConnectionRegistry;

/// Shared state for the Axum application.
#[derive(Debug)]
pub struct AppState<S> {
    /// Per-player counters over the key-value store.
    pub ledger: Arc<Ledger<S>>,
    /// Open push connections.
    pub registry: Arc<ConnectionRegistry>,
    /// Publishes the leaderboard to every open connection.
    pub coordinator: BroadcastCoordinator<S>,
}

impl<S: KvStore> AppState<S> {
    /// Create application state over `store` with no open connections.
    pub fn new(store: S) -> Self {
        let ledger = Arc::new(Ledger::new(store));
        let registry = Arc::new(ConnectionRegistry::new());
        let coordinator = BroadcastCoordinator::new(Arc::clone(&ledger), Arc::clone(&registry));
        Self {
            ledger,
            registry,
            coordinator,
        }
    }
}
