//! Live leaderboard server.
//!
//! Clients submit score and games-played deltas over HTTP; per-player
//! totals accumulate in an external key-value store; every connected
//! viewer receives the recomputed leaderboard over a `WebSocket` push
//! channel whenever it changes.
//!
//! # Architecture
//!
//! ```text
//! POST /updateScore, /updateGames
//!     |
//!     +-- Ledger (incr_by) ---------> KvStore
//!     |
//!     +-- BroadcastCoordinator::publish
//!             |-- Ledger::snapshot --> KvStore (KEYS + GET)
//!             +-- ConnectionRegistry::for_each (send, prune)
//!
//! GET /ws-leaderboard --> register / unregister only
//! ```
//!
//! Publishing is synchronous and unbatched: every successful mutation
//! triggers exactly one full broadcast before the request completes.

pub mod broadcast;
pub mod config;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod model;
pub mod registry;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use broadcast::{BroadcastCoordinator, PublishOutcome};
pub use crate::config::{LeaderboardConfig, StoreBackend};
pub use error::LeaderboardError;
pub use ledger::{Counter, Ledger};
pub use model::{Leaderboard, PlayerRecord};
pub use registry::{ConnectionHandle, ConnectionId, ConnectionRegistry, Delivery};
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
