//! Key-value store seam for the live leaderboard.
//!
//! The leaderboard keeps its per-player counters in an external
//! key-value service. Only three commands are consumed -- `GET`, `SET`
//! and `KEYS prefix*` -- so any backend offering them satisfies the
//! [`KvStore`] contract.
//!
//! # Backends
//!
//! ```text
//! Ledger
//!     |
//!     +-- KvStore ---+-- RedisStore   (Redis / Dragonfly via fred)
//!                    +-- MemoryStore  (in-process, dev + tests)
//!                    +-- FaultyStore  (feature `test-util`)
//! ```
//!
//! # Modules
//!
//! - [`kv`] -- the [`KvStore`] trait and counter parsing
//! - [`redis`] -- Redis-compatible backend
//! - [`memory`] -- in-process backend
//! - [`error`] -- shared error types

pub mod error;
pub mod kv;
pub mod memory;
pub mod redis;
#[cfg(feature = "test-util")]
pub mod testing;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use kv::{KvStore, parse_counter};
pub use memory::MemoryStore;
pub use redis::RedisStore;
#[cfg(feature = "test-util")]
pub use testing::{FaultyStore, StoreOp};
