//! Score ledger: per-player counters accumulated in the key-value store.
//!
//! Each player owns two keys, `score:{name}` and `games:{name}`. The
//! ledger is the only place that knows this mapping.
//!
//! # Consistency
//!
//! Deltas go through [`KvStore::incr_by`]. With the Redis backend that is
//! a native `INCRBY`; other backends fall back to an unguarded
//! read-modify-write where concurrent deltas to the same name may lose an
//! update. That weak consistency is accepted for this workload.

use std::collections::BTreeSet;

use leaderboard_store::{KvStore, parse_counter};
use tracing::{debug, warn};

use crate::error::LeaderboardError;
use crate::model::{Leaderboard, PlayerRecord};

/// Key prefix for accumulated scores.
pub const SCORE_PREFIX: &str = "score:";

/// Key prefix for accumulated games played.
pub const GAMES_PREFIX: &str = "games:";

/// Which of a player's two counters a delta applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    /// The `score:` counter.
    Score,
    /// The `games:` counter.
    Games,
}

impl Counter {
    /// The store key prefix for this counter.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Score => SCORE_PREFIX,
            Self::Games => GAMES_PREFIX,
        }
    }

    /// The store key holding this counter for `name`.
    pub fn key(self, name: &str) -> String {
        format!("{}{name}", self.prefix())
    }
}

/// Accumulates per-player counters over a [`KvStore`].
#[derive(Debug)]
pub struct Ledger<S> {
    store: S,
}

impl<S: KvStore> Ledger<S> {
    /// Create a ledger over `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Add `delta` to `name`'s score and return the new total.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError::StoreUnavailable`] if the write fails.
    pub async fn apply_score_delta(&self, name: &str, delta: i64) -> Result<i64, LeaderboardError> {
        self.apply_delta(Counter::Score, name, delta).await
    }

    /// Add `delta` to `name`'s games-played count and return the new total.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError::StoreUnavailable`] if the write fails.
    pub async fn apply_games_delta(&self, name: &str, delta: i64) -> Result<i64, LeaderboardError> {
        self.apply_delta(Counter::Games, name, delta).await
    }

    /// Add `delta` to one of `name`'s counters.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError::StoreUnavailable`] if the write fails,
    /// or [`LeaderboardError::InvalidInput`] if the total would overflow.
    pub async fn apply_delta(
        &self,
        counter: Counter,
        name: &str,
        delta: i64,
    ) -> Result<i64, LeaderboardError> {
        let key = counter.key(name);
        let total = self.store.incr_by(&key, delta).await?;
        debug!(key, delta, total, "counter updated");
        Ok(total)
    }

    /// Read every player record known to the store.
    ///
    /// Names are collected from both prefixes so a player seen only
    /// through one counter still appears, with the other counter at zero.
    /// Records come back sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError::StoreUnavailable`] only if key
    /// enumeration fails. A paired value that cannot be read or parsed
    /// counts as zero.
    pub async fn snapshot(&self) -> Result<Leaderboard, LeaderboardError> {
        let mut names = BTreeSet::new();
        for counter in [Counter::Score, Counter::Games] {
            let keys = self
                .store
                .keys_with_prefix(counter.prefix())
                .await
                .map_err(LeaderboardError::StoreUnavailable)?;
            names.extend(
                keys.iter()
                    .filter_map(|key| key.strip_prefix(counter.prefix()))
                    .map(str::to_owned),
            );
        }

        let mut leaderboard = Vec::with_capacity(names.len());
        for name in names {
            let score = self.read_counter(Counter::Score, &name).await;
            let games_played = self.read_counter(Counter::Games, &name).await;
            leaderboard.push(PlayerRecord {
                name,
                score,
                games_played,
            });
        }
        Ok(leaderboard)
    }

    async fn read_counter(&self, counter: Counter, name: &str) -> i64 {
        let key = counter.key(name);
        match self.store.get(&key).await {
            Ok(value) => value.map_or(0, |raw| parse_counter(&raw)),
            Err(e) => {
                warn!(key, error = %e, "counter read failed, reporting zero");
                0
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use leaderboard_store::{FaultyStore, MemoryStore, StoreOp};

    use super::*;

    fn record(name: &str, score: i64, games_played: i64) -> PlayerRecord {
        PlayerRecord {
            name: String::from(name),
            score,
            games_played,
        }
    }

    #[test]
    fn counter_keys() {
        assert_eq!(Counter::Score.key("alice"), "score:alice");
        assert_eq!(Counter::Games.key("alice"), "games:alice");
    }

    #[tokio::test]
    async fn deltas_accumulate_from_zero() {
        let ledger = Ledger::new(MemoryStore::new());
        assert_eq!(ledger.apply_score_delta("alice", 5).await.unwrap(), 5);
        assert_eq!(ledger.apply_score_delta("alice", 3).await.unwrap(), 8);

        let board = ledger.snapshot().await.unwrap();
        assert_eq!(board, vec![record("alice", 8, 0)]);
    }

    #[tokio::test]
    async fn games_only_player_is_listed() {
        let ledger = Ledger::new(MemoryStore::new());
        ledger.apply_games_delta("bob", 1).await.unwrap();

        let board = ledger.snapshot().await.unwrap();
        assert_eq!(board, vec![record("bob", 0, 1)]);
    }

    #[tokio::test]
    async fn one_record_per_name() {
        let ledger = Ledger::new(MemoryStore::new());
        ledger.apply_score_delta("alice", 2).await.unwrap();
        ledger.apply_games_delta("alice", 1).await.unwrap();
        ledger.apply_score_delta("bob", 7).await.unwrap();
        ledger.apply_games_delta("carol", 4).await.unwrap();
        ledger.apply_score_delta("alice", -1).await.unwrap();

        let board = ledger.snapshot().await.unwrap();
        assert_eq!(
            board,
            vec![record("alice", 1, 1), record("bob", 7, 0), record("carol", 0, 4)]
        );
    }

    #[tokio::test]
    async fn empty_store_gives_empty_snapshot() {
        let ledger = Ledger::new(MemoryStore::new());
        assert!(ledger.snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unparsable_values_read_as_zero() {
        let store = MemoryStore::new();
        store.set("score:dave", "lots").await.unwrap();
        store.set("games:dave", "2").await.unwrap();

        let ledger = Ledger::new(store);
        assert_eq!(ledger.snapshot().await.unwrap(), vec![record("dave", 0, 2)]);
    }

    #[tokio::test]
    async fn failed_write_is_store_unavailable() {
        let store = FaultyStore::new(MemoryStore::new());
        store.fail(StoreOp::Set, true);
        let ledger = Ledger::new(store);

        let err = ledger.apply_score_delta("erin", 1).await.unwrap_err();
        assert!(matches!(err, LeaderboardError::StoreUnavailable(_)));
        assert!(ledger.store().inner().is_empty().await);
    }

    #[tokio::test]
    async fn failed_read_during_update_starts_from_zero() {
        let store = FaultyStore::new(MemoryStore::new());
        store.inner().set("score:frank", "10").await.unwrap();
        store.fail(StoreOp::Get, true);
        let ledger = Ledger::new(store);

        assert_eq!(ledger.apply_score_delta("frank", 2).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn failed_enumeration_fails_snapshot() {
        let store = FaultyStore::new(MemoryStore::new());
        let ledger = Ledger::new(store.clone());
        ledger.apply_score_delta("gina", 1).await.unwrap();

        store.fail(StoreOp::Keys, true);
        let err = ledger.snapshot().await.unwrap_err();
        assert!(matches!(err, LeaderboardError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn failed_paired_read_degrades_to_zero() {
        let store = FaultyStore::new(MemoryStore::new());
        let ledger = Ledger::new(store.clone());
        ledger.apply_score_delta("hank", 4).await.unwrap();

        store.fail(StoreOp::Get, true);
        assert_eq!(ledger.snapshot().await.unwrap(), vec![record("hank", 0, 0)]);
    }

    #[tokio::test]
    async fn overflow_is_invalid_input() {
        let ledger = Ledger::new(MemoryStore::new());
        ledger.apply_score_delta("ivy", i64::MAX).await.unwrap();
        let err = ledger.apply_score_delta("ivy", 1).await.unwrap_err();
        assert!(matches!(err, LeaderboardError::InvalidInput(_)));
    }
}
