//! Redis-compatible backend (Redis or `Dragonfly`).
//!
//! # Key Patterns
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `score:{name}` | Integer | Accumulated score for a player |
//! | `games:{name}` | Integer | Accumulated games played for a player |
//!
//! Counters are stored as decimal strings so they remain readable with a
//! plain `GET` and can be bumped with `INCRBY`.
//!
//! # Errors
//!
//! `INCRBY` rejecting a delta because the total would leave the `i64`
//! range is reported as [`StoreError::Overflow`], the same as the
//! read-modify-write path. Every other failure is [`StoreError::Redis`].

use fred::cmd;
use fred::error::Error as RedisError;
use fred::prelude::*;

use crate::error::StoreError;
use crate::kv::KvStore;

/// Connection handle to a Redis-compatible instance.
///
/// Wraps a [`fred::prelude::Client`]. Cloning is cheap and every clone
/// shares the same connection.
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    /// Connect to Redis at the given URL.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port`, `redis://:password@host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the URL cannot be parsed.
    /// Returns [`StoreError::Redis`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let config = Config::from_url(url)
            .map_err(|e| StoreError::Config(format!("Invalid Redis URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to Redis");
        Ok(Self { client })
    }

    /// Flush all keys from the selected database.
    ///
    /// **WARNING:** This deletes all data. Only use for testing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Redis`] if the flush fails.
    pub async fn flush_all(&self) -> Result<(), StoreError> {
        let _: () = self.client.flushall(false).await?;
        Ok(())
    }
}

impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value: Option<String> = self.client.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _: () = self.client.set(key, value, None, None, false).await?;
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let pattern = format!("{prefix}*");
        let keys: Vec<String> = self.client.custom(cmd!("KEYS"), vec![pattern]).await?;
        Ok(keys)
    }

    /// Uses `INCRBY`, so concurrent deltas to the same key never lose
    /// updates. A non-integer value already at `key` makes Redis reject
    /// the command; that surfaces as [`StoreError::Redis`].
    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        self.client
            .incr_by(key, delta)
            .await
            .map_err(|e| classify_incr_error(key, e))
    }
}

/// Map an `INCRBY` failure onto [`StoreError`].
///
/// Redis answers `ERR increment or decrement would overflow` when the
/// total would leave the `i64` range.
fn classify_incr_error(key: &str, err: RedisError) -> StoreError {
    if err.details().contains("would overflow") {
        StoreError::Overflow { key: key.to_owned() }
    } else {
        StoreError::Redis(err)
    }
}
