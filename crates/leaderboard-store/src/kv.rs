//! The [`KvStore`] trait consumed by the leaderboard ledger.

use std::future::Future;

use crate::error::StoreError;

/// A key-value service offering `GET`, `SET` and prefix enumeration.
///
/// Implementations must be safe to share between concurrent request
/// handlers; the ledger holds one instance for the life of the process.
pub trait KvStore: Send + Sync + 'static {
    /// Read the value stored at `key`, or `None` if the key is absent.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Store `value` at `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// List every key that starts with `prefix`, in no particular order.
    fn keys_with_prefix(
        &self,
        prefix: &str,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Add `delta` to the integer counter at `key` and return the new total.
    ///
    /// The provided body is a plain read-modify-write: an absent,
    /// unreadable or non-numeric current value counts as zero, and only a
    /// failed write is an error. It is not atomic, so two writers racing
    /// on the same key can lose an update. Backends with a native
    /// increment should override this.
    fn incr_by(
        &self,
        key: &str,
        delta: i64,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send {
        async move {
            let current = match self.get(key).await {
                Ok(value) => value.map_or(0, |raw| parse_counter(&raw)),
                Err(e) => {
                    tracing::warn!(key, error = %e, "counter read failed, starting from zero");
                    0
                }
            };
            let next = current
                .checked_add(delta)
                .ok_or_else(|| StoreError::Overflow { key: key.to_owned() })?;
            self.set(key, &next.to_string()).await?;
            Ok(next)
        }
    }
}

/// Parse a stored counter, treating anything non-numeric as zero.
pub fn parse_counter(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_counter_accepts_signed_integers() {
        assert_eq!(parse_counter("42"), 42);
        assert_eq!(parse_counter("-7"), -7);
        assert_eq!(parse_counter(" 3 "), 3);
    }

    #[test]
    fn parse_counter_degrades_to_zero() {
        assert_eq!(parse_counter(""), 0);
        assert_eq!(parse_counter("eight"), 0);
        assert_eq!(parse_counter("1.5"), 0);
    }
}
