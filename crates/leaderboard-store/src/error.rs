//! Error types for the store layer.
//!
//! All backends report failures through [`StoreError`], which wraps the
//! underlying [`fred`] error with context about which operation failed.

/// Errors that can occur while talking to the key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A Redis/Dragonfly operation failed.
    #[error("Redis error: {0}")]
    Redis(#[from] fred::error::Error),

    /// The store could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Adding a delta would overflow the stored counter.
    #[error("counter overflow at {key}")]
    Overflow {
        /// The key whose counter would overflow.
        key: String,
    },

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
