//! Error types for the leaderboard request path.
//!
//! [`LeaderboardError`] unifies the failure modes a request can hit into
//! a single enum that converts into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.
//!
//! Push-channel transport failures are deliberately absent: they never
//! reach a caller and are handled by dropping the connection.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use leaderboard_store::StoreError;

/// Errors that can occur while serving a leaderboard request.
#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    /// The request body could not be decoded into a player record.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The key-value store failed a read, write or enumeration.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StoreError> for LeaderboardError {
    fn from(err: StoreError) -> Self {
        match err {
            // The delta itself pushed the counter out of range.
            StoreError::Overflow { key } => {
                Self::InvalidInput(format!("delta overflows counter {key}"))
            }
            other => Self::StoreUnavailable(other),
        }
    }
}

impl IntoResponse for LeaderboardError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::StoreUnavailable(e) => {
                tracing::error!(error = %e, "store failure surfaced to client");
                (StatusCode::INTERNAL_SERVER_ERROR, String::from("store unavailable"))
            }
            Self::Serialization(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("JSON error: {e}"))
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
