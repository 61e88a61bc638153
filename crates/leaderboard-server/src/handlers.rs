//! HTTP ingress handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Server status and live connection count |
//! | `POST` | `/updateScore` | Add a score delta for a player |
//! | `POST` | `/updateGames` | Add a games-played delta for a player |
//! | `GET` | `/leaderboard` | Current leaderboard snapshot |
//!
//! Both mutations publish the recomputed leaderboard to every push
//! connection before responding. A rejected request changes nothing and
//! publishes nothing.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use leaderboard_store::KvStore;
use serde_json::Value;
use tracing::debug;

use crate::error::LeaderboardError;
use crate::ledger::Counter;
use crate::model::{Leaderboard, PlayerRecord};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET / -- status
// ---------------------------------------------------------------------------

/// Report that the server is up and how many viewers are connected.
pub async fn index<S: KvStore>(State(state): State<Arc<AppState<S>>>) -> Json<Value> {
    Json(serde_json::json!({
        "message": "Leaderboard server is running",
        "connections": state.registry.len(),
    }))
}

// ---------------------------------------------------------------------------
// POST /updateScore, POST /updateGames
// ---------------------------------------------------------------------------

/// Add `score` from the body to the named player's total.
///
/// Body: `{"name": string, "score": integer}`. Responds `200` with an
/// empty body, `400` on a malformed body, `500` if the store write fails.
pub async fn update_score<S: KvStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Result<StatusCode, LeaderboardError> {
    apply_and_publish(&state, Counter::Score, &body).await
}

/// Add `gamesPlayed` from the body to the named player's total.
///
/// Body: `{"name": string, "gamesPlayed": integer}`. Same status codes
/// as [`update_score`].
pub async fn update_games<S: KvStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Result<StatusCode, LeaderboardError> {
    apply_and_publish(&state, Counter::Games, &body).await
}

async fn apply_and_publish<S: KvStore>(
    state: &AppState<S>,
    counter: Counter,
    body: &[u8],
) -> Result<StatusCode, LeaderboardError> {
    let record = PlayerRecord::from_body(body)?;
    let delta = match counter {
        Counter::Score => record.score,
        Counter::Games => record.games_played,
    };

    state.ledger.apply_delta(counter, &record.name, delta).await?;

    let outcome = state.coordinator.publish().await;
    debug!(player = %record.name, ?counter, delta, ?outcome, "Update applied");

    Ok(StatusCode::OK)
}

// ---------------------------------------------------------------------------
// GET /leaderboard
// ---------------------------------------------------------------------------

/// Return every player record as a JSON array, in no guaranteed order.
pub async fn get_leaderboard<S: KvStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Leaderboard>, LeaderboardError> {
    Ok(Json(state.ledger.snapshot().await?))
}
