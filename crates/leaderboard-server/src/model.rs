//! Wire and domain types shared by the ledger, handlers and push channel.

use serde::{Deserialize, Serialize};

use crate::error::LeaderboardError;

/// One player's accumulated totals.
///
/// Identity is `name`. On the ingress side the same shape carries a
/// delta: `score` (or `gamesPlayed`) is added to the stored total.
/// Counters absent from a request body decode as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    /// Unique player name.
    pub name: String,
    /// Accumulated score (or score delta on ingress).
    #[serde(default)]
    pub score: i64,
    /// Accumulated games played (or games delta on ingress).
    #[serde(default)]
    pub games_played: i64,
}

impl PlayerRecord {
    /// Decode a request body into a record with a non-empty name.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError::InvalidInput`] if the body is not a JSON
    /// object of this shape or the name is empty.
    pub fn from_body(body: &[u8]) -> Result<Self, LeaderboardError> {
        let record: Self = serde_json::from_slice(body)
            .map_err(|e| LeaderboardError::InvalidInput(e.to_string()))?;
        if record.name.is_empty() {
            return Err(LeaderboardError::InvalidInput(String::from(
                "name must not be empty",
            )));
        }
        Ok(record)
    }
}

/// A full point-in-time read of every player record.
pub type Leaderboard = Vec<PlayerRecord>;
