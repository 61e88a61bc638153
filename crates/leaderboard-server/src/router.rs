//! Axum router construction for the leaderboard server.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled so browser viewers on any origin can
//! connect.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use leaderboard_store::KvStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- status document
/// - `POST /updateScore` -- score delta
/// - `POST /updateGames` -- games-played delta
/// - `GET /leaderboard` -- leaderboard snapshot
/// - `GET /ws-leaderboard` -- `WebSocket` push channel
pub fn build_router<S: KvStore>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index::<S>))
        .route("/updateScore", post(handlers::update_score::<S>))
        .route("/updateGames", post(handlers::update_games::<S>))
        .route("/leaderboard", get(handlers::get_leaderboard::<S>))
        .route("/ws-leaderboard", get(ws::ws_leaderboard::<S>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
