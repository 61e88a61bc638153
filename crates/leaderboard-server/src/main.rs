//! Leaderboard server binary.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from the environment
//! 3. Connect the configured key-value store
//! 4. Serve HTTP + `WebSocket` until `Ctrl-C`

use std::sync::Arc;

use leaderboard_server::{AppState, LeaderboardConfig, StoreBackend, start_server};
use leaderboard_store::{MemoryStore, RedisStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the store connection, or the
/// server fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("leaderboard-server starting");

    let config = LeaderboardConfig::from_env()?;
    info!(
        host = config.server_host,
        port = config.server_port,
        store = ?config.store_backend,
        redis_addr = config.redis_addr,
        "Configuration loaded"
    );

    let server = config.server();
    match config.store_backend {
        StoreBackend::Redis => {
            let store = RedisStore::connect(&config.redis_url()).await?;
            start_server(&server, Arc::new(AppState::new(store))).await?;
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; totals are lost on restart");
            start_server(&server, Arc::new(AppState::new(MemoryStore::new()))).await?;
        }
    }

    Ok(())
}
