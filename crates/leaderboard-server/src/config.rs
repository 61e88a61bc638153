//! Configuration loaded from the process environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `SERVER_HOST` | `0.0.0.0` | Listen address |
//! | `SERVER_PORT` | `8080` | Listen port |
//! | `STORE_BACKEND` | `redis` | `redis` or `memory` |
//! | `REDIS_ADDR` | `localhost:6379` | Redis `host:port` |
//! | `REDIS_PASSWORD` | *(none)* | Redis password; empty means none |
//! | `REDIS_DB` | `0` | Redis database index |

use config::{Config, Environment};
use serde::Deserialize;

use crate::server::ServerConfig;

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was missing, malformed or of the wrong type.
    #[error("config error: {0}")]
    Load(#[from] config::ConfigError),
}

/// Which key-value backend holds the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// A Redis-compatible server.
    Redis,
    /// An in-process map; data is lost on restart.
    Memory,
}

/// Complete server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardConfig {
    /// Address to bind the HTTP listener to.
    pub server_host: String,
    /// Port to bind the HTTP listener to.
    pub server_port: u16,
    /// Backend for player counters.
    pub store_backend: StoreBackend,
    /// Redis `host:port`.
    pub redis_addr: String,
    /// Redis password, if any.
    #[serde(default)]
    pub redis_password: Option<String>,
    /// Redis database index.
    pub redis_db: u8,
}

impl LeaderboardConfig {
    /// Load configuration from environment variables, applying defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if a variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(Environment::default())
    }

    /// Load configuration from an explicit environment source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if a variable cannot be parsed.
    pub fn from_source(env: Environment) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 8080)?
            .set_default("store_backend", "redis")?
            .set_default("redis_addr", "localhost:6379")?
            .set_default("redis_db", 0)?
            .add_source(env)
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// The HTTP listener settings.
    pub fn server(&self) -> ServerConfig {
        ServerConfig {
            host: self.server_host.clone(),
            port: self.server_port,
        }
    }

    /// The Redis connection URL, `redis://[:password@]addr/db`.
    pub fn redis_url(&self) -> String {
        match self.redis_password.as_deref() {
            Some(password) if !password.is_empty() => {
                format!("redis://:{password}@{}/{}", self.redis_addr, self.redis_db)
            }
            _ => format!("redis://{}/{}", self.redis_addr, self.redis_db),
        }
    }
}
