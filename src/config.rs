use std::env;
use std::net::SocketAddr;

use dotenv::dotenv;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Configuration-related error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error when a required environment variable is not found
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    /// Error when CHAT_BIND_ADDR does not parse as a socket address
    #[error("Invalid bind address: {0}")]
    InvalidBindAddr(String),
}

/// Runtime configuration, loaded from the environment (with `.env` support).
pub struct Config {
    /// Path of the chat store file
    pub db_path: String,
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
}

/// Loads the configuration from environment variables. `CHAT_DB_PATH` is
/// required; `CHAT_BIND_ADDR` falls back to 0.0.0.0:8080.
pub fn load_config() -> Result<Config, ConfigError> {
    dotenv().ok();

    let db_path = env::var("CHAT_DB_PATH")
        .map_err(|_| ConfigError::EnvVarNotFound("CHAT_DB_PATH".to_string()))?;

    let bind_addr = env::var("CHAT_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let bind_addr = bind_addr
        .parse::<SocketAddr>()
        .map_err(|_| ConfigError::InvalidBindAddr(bind_addr))?;

    Ok(Config { db_path, bind_addr })
}
