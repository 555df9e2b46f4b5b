use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bar at {received} is not after the last accepted bar at {last}")]
    OutOfOrderBar {
        last: DateTime<Utc>,
        received: DateTime<Utc>,
    },

    #[error("Bot is not running")]
    NotRunning,

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
