//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file `{0}` not found")]
    NotFound(PathBuf),

    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config file `{0}` is not valid JSON")]
    Json(PathBuf, #[source] serde_json::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
