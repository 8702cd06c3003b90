//! Error types for config loading.

use thiserror::Error;

/// Errors returned while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Config file failed to parse as JSON5.
    #[error("parse error in {path}: {message}")]
    Parse { path: String, message: String },
}
