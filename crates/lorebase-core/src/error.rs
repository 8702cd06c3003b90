//! Error types for the core orchestration crate.

use thiserror::Error;

/// Errors returned by core construction and persistence plumbing.
#[derive(Debug, Error)]
pub enum CoreError {
    /// History state store error.
    #[error("state error: {0}")]
    State(#[from] crate::state::StateError),
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
