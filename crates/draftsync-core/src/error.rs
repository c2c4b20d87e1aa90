//! Error types for draftsync-core

use thiserror::Error;

/// Result type alias using draftsync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in draftsync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Draft not found in the local state store
    #[error("Draft not found: {0}")]
    NotFound(String),

    /// Snapshot cache error
    #[error("Snapshot cache error: {0}")]
    Cache(String),

    /// Remote transport error
    #[error("Remote request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote store rejected the request
    #[error("Remote API error: {0}")]
    Remote(String),

    /// Remote store could not be reached
    #[error("Remote store unreachable: {0}")]
    Unreachable(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this failure looks like a connectivity problem rather than a
    /// remote-side rejection. Drives the `Offline` vs `Error` status split.
    pub fn is_offline(&self) -> bool {
        match self {
            Self::Unreachable(_) => true,
            Self::Http(err) => err.is_connect() || err.is_timeout(),
            _ => false,
        }
    }
}
