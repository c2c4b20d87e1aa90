use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] draftsync_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Draft ID cannot be empty")]
    EmptyDraftId,
    #[error("Invalid draft ID: {0}")]
    InvalidDraftId(String),
    #[error("Draft not found: {0}")]
    DraftNotFound(String),
    #[error("Could not determine a data directory; pass --data-dir")]
    NoDataDir,
    #[error(
        "Sync is not configured. Pass --endpoint or set DRAFTSYNC_ENDPOINT to your sync service URL."
    )]
    SyncNotConfigured,
}
