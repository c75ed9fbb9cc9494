//! Storage error taxonomy

use std::path::PathBuf;

/// Errors surfaced by [`CommandStore`](super::CommandStore) operations.
///
/// `Init` is unrecoverable (no durable storage is available); everything else
/// is a per-operation failure the caller can report and move past.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to create data directory {path}: {source}")]
    Init {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no command with id {0}")]
    CommandNotFound(i64),

    #[error("command has not been saved yet")]
    MissingId,

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}
