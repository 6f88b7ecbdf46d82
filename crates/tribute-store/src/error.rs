use thiserror::Error;
use tribute_shared::error::{BackendError, KvError};

/// Failures of the local SQLite store and object directory.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Could not determine application data directory")]
    NoDataDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Lookup by id matched no row.
    #[error("Record not found")]
    NotFound,

    #[error("Migration error: {0}")]
    Migration(String),

    /// A JSON column could not be encoded or decoded.
    #[error("JSON column error: {0}")]
    Json(#[from] serde_json::Error),

    /// An object path tried to escape the storage root.
    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    /// The shared connection mutex was poisoned by a panicking holder.
    #[error("Database lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for BackendError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Io(_) | StoreError::InvalidPath(_) => BackendError::Storage(e.to_string()),
            other => BackendError::Transport(other.to_string()),
        }
    }
}

impl From<StoreError> for KvError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Poisoned => KvError::Poisoned,
            other => KvError::Backend(other.to_string()),
        }
    }
}
