use thiserror::Error;
use tribute_shared::error::BackendError;
use tribute_store::StoreError;

/// Input rejected before any backend call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Author name is required")]
    MissingAuthor,

    #[error("Content is required")]
    MissingContent,

    #[error("Video URL is required")]
    MissingVideoUrl,

    #[error("Photo file is empty")]
    EmptyPhoto,
}

/// Errors surfaced by engagement and page operations.
///
/// Read paths never return these; they degrade to empty/zero state and log
/// instead. Mutations return them so the caller can keep its input for a
/// retry.
#[derive(Error, Debug)]
pub enum EngagementError {
    #[error("Remote store error: {0}")]
    Remote(#[from] BackendError),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
}

/// Errors while assembling a client from configuration.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Local store error: {0}")]
    Store(#[from] StoreError),

    #[error("Backend setup error: {0}")]
    Backend(#[from] BackendError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
