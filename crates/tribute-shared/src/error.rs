use thiserror::Error;

/// Failures reported by a backend implementation.
///
/// Every variant is a transport-class failure from the caller's point of
/// view: callers degrade to empty/zero state instead of propagating.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend responded {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("Request cancelled")]
    Cancelled,
}

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self {
        BackendError::Decode(e.to_string())
    }
}

/// Failures of the local key-value store.
#[derive(Error, Debug)]
pub enum KvError {
    #[error("Key-value backend error: {0}")]
    Backend(String),

    #[error("Lock poisoned")]
    Poisoned,
}
