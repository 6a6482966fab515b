//! Error types for tripcart-core

use thiserror::Error;

/// Result type alias using tripcart-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tripcart-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Local storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Item not found
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Remote item store error
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Whole-pass sync failure
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Failures of a single call against the remote item store
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport-level failure (DNS, TLS, connection reset, timeout)
    #[error("Remote HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend rejected the request
    #[error("Remote API error: {0}")]
    Api(String),

    /// No active session to authorize the request
    #[error("No authenticated session for remote request")]
    NotAuthenticated,

    /// Response body could not be decoded
    #[error("Invalid remote payload: {0}")]
    Decode(String),

    /// Row does not exist (or is not visible to the user)
    #[error("Remote item not found: {0}")]
    NotFound(String),

    /// Backend is unreachable
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),
}

/// Failures that abort a whole reconciliation pass
#[derive(Error, Debug)]
pub enum SyncError {
    /// No signed-in user when the pass started
    #[error("No authenticated user; sync aborted")]
    NotAuthenticated,

    /// The comparison snapshot could not be fetched
    #[error("Failed to fetch remote snapshot: {0}")]
    Snapshot(#[source] RemoteError),
}

impl SyncError {
    /// Whether a delayed retry can reasonably succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Snapshot(_))
    }
}
