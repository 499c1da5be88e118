use thiserror::Error;

/// Result type for store, data and cache operations
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors surfaced by the portfolio core.
///
/// `NotFound`, `VersionNotFound`, `Conflict` and `InvalidInput` are caller
/// errors and are never retried. `StoreUnavailable` and `LockTimeout` mean the
/// durable store could not serve the request.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("version {version} not found for key {key}")]
    VersionNotFound { key: String, version: i64 },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] rusqlite::Error),

    #[error("store unavailable: timed out waiting for the database connection")]
    LockTimeout,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cache failure: {0}")]
    CacheFailure(String),
}

impl DataError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        DataError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True when the durable store itself failed, as opposed to a caller error
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DataError::StoreUnavailable(_) | DataError::LockTimeout)
    }
}
