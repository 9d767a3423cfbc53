use thiserror::Error;

/// Errors raised by context repositories.
///
/// [`ContextStore`](crate::ContextStore) never surfaces these to callers; they
/// are logged and the operation degrades to "no context".
#[derive(Debug, Error)]
pub enum ContextError {
    /// A SQLite operation failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Writing the flat-file store failed.
    #[error("persist error: {0}")]
    Persist(#[from] scout_core::ScoutError),

    /// A stored column could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The provided thread key string is malformed.
    ///
    /// Expected format: `{channel}:{thread_ts}`
    #[error("invalid thread key: {0}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, ContextError>;
