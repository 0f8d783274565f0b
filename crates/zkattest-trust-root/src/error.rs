//! Error types for trusted root operations

use thiserror::Error;

/// Errors that can occur during trusted root operations
#[derive(Debug, Error)]
pub enum Error {
    /// JSON parsing error
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Time parsing error
    #[error("failed to parse time: {0}")]
    TimeParse(String),

    /// No entry is active at the requested time
    #[error("no active trust root entry for time {0}")]
    NoActiveEntry(i64),

    /// More than one entry is active after tie-breaking
    #[error("ambiguous trust root: multiple entries active for time {0}")]
    AmbiguousEntry(i64),

    /// No transparency log matches the requested log ID
    #[error("no transparency log with id {0}")]
    LogNotFound(String),
}

/// Result type for trusted root operations
pub type Result<T> = std::result::Result<T, Error>;
