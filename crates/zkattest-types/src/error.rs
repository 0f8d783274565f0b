//! Error types for zkattest-types

use thiserror::Error;

/// Errors that can occur while parsing bundle material
#[derive(Error, Debug)]
pub enum Error {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid encoding (base64, hex, PEM, fixed-width value)
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Invalid media type
    #[error("Invalid media type: {0}")]
    InvalidMediaType(String),

    /// Input exceeds a size cap
    #[error("Input too large: {0}")]
    InputTooLarge(String),
}

/// Result type for zkattest-types operations
pub type Result<T> = std::result::Result<T, Error>;
