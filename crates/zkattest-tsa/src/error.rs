//! Error types for zkattest-tsa

use thiserror::Error;

/// Errors that can occur in timestamp token processing
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to parse the timestamp token
    #[error("Failed to parse timestamp token: {0}")]
    ParseError(String),

    /// Timestamp response indicates a non-granted status
    #[error("Timestamp request not granted: status {0}")]
    NotGranted(u8),

    /// No timestamp token in the response
    #[error("No timestamp token in response")]
    NoToken,

    /// No TSTInfo in the timestamp token
    #[error("No TSTInfo in timestamp token")]
    NoTstInfo,

    /// The message imprint does not match the timestamped data
    #[error("Message imprint mismatch: expected {expected}, got {actual}")]
    ImprintMismatch { expected: String, actual: String },

    /// Unsupported hash algorithm in the token
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedHashAlgorithm(String),

    /// The CMS signer signature failed to verify
    #[error("Timestamp signature verification failed: {0}")]
    SignatureInvalid(String),
}

/// Result type for timestamp operations
pub type Result<T> = std::result::Result<T, Error>;
