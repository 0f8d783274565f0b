//! Error types for zkattest-crypto

use thiserror::Error;

/// Errors that can occur in cryptographic operations
#[derive(Error, Debug)]
pub enum Error {
    /// Certificate parsing/validation error
    #[error("Invalid certificate: {0}")]
    InvalidCertificate(String),

    /// An unknown critical X.509 extension was encountered
    #[error("Unsupported critical extension: {0}")]
    UnsupportedCriticalExtension(String),

    /// Invalid key format
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Unsupported algorithm or algorithm/curve combination
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// ECDSA signature with s above the half order
    #[error("Malleable ECDSA signature: s is not in the lower half of the order")]
    MalleableSignature,

    /// Signature verification failed
    #[error("Verification error: {0}")]
    Verification(String),

    /// DER encoding/decoding error
    #[error("DER error: {0}")]
    Der(String),
}

/// Result type for cryptographic operations
pub type Result<T> = std::result::Result<T, Error>;
