//! Verification error taxonomy
//!
//! A single flat enum covering every rejection reason, each with a stable
//! numeric code. The host forwards the code; human-readable context stays
//! off-chain in the error messages.

use thiserror::Error;

/// Errors that can reject a bundle
#[derive(Error, Debug)]
pub enum Error {
    /// Any DER/PEM/base64/JSON violation
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    /// Bundle media type outside the accepted versions
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Both or neither of the RFC 3161 and Rekor mechanisms present
    #[error("exactly one timestamp mechanism is required")]
    AmbiguousTimestamp,

    /// Parent-signed-child check failed
    #[error("certificate chain broken: {0}")]
    ChainBroken(String),

    /// Terminal certificate failed its self-signature
    #[error("root certificate is not self-signed")]
    RootNotSelfSigned,

    /// Signing time before a certificate's validity window
    #[error("certificate not yet valid at signing time")]
    NotYetValid,

    /// Signing time after a certificate's validity window
    #[error("certificate expired at signing time")]
    Expired,

    /// Unknown critical X.509 extension
    #[error("unsupported critical extension: {0}")]
    UnsupportedCriticalExtension(String),

    /// Required EKU absent from the leaf certificate
    #[error("leaf certificate is missing the required extended key usage")]
    MissingEku,

    /// Signature algorithm outside the accepted pairs
    #[error("unsupported signature algorithm: {0}")]
    UnsupportedSignatureAlgorithm(String),

    /// ECDSA signature with s above the half order
    #[error("malleable ECDSA signature")]
    MalleableSignature,

    /// DSSE PAE signature check failed
    #[error("DSSE signature verification failed")]
    InvalidDsseSignature,

    /// in-toto statement has no usable subject
    #[error("statement subject is empty or unusable")]
    EmptySubject,

    /// subject[0] digest uses an unsupported algorithm
    #[error("unsupported subject digest algorithm")]
    UnsupportedSubjectDigest,

    /// PKCS#7 signer signature failed
    #[error("timestamp signature invalid: {0}")]
    TimestampSigInvalid(String),

    /// messageImprint does not equal the hash of the DSSE signature
    #[error("message imprint mismatch")]
    ImprintMismatch,

    /// TSA leaf certificate lacks the timeStamping EKU
    #[error("TSA certificate is missing the timeStamping extended key usage")]
    TsaEkuMissing,

    /// Timestamp falls outside the TSA validity window in the trust root
    #[error("timestamp outside TSA validity window")]
    TimestampOutsideTsaValidity,

    /// Reconstructed Merkle root differs from the provided root hash
    #[error("inclusion proof invalid: {0}")]
    InclusionProofInvalid(String),

    /// No trust root entry is active at the signing time
    #[error("no active trust root entry")]
    NoActiveTrustRoot,

    /// More than one trust root entry remains after tie-breaking
    #[error("ambiguous trust root selection")]
    AmbiguousTrustRoot,

    /// expected_digest option does not match the subject digest
    #[error("subject digest does not match expected digest")]
    DigestMismatch,

    /// expected_issuer option does not match the certificate issuer claim
    #[error("OIDC issuer does not match expected issuer")]
    IssuerMismatch,

    /// expected_subject option does not match the certificate subject
    #[error("OIDC subject does not match expected subject")]
    SubjectMismatch,
}

impl Error {
    /// Stable numeric code for host/on-chain reporting
    pub const fn code(&self) -> u16 {
        match self {
            Error::MalformedEncoding(_) => 1,
            Error::UnsupportedMediaType(_) => 2,
            Error::AmbiguousTimestamp => 3,
            Error::ChainBroken(_) => 4,
            Error::RootNotSelfSigned => 5,
            Error::NotYetValid => 6,
            Error::Expired => 7,
            Error::UnsupportedCriticalExtension(_) => 8,
            Error::MissingEku => 9,
            Error::UnsupportedSignatureAlgorithm(_) => 10,
            Error::MalleableSignature => 11,
            Error::InvalidDsseSignature => 12,
            Error::EmptySubject => 13,
            Error::UnsupportedSubjectDigest => 14,
            Error::TimestampSigInvalid(_) => 15,
            Error::ImprintMismatch => 16,
            Error::TsaEkuMissing => 17,
            Error::TimestampOutsideTsaValidity => 18,
            Error::InclusionProofInvalid(_) => 19,
            Error::NoActiveTrustRoot => 20,
            Error::AmbiguousTrustRoot => 21,
            Error::DigestMismatch => 22,
            Error::IssuerMismatch => 23,
            Error::SubjectMismatch => 24,
        }
    }
}

impl From<zkattest_types::Error> for Error {
    fn from(err: zkattest_types::Error) -> Self {
        match err {
            zkattest_types::Error::InvalidMediaType(s) => Error::UnsupportedMediaType(s),
            other => Error::MalformedEncoding(other.to_string()),
        }
    }
}

impl From<zkattest_trust_root::Error> for Error {
    fn from(err: zkattest_trust_root::Error) -> Self {
        match err {
            zkattest_trust_root::Error::NoActiveEntry(_) => Error::NoActiveTrustRoot,
            zkattest_trust_root::Error::AmbiguousEntry(_) => Error::AmbiguousTrustRoot,
            zkattest_trust_root::Error::LogNotFound(_) => Error::NoActiveTrustRoot,
            other => Error::MalformedEncoding(other.to_string()),
        }
    }
}

/// Result type for verification
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(Error::MalformedEncoding(String::new()).code(), 1);
        assert_eq!(Error::AmbiguousTimestamp.code(), 3);
        assert_eq!(Error::MalleableSignature.code(), 11);
        assert_eq!(Error::InclusionProofInvalid(String::new()).code(), 19);
        assert_eq!(Error::SubjectMismatch.code(), 24);
    }
}
