//! Core types for attestation bundle verification
//!
//! This crate provides the data structures shared across the verification
//! stack: the Sigstore bundle format (v0.3+), DSSE envelopes, in-toto
//! statements, and the encoding newtypes that keep base64/hex handling
//! inside the type system.

pub mod bundle;
pub mod dsse;
pub mod encoding;
pub mod error;
pub mod hash;
pub mod intoto;

pub use bundle::{
    Bundle, CertificateContent, InclusionPromise, InclusionProof, KindVersion, LogId, MediaType,
    Rfc3161Timestamp, TimestampVerificationData, TransparencyLogEntry, VerificationMaterial,
    MAX_BUNDLE_BYTES,
};
pub use dsse::{pae, DsseEnvelope, DsseSignature};
pub use encoding::{
    CanonicalizedBody, DerCertificate, DerPublicKey, LogIndex, LogKeyId, PayloadBytes, PemContent,
    Sha256Hash, SignatureBytes, SignedTimestamp, TimestampToken,
};
pub use error::{Error, Result};
pub use hash::HashAlgorithm;
pub use intoto::{DigestSet, Statement, Subject};
