//! Cryptographic primitives for attestation verification
//!
//! This crate provides hashing, X.509 certificate parsing and signature
//! verification. The backends are pure Rust (`sha2`, `p256`, `p384`, `rsa`)
//! so the same code runs unmodified inside a zkVM guest.

pub mod error;
pub mod hash;
pub mod verification;
pub mod x509;

pub use error::{Error, Result};
pub use hash::{sha256, sha384};
pub use verification::{SignatureAlgorithm, VerifyingKey};
pub use x509::{parse_certificate, FulcioClaims, ParsedCertificate, MAX_CERT_BYTES};
