//! Trusted root parsing and trust anchor selection
//!
//! The trusted root carries the trust anchors verification needs: Fulcio
//! certificate authorities, RFC 3161 timestamp authorities and Rekor
//! transparency logs, each with a validity window. This crate parses the
//! JSON (or JSONL) form and selects the entries active at a given signing
//! time. Fetching the trusted root is a host concern and lives elsewhere.

pub mod error;
pub mod select;
pub mod trusted_root;

pub use error::{Error, Result};
pub use select::{
    select_certificate_authority, select_timestamp_authority, select_transparency_log,
    FulcioInstance,
};
pub use trusted_root::{
    CertChain, CertificateAuthority, CertificateEntry, PublicKey, TimestampAuthority,
    TransparencyLog, TrustedRoot, ValidityPeriod,
};
