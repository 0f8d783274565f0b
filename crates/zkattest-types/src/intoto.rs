//! In-toto attestation types
//!
//! The DSSE payload of a build attestation is an in-toto Statement binding a
//! predicate (SLSA provenance) to the attested artifacts.
//!
//! Specification: https://github.com/in-toto/attestation/blob/main/spec/v1/statement.md

use serde::{Deserialize, Serialize};

/// In-toto Statement v1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    /// Type identifier (typically "https://in-toto.io/Statement/v1")
    #[serde(rename = "_type")]
    pub type_: String,
    /// Subjects (artifacts) being attested about
    pub subject: Vec<Subject>,
    /// Type of the predicate (e.g., "https://slsa.dev/provenance/v1")
    pub predicate_type: String,
    /// The actual attestation content (format depends on predicate_type)
    #[serde(default)]
    pub predicate: serde_json::Value,
}

/// Subject of an in-toto statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Name of the artifact
    #[serde(default)]
    pub name: String,
    /// Cryptographic digest(s) of the artifact
    pub digest: DigestSet,
}

/// Digest map for a subject
///
/// Hex-encoded digests keyed by algorithm; at minimum one of the SHA-2
/// family is expected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestSet {
    /// SHA-256 hash (hex-encoded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// SHA-384 hash (hex-encoded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha384: Option<String>,
    /// SHA-512 hash (hex-encoded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha512: Option<String>,
}
