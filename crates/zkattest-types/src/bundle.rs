//! Sigstore bundle format types (v0.3+)
//!
//! The bundle is the input artifact of verification: it binds a DSSE
//! envelope to a signing certificate and exactly one timestamp proof
//! (an RFC 3161 countersignature or a transparency log entry).

use crate::dsse::DsseEnvelope;
use crate::encoding::{
    string_i64, CanonicalizedBody, DerCertificate, LogIndex, LogKeyId, Sha256Hash, SignedTimestamp,
    TimestampToken,
};
use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Maximum accepted bundle size in bytes (4 MiB)
pub const MAX_BUNDLE_BYTES: usize = 4 * 1024 * 1024;

/// Deserialize a field that may be null as the default value
fn deserialize_null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let opt = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// Accepted bundle media types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    /// Bundle format version 0.3
    Bundle0_3,
    /// Bundle format version 0.4
    Bundle0_4,
}

impl MediaType {
    /// Get the canonical media type string
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Bundle0_3 => "application/vnd.dev.sigstore.bundle.v0.3+json",
            MediaType::Bundle0_4 => "application/vnd.dev.sigstore.bundle.v0.4+json",
        }
    }
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "application/vnd.dev.sigstore.bundle.v0.3+json" => Ok(MediaType::Bundle0_3),
            // Alternative spelling used by some producers
            "application/vnd.dev.sigstore.bundle+json;version=0.3" => Ok(MediaType::Bundle0_3),
            "application/vnd.dev.sigstore.bundle.v0.4+json" => Ok(MediaType::Bundle0_4),
            "application/vnd.dev.sigstore.bundle+json;version=0.4" => Ok(MediaType::Bundle0_4),
            _ => Err(Error::InvalidMediaType(s.to_string())),
        }
    }
}

/// The main bundle structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Media type identifying the bundle version
    pub media_type: String,
    /// Verification material (certificate plus timestamp proof)
    pub verification_material: VerificationMaterial,
    /// The signed DSSE envelope
    pub dsse_envelope: DsseEnvelope,
}

impl Bundle {
    /// Parse a bundle from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_slice(json.as_bytes())
    }

    /// Parse a bundle from raw JSON bytes, enforcing the size cap
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_BUNDLE_BYTES {
            return Err(Error::InputTooLarge(format!(
                "bundle is {} bytes, maximum is {}",
                bytes.len(),
                MAX_BUNDLE_BYTES
            )));
        }
        serde_json::from_slice(bytes).map_err(Error::Json)
    }

    /// Get the bundle version from the media type
    pub fn version(&self) -> Result<MediaType> {
        MediaType::from_str(&self.media_type)
    }

    /// The signing (leaf) certificate
    pub fn signing_certificate(&self) -> &DerCertificate {
        &self.verification_material.certificate.raw_bytes
    }

    /// True when at least one RFC 3161 timestamp is present
    pub fn has_rfc3161_timestamps(&self) -> bool {
        !self
            .verification_material
            .timestamp_verification_data
            .rfc3161_timestamps
            .is_empty()
    }

    /// True when at least one transparency log entry is present
    pub fn has_tlog_entries(&self) -> bool {
        !self.verification_material.tlog_entries.is_empty()
    }
}

/// Verification material: the signing certificate and the timestamp proof
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMaterial {
    /// The signing leaf certificate (v0.3+ bundles carry exactly one)
    pub certificate: CertificateContent,
    /// Transparency log entries
    #[serde(default)]
    pub tlog_entries: Vec<TransparencyLogEntry>,
    /// RFC 3161 timestamp verification data
    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub timestamp_verification_data: TimestampVerificationData,
}

/// Certificate content for v0.3+ bundles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateContent {
    /// DER-encoded certificate
    pub raw_bytes: DerCertificate,
}

/// A transparency log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransparencyLogEntry {
    /// Log index (the API position of the entry)
    pub log_index: LogIndex,
    /// Log ID
    pub log_id: LogId,
    /// Kind and version of the entry body
    pub kind_version: KindVersion,
    /// Integrated time (Unix seconds)
    #[serde(default, with = "string_i64")]
    pub integrated_time: i64,
    /// Inclusion promise (Signed Entry Timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion_promise: Option<InclusionPromise>,
    /// Inclusion proof
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion_proof: Option<InclusionProof>,
    /// Canonicalized body (the committed leaf preimage)
    pub canonicalized_body: CanonicalizedBody,
}

/// Log identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogId {
    /// Key ID (base64-encoded SHA-256 of the log public key)
    pub key_id: LogKeyId,
}

/// Entry kind and version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindVersion {
    /// Entry kind (e.g., "dsse")
    pub kind: String,
    /// Entry version (e.g., "0.0.1")
    pub version: String,
}

/// Inclusion promise (Signed Entry Timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InclusionPromise {
    /// Signed entry timestamp
    pub signed_entry_timestamp: SignedTimestamp,
}

/// Inclusion proof in the Merkle tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InclusionProof {
    /// Index of the leaf in the tree (tree position)
    pub log_index: LogIndex,
    /// Root hash of the tree
    pub root_hash: Sha256Hash,
    /// Tree size at time of proof
    #[serde(with = "string_i64")]
    pub tree_size: i64,
    /// Sibling hashes on the path from the leaf to the root
    pub hashes: Vec<Sha256Hash>,
}

/// RFC 3161 timestamp verification data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimestampVerificationData {
    /// RFC 3161 signed timestamps
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rfc3161_timestamps: Vec<Rfc3161Timestamp>,
}

/// An RFC 3161 timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rfc3161Timestamp {
    /// Signed timestamp token (DER-encoded CMS)
    pub signed_timestamp: TimestampToken,
}
