//! Verification result types

/// Which timestamp mechanism authenticated the signing time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TimestampProofType {
    /// No timestamp proof (never produced by a successful verification)
    None = 0,
    /// RFC 3161 TSA countersignature
    Rfc3161 = 1,
    /// Rekor transparency log inclusion
    Rekor = 2,
}

impl TimestampProofType {
    /// Parse from the journal byte
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TimestampProofType::None),
            1 => Some(TimestampProofType::Rfc3161),
            2 => Some(TimestampProofType::Rekor),
            _ => None,
        }
    }
}

/// Digest algorithm enumerant used for subject digests and message imprints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DigestAlgorithm {
    /// Unknown or absent
    Unknown = 0,
    /// SHA-256
    Sha256 = 1,
    /// SHA-384
    Sha384 = 2,
}

impl DigestAlgorithm {
    /// Parse from the journal byte
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(DigestAlgorithm::Unknown),
            1 => Some(DigestAlgorithm::Sha256),
            2 => Some(DigestAlgorithm::Sha384),
            _ => None,
        }
    }
}

/// OIDC identity extracted from the signing certificate
///
/// Fields default to empty strings when the corresponding extension is
/// absent; the journal encodes them as zero-length strings either way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OidcIdentity {
    /// OIDC issuer URL
    pub issuer: String,
    /// OIDC subject (SAN identity)
    pub subject: String,
    /// Workflow file at a git ref
    pub workflow_ref: String,
    /// Source repository URL
    pub repository: String,
    /// Trigger event name
    pub event_name: String,
}

/// The outcome of a successful verification
///
/// Exactly one of the RFC 3161 and Rekor blocks carries data; the other is
/// zeroed, never omitted, so the journal encoding is canonical.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    /// Accepted signing time (Unix seconds)
    pub timestamp: u64,
    /// Which mechanism proved the signing time
    pub timestamp_proof_type: TimestampProofType,
    /// SHA-256 of each chain certificate DER, leaf first, root last
    pub certificate_hashes: Vec<[u8; 32]>,
    /// Digest of subject[0] from the in-toto statement
    pub subject_digest: Vec<u8>,
    /// Algorithm of the subject digest
    pub subject_digest_algorithm: DigestAlgorithm,
    /// OIDC identity claims
    pub oidc: OidcIdentity,
    /// SHA-256 of each TSA chain certificate DER (RFC 3161 path only)
    pub tsa_chain_hashes: Vec<[u8; 32]>,
    /// Message imprint hash algorithm (RFC 3161 path only)
    pub message_imprint_algorithm: DigestAlgorithm,
    /// Message imprint bytes (RFC 3161 path only)
    pub message_imprint: Vec<u8>,
    /// SHA-256 of the log public key DER (Rekor path only)
    pub rekor_log_id: [u8; 32],
    /// Tree position of the entry (Rekor path only)
    pub rekor_log_index: u64,
    /// API position of the entry (Rekor path only)
    pub rekor_entry_index: u64,
}
