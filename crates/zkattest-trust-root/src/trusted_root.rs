//! Trusted root types and parsing
//!
//! Follows the Sigstore TrustedRoot schema. A trust bundle may be a single
//! JSON document or a JSONL stream of documents; JSONL records are merged.

use crate::error::{Error, Result};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use zkattest_types::{DerCertificate, DerPublicKey, HashAlgorithm, LogId};

/// A trusted root bundle containing all trust anchors
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedRoot {
    /// Media type of the trusted root
    #[serde(default)]
    pub media_type: String,

    /// Transparency logs (Rekor)
    #[serde(default)]
    pub tlogs: Vec<TransparencyLog>,

    /// Certificate authorities (Fulcio)
    #[serde(default)]
    pub certificate_authorities: Vec<CertificateAuthority>,

    /// Timestamp authorities (RFC 3161 TSAs)
    #[serde(default)]
    pub timestamp_authorities: Vec<TimestampAuthority>,
}

/// A transparency log entry (Rekor)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransparencyLog {
    /// Base URL of the transparency log
    #[serde(default)]
    pub base_url: String,

    /// Hash algorithm used by the log
    pub hash_algorithm: HashAlgorithm,

    /// Public key for verification
    pub public_key: PublicKey,

    /// Log ID
    pub log_id: LogId,
}

/// A certificate authority entry (Fulcio)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateAuthority {
    /// URI of the CA
    #[serde(default)]
    pub uri: String,

    /// Certificate chain, ordered towards the root
    pub cert_chain: CertChain,

    /// Validity period
    #[serde(default)]
    pub valid_for: Option<ValidityPeriod>,
}

/// A timestamp authority entry
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestampAuthority {
    /// URI of the TSA
    #[serde(default)]
    pub uri: Option<String>,

    /// Certificate chain: [leaf, intermediates..., root]
    pub cert_chain: CertChain,

    /// Validity period
    #[serde(default)]
    pub valid_for: Option<ValidityPeriod>,
}

/// Public key information
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKey {
    /// Raw bytes of the public key (DER-encoded SPKI)
    pub raw_bytes: DerPublicKey,

    /// Key details/type
    #[serde(default)]
    pub key_details: String,

    /// Validity period for this key
    #[serde(default)]
    pub valid_for: Option<ValidityPeriod>,
}

/// Certificate chain
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertChain {
    /// Certificates in the chain
    pub certificates: Vec<CertificateEntry>,
}

/// A certificate entry
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateEntry {
    /// Raw bytes of the certificate (DER-encoded)
    pub raw_bytes: DerCertificate,
}

/// Validity period for a key or certificate (RFC 3339 timestamps)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityPeriod {
    /// Start time
    #[serde(default)]
    pub start: Option<String>,

    /// End time; absent means currently active with no upper bound
    #[serde(default)]
    pub end: Option<String>,
}

impl ValidityPeriod {
    /// Start time as Unix seconds
    pub fn start_unix(&self) -> Result<Option<i64>> {
        parse_rfc3339_opt(self.start.as_deref())
    }

    /// End time as Unix seconds
    pub fn end_unix(&self) -> Result<Option<i64>> {
        parse_rfc3339_opt(self.end.as_deref())
    }

    /// True when `time` falls inside the window
    pub fn contains(&self, time: i64) -> Result<bool> {
        let after_start = self.start_unix()?.map_or(true, |s| time >= s);
        let before_end = self.end_unix()?.map_or(true, |e| time <= e);
        Ok(after_start && before_end)
    }
}

fn parse_rfc3339_opt(value: Option<&str>) -> Result<Option<i64>> {
    match value {
        None => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.timestamp()))
            .map_err(|e| Error::TimeParse(format!("{}: {}", s, e))),
    }
}

impl CertChain {
    /// The chain as raw DER certificates, in the stored order
    pub fn der_certificates(&self) -> Vec<Vec<u8>> {
        self.certificates
            .iter()
            .map(|c| c.raw_bytes.as_bytes().to_vec())
            .collect()
    }
}

impl TrustedRoot {
    /// Parse a trusted root from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a trust bundle from JSONL: one TrustedRoot document per line,
    /// merged into a single root. Blank lines are skipped. A single JSON
    /// document also parses through this path.
    pub fn from_jsonl(text: &str) -> Result<Self> {
        if let Ok(root) = serde_json::from_str::<TrustedRoot>(text) {
            return Ok(root);
        }

        let mut merged = TrustedRoot::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record: TrustedRoot = serde_json::from_str(line)?;
            if merged.media_type.is_empty() {
                merged.media_type = record.media_type;
            }
            merged.tlogs.extend(record.tlogs);
            merged
                .certificate_authorities
                .extend(record.certificate_authorities);
            merged
                .timestamp_authorities
                .extend(record.timestamp_authorities);
        }
        Ok(merged)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_TRUSTED_ROOT: &str = r#"{
        "mediaType": "application/vnd.dev.sigstore.trustedroot+json;version=0.1",
        "tlogs": [{
            "baseUrl": "https://rekor.sigstore.dev",
            "hashAlgorithm": "SHA2_256",
            "publicKey": {
                "rawBytes": "MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEYI4heOTrNrZO27elFE8ynfrdPMikttRkbe+vJKQ50G6bfwQ3WyhLpRwwwohelDAm8xRzJ56nYsIa3VHivVvpmA==",
                "keyDetails": "PKIX_ECDSA_P256_SHA_256",
                "validFor": {"start": "2021-01-12T11:53:27.000Z"}
            },
            "logId": {"keyId": "wNI9atQGlz+VWfO6LRygH4QUfY/8W4RFwiT5i5WRgB0="}
        }],
        "certificateAuthorities": [{
            "uri": "https://fulcio.sigstore.dev",
            "certChain": {"certificates": [{"rawBytes": "YWJjZA=="}]},
            "validFor": {"start": "2022-04-13T20:06:15.000Z"}
        }],
        "timestampAuthorities": []
    }"#;

    #[test]
    fn test_parse_trusted_root() {
        let root = TrustedRoot::from_json(SAMPLE_TRUSTED_ROOT).unwrap();
        assert_eq!(root.tlogs.len(), 1);
        assert_eq!(root.certificate_authorities.len(), 1);
        assert!(root.timestamp_authorities.is_empty());
    }

    #[test]
    fn test_validity_period() {
        let period = ValidityPeriod {
            start: Some("2022-04-13T20:06:15.000Z".to_string()),
            end: Some("2023-04-13T20:06:15.000Z".to_string()),
        };
        let start = period.start_unix().unwrap().unwrap();
        let end = period.end_unix().unwrap().unwrap();
        assert!(start < end);
        assert!(period.contains(start).unwrap());
        assert!(period.contains(end).unwrap());
        assert!(!period.contains(start - 1).unwrap());
        assert!(!period.contains(end + 1).unwrap());
    }

    #[test]
    fn test_open_ended_validity() {
        let period = ValidityPeriod {
            start: Some("2022-04-13T20:06:15.000Z".to_string()),
            end: None,
        };
        // no upper bound
        assert!(period.contains(i64::MAX).unwrap());
    }

    #[test]
    fn test_invalid_time_rejected() {
        let period = ValidityPeriod {
            start: Some("not-a-time".to_string()),
            end: None,
        };
        assert!(period.contains(0).is_err());
    }

    #[test]
    fn test_jsonl_merging() {
        let a = r#"{"certificateAuthorities": [{"uri": "https://fulcio.sigstore.dev", "certChain": {"certificates": []}}]}"#;
        let b = r#"{"certificateAuthorities": [{"uri": "https://fulcio.githubapp.com", "certChain": {"certificates": []}}]}"#;
        let jsonl = format!("{}\n{}\n", a, b);

        let merged = TrustedRoot::from_jsonl(&jsonl).unwrap();
        assert_eq!(merged.certificate_authorities.len(), 2);
    }

    #[test]
    fn test_jsonl_accepts_single_document() {
        let root = TrustedRoot::from_jsonl(SAMPLE_TRUSTED_ROOT).unwrap();
        assert_eq!(root.tlogs.len(), 1);
    }
}
