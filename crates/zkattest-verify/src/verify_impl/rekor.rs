//! Rekor transparency log verification
//!
//! Verifies the inclusion proof over the committed canonical body, cross
//! checks that body against the envelope and leaf certificate, and, when an
//! inclusion promise is present, verifies the Signed Entry Timestamp.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use zkattest_crypto::sha256;
use zkattest_merkle::{hash_leaf, verify_inclusion_proof, HASH_SIZE};
use zkattest_trust_root::{select_transparency_log, TransparencyLog, TrustedRoot};
use zkattest_types::{DerCertificate, DsseEnvelope, PemContent, SignatureBytes, TransparencyLogEntry};

/// Maximum number of sibling hashes accepted in an inclusion proof
pub const MAX_PROOF_HASHES: usize = 64;

/// Outcome of a verified transparency log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RekorVerification {
    /// Integration time reported by the log (Unix seconds)
    pub integrated_time: i64,
    /// SHA-256 of the log public key DER
    pub log_id: [u8; 32],
    /// Tree position of the leaf (from the inclusion proof)
    pub log_index: u64,
    /// API position of the entry
    pub entry_index: u64,
}

// Rekor DSSE record v0.0.1: the schema of the canonicalized body. The
// envelopeHash field is parsed but not recomputed; it hashes an
// uncanonicalized envelope serialization that cannot be reproduced here.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct DsseV001Body {
    api_version: String,
    kind: String,
    spec: DsseV001Spec,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct DsseV001Spec {
    #[serde(default)]
    envelope_hash: Option<HashValue>,
    payload_hash: HashValue,
    signatures: Vec<BodySignature>,
}

#[derive(Debug, Deserialize, Serialize)]
struct HashValue {
    algorithm: String,
    value: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct BodySignature {
    signature: SignatureBytes,
    verifier: PemContent,
}

impl BodySignature {
    /// The verifier as DER certificate bytes.
    ///
    /// Rekor stores the verifier as base64 of PEM text; some producers store
    /// the DER directly.
    fn verifier_der(&self) -> Result<Vec<u8>> {
        let raw = self.verifier.as_bytes();
        if let Ok(text) = std::str::from_utf8(raw) {
            if text.contains("-----BEGIN CERTIFICATE-----") {
                return DerCertificate::from_pem(text)
                    .map(|c| c.into_bytes())
                    .map_err(|e| Error::MalformedEncoding(e.to_string()));
            }
        }
        Ok(raw.to_vec())
    }
}

/// Verify a transparency log entry against the envelope and leaf certificate.
pub fn verify_tlog_entry(
    entry: &TransparencyLogEntry,
    envelope: &DsseEnvelope,
    leaf_cert_der: &[u8],
    trusted_root: &TrustedRoot,
) -> Result<RekorVerification> {
    if entry.integrated_time <= 0 {
        return Err(Error::MalformedEncoding(
            "tlog entry has no integrated time".to_string(),
        ));
    }

    // locate the log this entry claims to come from
    let claimed_log_id = entry
        .log_id
        .key_id
        .decode()
        .map_err(|e| Error::MalformedEncoding(e.to_string()))?;
    let (tlog, log_id) =
        select_transparency_log(trusted_root, &claimed_log_id, entry.integrated_time)?;

    // the inclusion proof is required; a promise alone does not prove
    // membership
    let proof = entry
        .inclusion_proof
        .as_ref()
        .ok_or_else(|| Error::InclusionProofInvalid("missing inclusion proof".to_string()))?;

    if proof.hashes.len() > MAX_PROOF_HASHES {
        return Err(Error::InclusionProofInvalid(format!(
            "proof has {} hashes, maximum is {}",
            proof.hashes.len(),
            MAX_PROOF_HASHES
        )));
    }

    let tree_index = proof
        .log_index
        .as_u64()
        .map_err(|e| Error::MalformedEncoding(e.to_string()))?;
    let tree_size = u64::try_from(proof.tree_size)
        .map_err(|_| Error::InclusionProofInvalid("negative tree size".to_string()))?;

    let proof_hashes: Vec<[u8; HASH_SIZE]> =
        proof.hashes.iter().map(|h| *h.as_bytes()).collect();

    // the leaf preimage is the exact committed body, never a re-serialization
    let leaf_hash = hash_leaf(entry.canonicalized_body.as_bytes());

    verify_inclusion_proof(
        &leaf_hash,
        tree_index,
        tree_size,
        &proof_hashes,
        proof.root_hash.as_bytes(),
    )
    .map_err(|e| Error::InclusionProofInvalid(e.to_string()))?;

    // bind the logged body to the bundle's envelope and certificate
    cross_check_body(entry, envelope, leaf_cert_der)?;

    // the promise is optional; verify it when present
    if entry.inclusion_promise.is_some() {
        verify_signed_entry_timestamp(entry, tlog, &log_id)?;
    }

    let entry_index = entry
        .log_index
        .as_u64()
        .map_err(|e| Error::MalformedEncoding(e.to_string()))?;

    tracing::debug!(
        log_index = tree_index,
        tree_size,
        "transparency log entry verified"
    );

    Ok(RekorVerification {
        integrated_time: entry.integrated_time,
        log_id,
        log_index: tree_index,
        entry_index,
    })
}

/// Check the logged DSSE record matches the bundle material.
///
/// Prevents signature substitution: the payload hash, the signature bytes
/// and the verifier certificate must all match what the log committed to.
fn cross_check_body(
    entry: &TransparencyLogEntry,
    envelope: &DsseEnvelope,
    leaf_cert_der: &[u8],
) -> Result<()> {
    if entry.kind_version.kind != "dsse" || entry.kind_version.version != "0.0.1" {
        return Err(Error::MalformedEncoding(format!(
            "unsupported tlog entry kind {}/{}",
            entry.kind_version.kind, entry.kind_version.version
        )));
    }

    let body: DsseV001Body = serde_json::from_slice(entry.canonicalized_body.as_bytes())
        .map_err(|e| Error::MalformedEncoding(format!("invalid tlog entry body: {}", e)))?;

    if body.kind != "dsse" || body.api_version != "0.0.1" {
        return Err(Error::MalformedEncoding(format!(
            "tlog body kind {}/{} does not match entry",
            body.kind, body.api_version
        )));
    }

    // payload hash
    if !body.spec.payload_hash.algorithm.eq_ignore_ascii_case("sha256") {
        return Err(Error::MalformedEncoding(format!(
            "unsupported payload hash algorithm: {}",
            body.spec.payload_hash.algorithm
        )));
    }
    let payload_hash = hex::encode(sha256(envelope.payload.as_bytes()));
    if payload_hash != body.spec.payload_hash.value {
        return Err(Error::InclusionProofInvalid(
            "payload hash does not match logged entry".to_string(),
        ));
    }

    // every envelope signature must appear in the logged record, bound to
    // the same verifier certificate
    if envelope.signatures.len() != body.spec.signatures.len() {
        return Err(Error::InclusionProofInvalid(format!(
            "signature count mismatch: bundle has {}, log has {}",
            envelope.signatures.len(),
            body.spec.signatures.len()
        )));
    }

    for bundle_sig in &envelope.signatures {
        let mut found = false;
        for logged in &body.spec.signatures {
            if bundle_sig.sig.as_bytes() == logged.signature.as_bytes()
                && leaf_cert_der == logged.verifier_der()?.as_slice()
            {
                found = true;
                break;
            }
        }
        if !found {
            return Err(Error::InclusionProofInvalid(
                "bundle signature does not match logged entry".to_string(),
            ));
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct SetPayload {
    body: String,
    #[serde(rename = "integratedTime")]
    integrated_time: i64,
    #[serde(rename = "logIndex")]
    log_index: i64,
    #[serde(rename = "logID")]
    log_id: String,
}

/// Verify the Signed Entry Timestamp against the log key.
///
/// The SET signs the RFC 8785 canonical JSON of the entry coordinates.
fn verify_signed_entry_timestamp(
    entry: &TransparencyLogEntry,
    tlog: &TransparencyLog,
    log_id: &[u8; 32],
) -> Result<()> {
    let promise = entry
        .inclusion_promise
        .as_ref()
        .ok_or_else(|| Error::InclusionProofInvalid("missing inclusion promise".to_string()))?;

    let entry_index = entry
        .log_index
        .as_u64()
        .map_err(|e| Error::MalformedEncoding(e.to_string()))?;

    let payload = SetPayload {
        body: entry.canonicalized_body.to_base64(),
        integrated_time: entry.integrated_time,
        log_index: entry_index as i64,
        log_id: hex::encode(log_id),
    };

    let message = serde_json_canonicalizer::to_vec(&payload)
        .map_err(|e| Error::MalformedEncoding(format!("SET canonicalization failed: {}", e)))?;

    let log_key = zkattest_crypto::VerifyingKey::from_spki_der(tlog.public_key.raw_bytes.as_bytes())
        .map_err(|e| Error::MalformedEncoding(format!("invalid log key: {}", e)))?;

    log_key
        .verify_dsse(&message, promise.signed_entry_timestamp.as_bytes())
        .map_err(|e| match e {
            zkattest_crypto::Error::MalleableSignature => Error::MalleableSignature,
            _ => Error::InclusionProofInvalid("signed entry timestamp invalid".to_string()),
        })?;

    tracing::debug!("signed entry timestamp verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use zkattest_types::{
        CanonicalizedBody, DsseSignature, InclusionProof, KindVersion, LogId, LogIndex, LogKeyId,
        PayloadBytes, Sha256Hash,
    };

    fn body_json(payload: &[u8], sig: &[u8], cert_der: &[u8]) -> Vec<u8> {
        let pem = DerCertificate::from_bytes(cert_der).to_pem();
        let body = serde_json::json!({
            "apiVersion": "0.0.1",
            "kind": "dsse",
            "spec": {
                "payloadHash": {
                    "algorithm": "sha256",
                    "value": hex::encode(sha256(payload)),
                },
                "signatures": [{
                    "signature": base64::engine::general_purpose::STANDARD.encode(sig),
                    "verifier": base64::engine::general_purpose::STANDARD.encode(pem.as_bytes()),
                }]
            }
        });
        serde_json::to_vec(&body).unwrap()
    }

    fn envelope(payload: &[u8], sig: &[u8]) -> DsseEnvelope {
        DsseEnvelope {
            payload_type: "application/vnd.in-toto+json".to_string(),
            payload: PayloadBytes::from_bytes(payload),
            signatures: vec![DsseSignature {
                keyid: String::new(),
                sig: SignatureBytes::from_bytes(sig),
            }],
        }
    }

    fn entry_for(body: &[u8]) -> TransparencyLogEntry {
        // tree of one leaf: the root is the leaf hash
        let root = hash_leaf(body);
        TransparencyLogEntry {
            log_index: LogIndex::from_u64(42),
            log_id: LogId {
                key_id: LogKeyId::from_bytes(&[0u8; 32]),
            },
            kind_version: KindVersion {
                kind: "dsse".to_string(),
                version: "0.0.1".to_string(),
            },
            integrated_time: 1_700_000_000,
            inclusion_promise: None,
            inclusion_proof: Some(InclusionProof {
                log_index: LogIndex::from_u64(0),
                root_hash: Sha256Hash::from_bytes(root),
                tree_size: 1,
                hashes: vec![],
            }),
            canonicalized_body: CanonicalizedBody::from_bytes(body),
        }
    }

    #[test]
    fn test_cross_check_accepts_matching_material() {
        let cert = b"fake-cert-der";
        let body = body_json(b"payload", b"sig-bytes", cert);
        let entry = entry_for(&body);
        let env = envelope(b"payload", b"sig-bytes");

        assert!(cross_check_body(&entry, &env, cert).is_ok());
    }

    #[test]
    fn test_cross_check_rejects_wrong_payload() {
        let cert = b"fake-cert-der";
        let body = body_json(b"payload", b"sig-bytes", cert);
        let entry = entry_for(&body);
        let env = envelope(b"tampered", b"sig-bytes");

        assert!(matches!(
            cross_check_body(&entry, &env, cert),
            Err(Error::InclusionProofInvalid(_))
        ));
    }

    #[test]
    fn test_cross_check_rejects_substituted_signature() {
        let cert = b"fake-cert-der";
        let body = body_json(b"payload", b"sig-bytes", cert);
        let entry = entry_for(&body);
        let env = envelope(b"payload", b"other-sig");

        assert!(matches!(
            cross_check_body(&entry, &env, cert),
            Err(Error::InclusionProofInvalid(_))
        ));
    }

    #[test]
    fn test_cross_check_rejects_substituted_verifier() {
        let cert = b"fake-cert-der";
        let body = body_json(b"payload", b"sig-bytes", cert);
        let entry = entry_for(&body);
        let env = envelope(b"payload", b"sig-bytes");

        assert!(matches!(
            cross_check_body(&entry, &env, b"other-cert"),
            Err(Error::InclusionProofInvalid(_))
        ));
    }

    #[test]
    fn test_cross_check_rejects_wrong_kind() {
        let cert = b"fake-cert-der";
        let body = body_json(b"payload", b"sig-bytes", cert);
        let mut entry = entry_for(&body);
        entry.kind_version.kind = "hashedrekord".to_string();
        let env = envelope(b"payload", b"sig-bytes");

        assert!(matches!(
            cross_check_body(&entry, &env, cert),
            Err(Error::MalformedEncoding(_))
        ));
    }
}
