//! Bundle verification entry point
//!
//! Drives the verification pipeline over a bundle:
//!
//! 1. Parse the bundle and check the media type.
//! 2. Require exactly one timestamp mechanism.
//! 3. Extract the tentative signing time from that mechanism.
//! 4. Select the active Fulcio CA from the trust root at that time.
//! 5. Verify the certificate chain at the signing time.
//! 6. Verify the DSSE envelope and extract the subject digest.
//! 7. Verify the timestamp proof (RFC 3161 or Rekor).
//! 8. Extract the OIDC identity and apply the caller's expectations.
//!
//! The first failing step rejects the bundle; no partial result escapes.

use crate::error::{Error, Result};
use crate::result::{OidcIdentity, TimestampProofType, VerificationResult};
use crate::verify_impl::chain::{verify_chain, RequiredEku};
use crate::verify_impl::{dsse, oidc, rekor, timestamp};
use zkattest_trust_root::{select_certificate_authority, FulcioInstance, TrustedRoot};
use zkattest_types::Bundle;

/// Caller expectations checked after cryptographic verification
#[derive(Debug, Clone, Default)]
pub struct VerificationOptions {
    /// Required subject digest; mismatch rejects the bundle
    pub expected_digest: Option<Vec<u8>>,
    /// Required OIDC issuer; mismatch rejects the bundle
    pub expected_issuer: Option<String>,
    /// Required OIDC subject; mismatch rejects the bundle
    pub expected_subject: Option<String>,
    /// Restrict CA selection to one Fulcio deployment
    pub fulcio_instance: Option<FulcioInstance>,
}

/// Verify a bundle against a trust root.
///
/// This is the single entry point the zkVM guest calls: pure, synchronous,
/// no clock, no I/O. All time checks use values derived from the inputs.
/// On success the returned result encodes to the canonical journal via
/// [`VerificationResult::to_journal`].
pub fn verify(
    bundle_json: &[u8],
    trusted_root: &TrustedRoot,
    options: &VerificationOptions,
) -> Result<VerificationResult> {
    let bundle = Bundle::from_slice(bundle_json)?;
    bundle.version()?;

    // exactly one timestamp mechanism
    let has_rfc3161 = bundle.has_rfc3161_timestamps();
    let has_tlog = bundle.has_tlog_entries();
    if has_rfc3161 == has_tlog {
        return Err(Error::AmbiguousTimestamp);
    }

    // tentative signing time, authenticated later by the mechanism itself
    let signing_time = if has_rfc3161 {
        timestamp::peek_rfc3161_time(&bundle)?
    } else {
        let entry = &bundle.verification_material.tlog_entries[0];
        if entry.integrated_time <= 0 {
            return Err(Error::MalformedEncoding(
                "tlog entry has no integrated time".to_string(),
            ));
        }
        entry.integrated_time
    };

    tracing::debug!(signing_time, rfc3161 = has_rfc3161, "verifying bundle");

    // Fulcio chain: bundle leaf followed by the selected CA chain
    let ca = select_certificate_authority(trusted_root, options.fulcio_instance, signing_time)?;
    let mut chain_der = vec![bundle.signing_certificate().as_bytes().to_vec()];
    chain_der.extend(ca.cert_chain.der_certificates());

    let chain = verify_chain(&chain_der, signing_time, RequiredEku::CodeSigning)?;
    let leaf = chain.leaf();

    // DSSE envelope and statement
    let leaf_key = leaf.public_key().map_err(|e| match e {
        zkattest_crypto::Error::UnsupportedAlgorithm(s) => Error::UnsupportedSignatureAlgorithm(s),
        other => Error::MalformedEncoding(other.to_string()),
    })?;
    dsse::verify_envelope(&bundle.dsse_envelope, &leaf_key)?;

    let statement = dsse::parse_statement(&bundle.dsse_envelope)?;
    let (subject_digest, subject_digest_algorithm) = dsse::extract_subject_digest(&statement)?;

    // timestamp proof
    let mut result = VerificationResult {
        timestamp: 0,
        timestamp_proof_type: TimestampProofType::None,
        certificate_hashes: chain.hashes.clone(),
        subject_digest,
        subject_digest_algorithm,
        oidc: OidcIdentity::default(),
        tsa_chain_hashes: Vec::new(),
        message_imprint_algorithm: crate::result::DigestAlgorithm::Unknown,
        message_imprint: Vec::new(),
        rekor_log_id: [0u8; 32],
        rekor_log_index: 0,
        rekor_entry_index: 0,
    };

    if has_rfc3161 {
        let tsa = timestamp::verify_rfc3161(&bundle, trusted_root)?;
        result.timestamp = tsa.gen_time;
        result.timestamp_proof_type = TimestampProofType::Rfc3161;
        result.tsa_chain_hashes = tsa.chain_hashes;
        result.message_imprint_algorithm = tsa.imprint_algorithm;
        result.message_imprint = tsa.imprint;
    } else {
        let entry = &bundle.verification_material.tlog_entries[0];
        let rekor = rekor::verify_tlog_entry(entry, &bundle.dsse_envelope, &leaf.der, trusted_root)?;
        result.timestamp = rekor.integrated_time as u64;
        result.timestamp_proof_type = TimestampProofType::Rekor;
        result.rekor_log_id = rekor.log_id;
        result.rekor_log_index = rekor.log_index;
        result.rekor_entry_index = rekor.entry_index;
    }

    // OIDC identity and caller expectations
    result.oidc = oidc::extract_identity(leaf);

    if let Some(expected) = &options.expected_issuer {
        if &result.oidc.issuer != expected {
            return Err(Error::IssuerMismatch);
        }
    }
    if let Some(expected) = &options.expected_subject {
        if &result.oidc.subject != expected {
            return Err(Error::SubjectMismatch);
        }
    }
    if let Some(expected) = &options.expected_digest {
        if &result.subject_digest != expected {
            return Err(Error::DigestMismatch);
        }
    }

    tracing::debug!(
        timestamp = result.timestamp,
        proof_type = result.timestamp_proof_type as u8,
        "bundle verified"
    );

    Ok(result)
}
