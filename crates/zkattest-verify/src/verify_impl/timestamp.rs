//! Timestamp proof handling
//!
//! Extracts the tentative signing time from whichever mechanism the bundle
//! carries, and drives full RFC 3161 verification: TSA chain selection (or
//! embedded certificates), chain walk with the timeStamping EKU, and the
//! countersignature check.

use crate::error::{Error, Result};
use crate::result::DigestAlgorithm;
use crate::verify_impl::chain::{verify_chain, RequiredEku};
use zkattest_trust_root::{select_timestamp_authority, TrustedRoot};
use zkattest_tsa::{parse_timestamp_token, verify_timestamp_token, ParsedTimestamp};
use zkattest_types::{Bundle, HashAlgorithm};

/// Outcome of a verified RFC 3161 countersignature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsaVerification {
    /// TSTInfo generation time (Unix seconds)
    pub gen_time: u64,
    /// Message imprint hash algorithm
    pub imprint_algorithm: DigestAlgorithm,
    /// Message imprint bytes
    pub imprint: Vec<u8>,
    /// SHA-256 of each TSA chain certificate, leaf first
    pub chain_hashes: Vec<[u8; 32]>,
}

/// Parse the bundle's first timestamp token
fn parse_first_token(bundle: &Bundle) -> Result<ParsedTimestamp> {
    let timestamp = bundle
        .verification_material
        .timestamp_verification_data
        .rfc3161_timestamps
        .first()
        .ok_or_else(|| Error::MalformedEncoding("no RFC 3161 timestamps in bundle".to_string()))?;

    parse_timestamp_token(timestamp.signed_timestamp.as_bytes()).map_err(map_tsa_error)
}

/// Read the generation time of the first RFC 3161 token without verifying it
pub fn peek_rfc3161_time(bundle: &Bundle) -> Result<i64> {
    Ok(parse_first_token(bundle)?.tst_info.gen_time_unix() as i64)
}

/// Verify the bundle's RFC 3161 timestamp against the trust root.
///
/// The TSA chain comes from the token itself when it embeds certificates,
/// otherwise from the trust root entry active at the generation time. The
/// trust root's TSA validity window gates the timestamp in either case.
pub fn verify_rfc3161(bundle: &Bundle, trusted_root: &TrustedRoot) -> Result<TsaVerification> {
    let parsed = parse_first_token(bundle)?;
    let gen_time = parsed.tst_info.gen_time_unix() as i64;

    // the selected entry both gates the validity window and supplies the
    // fallback chain
    let tsa_entry = select_timestamp_authority(trusted_root, gen_time).map_err(|e| match e {
        zkattest_trust_root::Error::NoActiveEntry(_) => Error::TimestampOutsideTsaValidity,
        other => other.into(),
    })?;

    let chain_der = if parsed.embedded_certs.is_empty() {
        tsa_entry.cert_chain.der_certificates()
    } else {
        // embedded certificates take precedence over the trust-root chain
        tracing::debug!(
            count = parsed.embedded_certs.len(),
            "using TSA certificates embedded in the timestamp token"
        );
        parsed.embedded_certs.clone()
    };

    let chain = verify_chain(&chain_der, gen_time, RequiredEku::TimeStamping)?;

    let signature = bundle
        .dsse_envelope
        .signatures
        .first()
        .ok_or(Error::InvalidDsseSignature)?;

    let info = verify_timestamp_token(&parsed, signature.sig.as_bytes(), chain.leaf())
        .map_err(map_tsa_error)?;

    let imprint_algorithm = match info.imprint_algorithm {
        HashAlgorithm::Sha2256 => DigestAlgorithm::Sha256,
        HashAlgorithm::Sha2384 => DigestAlgorithm::Sha384,
        HashAlgorithm::Sha2512 => {
            return Err(Error::UnsupportedSignatureAlgorithm("SHA2_512".to_string()))
        }
    };

    Ok(TsaVerification {
        gen_time: info.gen_time,
        imprint_algorithm,
        imprint: info.imprint,
        chain_hashes: chain.hashes,
    })
}

fn map_tsa_error(err: zkattest_tsa::Error) -> Error {
    match err {
        zkattest_tsa::Error::ImprintMismatch { .. } => Error::ImprintMismatch,
        zkattest_tsa::Error::SignatureInvalid(s) => Error::TimestampSigInvalid(s),
        zkattest_tsa::Error::UnsupportedHashAlgorithm(s) => {
            Error::UnsupportedSignatureAlgorithm(s)
        }
        other => Error::MalformedEncoding(other.to_string()),
    }
}
