//! DSSE envelope verification and subject digest extraction

use crate::error::{Error, Result};
use crate::result::DigestAlgorithm;
use zkattest_crypto::VerifyingKey;
use zkattest_types::{DsseEnvelope, Statement};

/// Verify the envelope's first signature against the leaf key.
///
/// The signature is over the Pre-Authentication Encoding of the payload.
/// Only the first signature is considered; multi-signature envelopes are out
/// of scope.
pub fn verify_envelope(envelope: &DsseEnvelope, leaf_key: &VerifyingKey) -> Result<()> {
    let signature = envelope
        .signatures
        .first()
        .ok_or(Error::InvalidDsseSignature)?;

    let pae = envelope.pae();

    leaf_key
        .verify_dsse(&pae, signature.sig.as_bytes())
        .map_err(|e| match e {
            zkattest_crypto::Error::MalleableSignature => Error::MalleableSignature,
            zkattest_crypto::Error::UnsupportedAlgorithm(s) => {
                Error::UnsupportedSignatureAlgorithm(s)
            }
            _ => Error::InvalidDsseSignature,
        })?;

    tracing::debug!("DSSE envelope signature verified");
    Ok(())
}

/// Parse the envelope payload as an in-toto statement
pub fn parse_statement(envelope: &DsseEnvelope) -> Result<Statement> {
    serde_json::from_slice(envelope.payload.as_bytes())
        .map_err(|e| Error::MalformedEncoding(format!("invalid in-toto statement: {}", e)))
}

/// Extract the digest of `subject[0]`, preferring sha256 over sha384.
///
/// An absent subject, an undecodable digest, or an all-zero digest leaves
/// nothing to attest and is rejected.
pub fn extract_subject_digest(statement: &Statement) -> Result<(Vec<u8>, DigestAlgorithm)> {
    let subject = statement.subject.first().ok_or(Error::EmptySubject)?;

    let (hex_digest, algorithm, expected_len) =
        if let Some(sha256) = subject.digest.sha256.as_deref() {
            (sha256, DigestAlgorithm::Sha256, 32)
        } else if let Some(sha384) = subject.digest.sha384.as_deref() {
            (sha384, DigestAlgorithm::Sha384, 48)
        } else {
            return Err(Error::UnsupportedSubjectDigest);
        };

    let digest = hex::decode(hex_digest)
        .map_err(|e| Error::MalformedEncoding(format!("invalid subject digest hex: {}", e)))?;

    if digest.len() != expected_len {
        return Err(Error::MalformedEncoding(format!(
            "subject digest is {} bytes, expected {}",
            digest.len(),
            expected_len
        )));
    }

    if digest.iter().all(|&b| b == 0) {
        return Err(Error::EmptySubject);
    }

    Ok((digest, algorithm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkattest_types::{DigestSet, Subject};

    fn statement_with(digest: DigestSet) -> Statement {
        Statement {
            type_: "https://in-toto.io/Statement/v1".to_string(),
            subject: vec![Subject {
                name: "artifact".to_string(),
                digest,
            }],
            predicate_type: "https://slsa.dev/provenance/v1".to_string(),
            predicate: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_prefers_sha256() {
        let statement = statement_with(DigestSet {
            sha256: Some("11".repeat(32)),
            sha384: Some("22".repeat(48)),
            sha512: None,
        });
        let (digest, algorithm) = extract_subject_digest(&statement).unwrap();
        assert_eq!(algorithm, DigestAlgorithm::Sha256);
        assert_eq!(digest, vec![0x11; 32]);
    }

    #[test]
    fn test_falls_back_to_sha384() {
        let statement = statement_with(DigestSet {
            sha256: None,
            sha384: Some("22".repeat(48)),
            sha512: None,
        });
        let (digest, algorithm) = extract_subject_digest(&statement).unwrap();
        assert_eq!(algorithm, DigestAlgorithm::Sha384);
        assert_eq!(digest.len(), 48);
    }

    #[test]
    fn test_sha512_only_unsupported() {
        let statement = statement_with(DigestSet {
            sha256: None,
            sha384: None,
            sha512: Some("33".repeat(64)),
        });
        assert!(matches!(
            extract_subject_digest(&statement),
            Err(Error::UnsupportedSubjectDigest)
        ));
    }

    #[test]
    fn test_empty_subject() {
        let mut statement = statement_with(DigestSet::default());
        statement.subject.clear();
        assert!(matches!(
            extract_subject_digest(&statement),
            Err(Error::EmptySubject)
        ));
    }

    #[test]
    fn test_zero_digest_rejected() {
        let statement = statement_with(DigestSet {
            sha256: Some("00".repeat(32)),
            sha384: None,
            sha512: None,
        });
        assert!(matches!(
            extract_subject_digest(&statement),
            Err(Error::EmptySubject)
        ));
    }

    #[test]
    fn test_wrong_length_digest_rejected() {
        let statement = statement_with(DigestSet {
            sha256: Some("11".repeat(16)),
            sha384: None,
            sha512: None,
        });
        assert!(matches!(
            extract_subject_digest(&statement),
            Err(Error::MalformedEncoding(_))
        ));
    }
}
