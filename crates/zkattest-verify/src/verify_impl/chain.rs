//! Certificate chain verification
//!
//! Walks an already-ordered chain leaf-to-root: each certificate must be
//! signed by the next, the terminal certificate must be self-signed, and
//! every validity window must contain the signing time. No path building;
//! the caller supplies the order.

use crate::error::{Error, Result};
use const_oid::db::rfc5280::ID_KP_TIME_STAMPING;
use const_oid::db::rfc5912::ID_KP_CODE_SIGNING;
use zkattest_crypto::{parse_certificate, sha256, ParsedCertificate};

/// Maximum accepted chain depth
pub const MAX_CHAIN_DEPTH: usize = 8;

/// EKU the leaf certificate must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredEku {
    /// id-kp-codeSigning (Fulcio signing certificates)
    CodeSigning,
    /// id-kp-timeStamping (TSA signing certificates)
    TimeStamping,
}

/// A verified chain: the parsed certificates and their DER digests
#[derive(Debug)]
pub struct VerifiedChain {
    /// Parsed certificates, leaf first
    pub certificates: Vec<ParsedCertificate>,
    /// SHA-256 of each certificate DER, leaf first, root last
    pub hashes: Vec<[u8; 32]>,
}

impl VerifiedChain {
    /// The leaf certificate
    pub fn leaf(&self) -> &ParsedCertificate {
        &self.certificates[0]
    }
}

/// Verify an ordered certificate chain at `signing_time`.
///
/// `chain_der` is leaf first, root last, length at least two. The leaf must
/// carry the required EKU.
pub fn verify_chain(
    chain_der: &[Vec<u8>],
    signing_time: i64,
    leaf_eku: RequiredEku,
) -> Result<VerifiedChain> {
    if chain_der.len() < 2 {
        return Err(Error::ChainBroken(format!(
            "chain must contain at least a leaf and a root, got {} certificates",
            chain_der.len()
        )));
    }
    if chain_der.len() > MAX_CHAIN_DEPTH {
        return Err(Error::MalformedEncoding(format!(
            "chain depth {} exceeds maximum {}",
            chain_der.len(),
            MAX_CHAIN_DEPTH
        )));
    }

    let certificates = chain_der
        .iter()
        .map(|der| parse_certificate(der).map_err(map_parse_error))
        .collect::<Result<Vec<_>>>()?;

    // each certificate is signed by the next one up
    for i in 0..certificates.len() - 1 {
        let issuer = &certificates[i + 1];
        if certificates[i].issuer_der() != issuer.subject_der() {
            return Err(Error::ChainBroken(format!(
                "certificate {} issuer does not match certificate {} subject",
                i,
                i + 1
            )));
        }
        let issuer_key = issuer.public_key().map_err(map_crypto_error)?;
        certificates[i]
            .verify_signed_by(&issuer_key)
            .map_err(|e| match e {
                zkattest_crypto::Error::MalleableSignature => Error::MalleableSignature,
                zkattest_crypto::Error::UnsupportedAlgorithm(s) => {
                    Error::UnsupportedSignatureAlgorithm(s)
                }
                other => Error::ChainBroken(format!("certificate {}: {}", i, other)),
            })?;
    }

    // the terminal certificate is its own issuer
    let root = &certificates[certificates.len() - 1];
    if !root.is_self_issued() {
        return Err(Error::RootNotSelfSigned);
    }
    let root_key = root.public_key().map_err(map_crypto_error)?;
    root.verify_signed_by(&root_key).map_err(|e| match e {
        zkattest_crypto::Error::MalleableSignature => Error::MalleableSignature,
        zkattest_crypto::Error::UnsupportedAlgorithm(s) => Error::UnsupportedSignatureAlgorithm(s),
        _ => Error::RootNotSelfSigned,
    })?;

    // signing time must fall in every certificate's validity window
    for cert in &certificates {
        if signing_time < cert.not_before {
            return Err(Error::NotYetValid);
        }
        if signing_time > cert.not_after {
            return Err(Error::Expired);
        }
    }

    // leaf EKU policy
    let leaf = &certificates[0];
    match leaf_eku {
        RequiredEku::CodeSigning => {
            if !leaf.has_eku(&ID_KP_CODE_SIGNING) {
                return Err(Error::MissingEku);
            }
        }
        RequiredEku::TimeStamping => {
            if !leaf.has_eku(&ID_KP_TIME_STAMPING) {
                return Err(Error::TsaEkuMissing);
            }
        }
    }

    let hashes = chain_der.iter().map(|der| sha256(der)).collect();

    tracing::debug!(depth = certificates.len(), "certificate chain verified");

    Ok(VerifiedChain {
        certificates,
        hashes,
    })
}

fn map_parse_error(err: zkattest_crypto::Error) -> Error {
    match err {
        zkattest_crypto::Error::UnsupportedCriticalExtension(oid) => {
            Error::UnsupportedCriticalExtension(oid)
        }
        other => Error::MalformedEncoding(other.to_string()),
    }
}

fn map_crypto_error(err: zkattest_crypto::Error) -> Error {
    match err {
        zkattest_crypto::Error::UnsupportedAlgorithm(s) => Error::UnsupportedSignatureAlgorithm(s),
        other => Error::MalformedEncoding(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_chain_rejected() {
        let err = verify_chain(&[vec![0u8; 4]], 0, RequiredEku::CodeSigning).unwrap_err();
        assert!(matches!(err, Error::ChainBroken(_)));
    }

    #[test]
    fn test_deep_chain_rejected() {
        let chain = vec![vec![0u8; 4]; MAX_CHAIN_DEPTH + 1];
        let err = verify_chain(&chain, 0, RequiredEku::CodeSigning).unwrap_err();
        assert!(matches!(err, Error::MalformedEncoding(_)));
    }

    #[test]
    fn test_garbage_der_rejected() {
        let chain = vec![b"junk".to_vec(), b"junk".to_vec()];
        let err = verify_chain(&chain, 0, RequiredEku::CodeSigning).unwrap_err();
        assert!(matches!(err, Error::MalformedEncoding(_)));
    }
}
