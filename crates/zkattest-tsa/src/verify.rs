//! Timestamp countersignature verification
//!
//! Verifies that a parsed RFC 3161 token is a valid TSA countersignature
//! over a given DSSE signature:
//!
//! 1. The TSTInfo message imprint equals the hash of the signature bytes.
//! 2. The CMS signed attributes carry a `contentType` of id-ct-TSTInfo and a
//!    `messageDigest` matching the hash of the eContent.
//! 3. The signer matches the supplied TSA leaf certificate and its signature
//!    over the signed attributes verifies.

use crate::asn1::{OID_SHA256, OID_SHA384, OID_TST_INFO};
use crate::error::{Error, Result};
use crate::parse::ParsedTimestamp;
use cms::signed_data::SignerIdentifier;
use const_oid::db::rfc5912::{ID_EC_PUBLIC_KEY, RSA_ENCRYPTION};
use const_oid::ObjectIdentifier;
use der::asn1::{OctetStringRef, SetOfVec};
use der::Encode;
use x509_cert::attr::Attribute;
use zkattest_crypto::{sha256, sha384, ParsedCertificate, SignatureAlgorithm, VerifyingKey};
use zkattest_types::HashAlgorithm;

/// OID for the PKCS#9 contentType attribute: 1.2.840.113549.1.9.3
const OID_CONTENT_TYPE: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.3");

/// OID for the PKCS#9 messageDigest attribute: 1.2.840.113549.1.9.4
const OID_MESSAGE_DIGEST: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.4");

/// Result of a successful timestamp verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampInfo {
    /// Generation time from TSTInfo (Unix seconds)
    pub gen_time: u64,
    /// Hash algorithm of the message imprint
    pub imprint_algorithm: HashAlgorithm,
    /// The message imprint bytes
    pub imprint: Vec<u8>,
}

/// Verify a parsed timestamp token against the timestamped signature bytes
/// and the TSA leaf certificate.
///
/// The leaf certificate must already have been chain-verified by the caller;
/// this function binds the token to that leaf and to the signature.
pub fn verify_timestamp_token(
    parsed: &ParsedTimestamp,
    signature_bytes: &[u8],
    tsa_leaf: &ParsedCertificate,
) -> Result<TimestampInfo> {
    tracing::debug!("verifying RFC 3161 timestamp token");

    // 1. Message imprint binds the token to this exact signature.
    let imprint = &parsed.tst_info.message_imprint;
    let imprint_algorithm = imprint
        .hash_algorithm
        .to_hash_algorithm()
        .ok_or_else(|| {
            Error::UnsupportedHashAlgorithm(imprint.hash_algorithm.algorithm.to_string())
        })?;

    let computed: Vec<u8> = match imprint_algorithm {
        HashAlgorithm::Sha2256 => sha256(signature_bytes).to_vec(),
        HashAlgorithm::Sha2384 => sha384(signature_bytes).to_vec(),
        HashAlgorithm::Sha2512 => {
            return Err(Error::UnsupportedHashAlgorithm("SHA2_512".to_string()))
        }
    };

    let expected = imprint.hashed_message.as_bytes();
    if computed != expected {
        return Err(Error::ImprintMismatch {
            expected: hex::encode(expected),
            actual: hex::encode(&computed),
        });
    }

    // 2. Signed attributes per RFC 5652.
    let signer_info = parsed
        .signed_data
        .signer_infos
        .0
        .get(0)
        .ok_or_else(|| Error::SignatureInvalid("no signer info found".to_string()))?;

    let signed_attrs = signer_info
        .signed_attrs
        .as_ref()
        .ok_or_else(|| Error::SignatureInvalid("no signed attributes found".to_string()))?;

    verify_content_type_attribute(signed_attrs)?;
    verify_message_digest_attribute(signed_attrs, &signer_info.digest_alg.oid, &parsed.econtent_der)?;

    // 3. Signer identity must match the supplied leaf.
    verify_signer_identity(&signer_info.sid, tsa_leaf)?;

    // RFC 5652: the attributes are tagged [0] IMPLICIT in the SignerInfo but
    // the signature is computed over the generic SET OF encoding.
    let attrs_vec: Vec<Attribute> = signed_attrs.iter().cloned().collect();
    let generic_set = SetOfVec::try_from(attrs_vec)
        .map_err(|e| Error::SignatureInvalid(format!("failed to re-encode attributes: {}", e)))?;
    let message = generic_set
        .to_der()
        .map_err(|e| Error::SignatureInvalid(format!("failed to encode attributes: {}", e)))?;

    let leaf_key = tsa_leaf
        .public_key()
        .map_err(|e| Error::SignatureInvalid(format!("invalid TSA leaf key: {}", e)))?;

    let algorithm = select_signature_algorithm(
        &signer_info.signature_algorithm.oid,
        &signer_info.digest_alg.oid,
        &leaf_key,
    )?;

    leaf_key
        .verify(algorithm, &message, signer_info.signature.as_bytes())
        .map_err(|e| Error::SignatureInvalid(e.to_string()))?;

    tracing::debug!(
        gen_time = parsed.tst_info.gen_time_unix(),
        "timestamp token verified"
    );

    Ok(TimestampInfo {
        gen_time: parsed.tst_info.gen_time_unix(),
        imprint_algorithm,
        imprint: expected.to_vec(),
    })
}

/// Check the contentType signed attribute equals id-ct-TSTInfo
fn verify_content_type_attribute(attrs: &cms::signed_data::SignedAttributes) -> Result<()> {
    let attr = attrs
        .iter()
        .find(|a| a.oid == OID_CONTENT_TYPE)
        .ok_or_else(|| Error::SignatureInvalid("contentType attribute not found".to_string()))?;

    let value = attr
        .values
        .get(0)
        .ok_or_else(|| Error::SignatureInvalid("empty contentType attribute".to_string()))?;
    let content_type = value
        .decode_as::<ObjectIdentifier>()
        .map_err(|e| Error::SignatureInvalid(format!("invalid contentType value: {}", e)))?;

    if content_type != OID_TST_INFO {
        return Err(Error::SignatureInvalid(format!(
            "contentType attribute is {}, expected id-ct-TSTInfo",
            content_type
        )));
    }

    Ok(())
}

/// Check the messageDigest signed attribute matches the eContent hash
fn verify_message_digest_attribute(
    attrs: &cms::signed_data::SignedAttributes,
    digest_alg: &ObjectIdentifier,
    econtent_der: &[u8],
) -> Result<()> {
    let attr = attrs
        .iter()
        .find(|a| a.oid == OID_MESSAGE_DIGEST)
        .ok_or_else(|| Error::SignatureInvalid("messageDigest attribute not found".to_string()))?;

    if attr.values.len() != 1 {
        return Err(Error::SignatureInvalid(
            "messageDigest attribute must have exactly one value".to_string(),
        ));
    }

    let value = attr
        .values
        .get(0)
        .ok_or_else(|| Error::SignatureInvalid("empty messageDigest attribute".to_string()))?;
    let digest_octets = value
        .decode_as::<OctetStringRef<'_>>()
        .map_err(|e| Error::SignatureInvalid(format!("invalid messageDigest value: {}", e)))?;

    let computed: Vec<u8> = if *digest_alg == OID_SHA256 {
        sha256(econtent_der).to_vec()
    } else if *digest_alg == OID_SHA384 {
        sha384(econtent_der).to_vec()
    } else {
        return Err(Error::UnsupportedHashAlgorithm(digest_alg.to_string()));
    };

    if computed != digest_octets.as_bytes() {
        return Err(Error::SignatureInvalid(
            "messageDigest attribute does not match eContent".to_string(),
        ));
    }

    Ok(())
}

/// Check the CMS signer identifier designates the supplied leaf certificate
fn verify_signer_identity(sid: &SignerIdentifier, leaf: &ParsedCertificate) -> Result<()> {
    match sid {
        SignerIdentifier::IssuerAndSerialNumber(isn) => {
            let issuer_der = isn
                .issuer
                .to_der()
                .map_err(|e| Error::SignatureInvalid(format!("invalid signer issuer: {}", e)))?;
            if issuer_der == leaf.issuer_der() && isn.serial_number.as_bytes() == leaf.serial_number
            {
                Ok(())
            } else {
                Err(Error::SignatureInvalid(
                    "signer does not match TSA leaf certificate".to_string(),
                ))
            }
        }
        SignerIdentifier::SubjectKeyIdentifier(ski) => match &leaf.subject_key_id {
            Some(leaf_ski) if leaf_ski.as_slice() == ski.0.as_bytes() => Ok(()),
            _ => Err(Error::SignatureInvalid(
                "signer key identifier does not match TSA leaf certificate".to_string(),
            )),
        },
    }
}

/// Resolve the CMS signature algorithm.
///
/// Prefers the signer's signatureAlgorithm OID; some TSAs put the bare key
/// type OID there, in which case the pair is derived from the key and the
/// digest algorithm.
fn select_signature_algorithm(
    sig_alg: &ObjectIdentifier,
    digest_alg: &ObjectIdentifier,
    key: &VerifyingKey,
) -> Result<SignatureAlgorithm> {
    if let Ok(algorithm) = SignatureAlgorithm::from_oid(sig_alg) {
        return Ok(algorithm);
    }

    if *sig_alg == ID_EC_PUBLIC_KEY || *sig_alg == RSA_ENCRYPTION {
        let algorithm = match (key, *digest_alg) {
            (VerifyingKey::P256(_), OID_SHA256) => SignatureAlgorithm::EcdsaP256Sha256,
            (VerifyingKey::P384(_), OID_SHA384) => SignatureAlgorithm::EcdsaP384Sha384,
            (VerifyingKey::Rsa(_), OID_SHA256) => SignatureAlgorithm::RsaPkcs1Sha256,
            (VerifyingKey::Rsa(_), OID_SHA384) => SignatureAlgorithm::RsaPkcs1Sha384,
            _ => {
                return Err(Error::SignatureInvalid(format!(
                    "unsupported key/digest combination: {}",
                    digest_alg
                )))
            }
        };
        return Ok(algorithm);
    }

    Err(Error::SignatureInvalid(format!(
        "unsupported signature algorithm: {}",
        sig_alg
    )))
}
