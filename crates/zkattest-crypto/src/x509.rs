//! X.509 certificate parsing
//!
//! Parses DER certificates into the pieces the verifier needs: the exact TBS
//! byte slice (signatures are computed over the pre-hash TBS, so the parsed
//! form alone is not enough), the SPKI, validity as Unix seconds, and the
//! Fulcio identity extensions.

use crate::error::{Error, Result};
use crate::verification::{SignatureAlgorithm, VerifyingKey};
use const_oid::db::rfc5280::{
    ID_CE_AUTHORITY_KEY_IDENTIFIER, ID_CE_BASIC_CONSTRAINTS, ID_CE_CERTIFICATE_POLICIES,
    ID_CE_EXT_KEY_USAGE, ID_CE_KEY_USAGE, ID_CE_SUBJECT_ALT_NAME, ID_CE_SUBJECT_KEY_IDENTIFIER,
};
use const_oid::ObjectIdentifier;
use der::asn1::Utf8StringRef;
use x509_cert::der::{Decode, Encode};
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::pkix::{ExtendedKeyUsage, SubjectAltName, SubjectKeyIdentifier};
use x509_cert::Certificate;

/// Maximum accepted certificate size in bytes (32 KiB)
pub const MAX_CERT_BYTES: usize = 32 * 1024;

/// Embedded SCT list extension: 1.3.6.1.4.1.11129.2.4.2
const OID_SCT_LIST: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.4.1.11129.2.4.2");

// Fulcio identity extensions (1.3.6.1.4.1.57264.1.x). The v1 OIDs carry raw
// string bytes; v2 OIDs wrap a DER UTF8String.
const OID_FULCIO_ISSUER_V1: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.57264.1.1");
const OID_FULCIO_TRIGGER: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.4.1.57264.1.2");
const OID_FULCIO_REPOSITORY_LEGACY: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.57264.1.5");
const OID_FULCIO_WORKFLOW_REF_LEGACY: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.57264.1.6");
const OID_FULCIO_ISSUER_V2: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.57264.1.8");
const OID_FULCIO_SOURCE_REPOSITORY_URI: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.57264.1.12");
const OID_FULCIO_SOURCE_REPOSITORY_REF: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.57264.1.14");

/// OIDC claims carried in Fulcio certificate extensions
///
/// Values are taken from the v2 OIDs when present, falling back to the
/// legacy OIDs Fulcio emitted before the 57264.1.8+ range existed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FulcioClaims {
    /// OIDC issuer URL
    pub issuer: Option<String>,
    /// Source repository URL
    pub repository: Option<String>,
    /// Workflow file at a git ref
    pub workflow_ref: Option<String>,
    /// Trigger event name
    pub event_name: Option<String>,
}

/// A certificate parsed into the fields verification needs
#[derive(Debug, Clone)]
pub struct ParsedCertificate {
    /// The full DER encoding (hash input for chain digests)
    pub der: Vec<u8>,
    /// The exact TBSCertificate DER (signature message)
    pub tbs_der: Vec<u8>,
    /// Signature bytes from the certificate
    pub signature: Vec<u8>,
    /// Signature algorithm OID
    pub signature_algorithm: ObjectIdentifier,
    /// SubjectPublicKeyInfo DER
    pub spki_der: Vec<u8>,
    /// Validity start (Unix seconds)
    pub not_before: i64,
    /// Validity end (Unix seconds)
    pub not_after: i64,
    /// Serial number bytes (CMS signer matching)
    pub serial_number: Vec<u8>,
    /// SubjectKeyIdentifier extension value, if present
    pub subject_key_id: Option<Vec<u8>>,
    /// Identity from the SAN extension (URI preferred over email)
    pub san_identity: Option<String>,
    /// Fulcio OIDC claims
    pub fulcio: FulcioClaims,
    /// Extended key usage OIDs
    pub eku: Vec<ObjectIdentifier>,
    subject_der: Vec<u8>,
    issuer_der: Vec<u8>,
}

impl ParsedCertificate {
    /// True when issuer and subject are byte-identical
    pub fn is_self_issued(&self) -> bool {
        self.subject_der == self.issuer_der
    }

    /// DER encoding of the subject name
    pub fn subject_der(&self) -> &[u8] {
        &self.subject_der
    }

    /// DER encoding of the issuer name
    pub fn issuer_der(&self) -> &[u8] {
        &self.issuer_der
    }

    /// The certificate's public key
    pub fn public_key(&self) -> Result<VerifyingKey> {
        VerifyingKey::from_spki_der(&self.spki_der)
    }

    /// True when the EKU extension contains `oid`
    pub fn has_eku(&self, oid: &ObjectIdentifier) -> bool {
        self.eku.iter().any(|e| e == oid)
    }

    /// Verify this certificate's signature using the issuer's key
    pub fn verify_signed_by(&self, issuer_key: &VerifyingKey) -> Result<()> {
        let algorithm = SignatureAlgorithm::from_oid(&self.signature_algorithm)?;
        issuer_key.verify(algorithm, &self.tbs_der, &self.signature)
    }
}

/// Parse a DER-encoded certificate
pub fn parse_certificate(cert_der: &[u8]) -> Result<ParsedCertificate> {
    if cert_der.len() > MAX_CERT_BYTES {
        return Err(Error::InvalidCertificate(format!(
            "certificate is {} bytes, maximum is {}",
            cert_der.len(),
            MAX_CERT_BYTES
        )));
    }

    let cert = Certificate::from_der(cert_der)
        .map_err(|e| Error::InvalidCertificate(format!("failed to parse certificate: {}", e)))?;

    let tbs = &cert.tbs_certificate;

    let tbs_der = tbs
        .to_der()
        .map_err(|e| Error::Der(format!("failed to encode TBS: {}", e)))?;

    let signature = cert
        .signature
        .as_bytes()
        .ok_or_else(|| Error::InvalidCertificate("signature has unused bits".to_string()))?
        .to_vec();

    let spki_der = tbs
        .subject_public_key_info
        .to_der()
        .map_err(|e| Error::Der(format!("failed to encode SPKI: {}", e)))?;

    let not_before = tbs.validity.not_before.to_unix_duration().as_secs() as i64;
    let not_after = tbs.validity.not_after.to_unix_duration().as_secs() as i64;

    let subject_der = tbs
        .subject
        .to_der()
        .map_err(|e| Error::Der(format!("failed to encode subject: {}", e)))?;
    let issuer_der = tbs
        .issuer
        .to_der()
        .map_err(|e| Error::Der(format!("failed to encode issuer: {}", e)))?;

    screen_critical_extensions(&cert)?;

    let san_identity = extract_san_identity(&cert)?;
    let fulcio = extract_fulcio_claims(&cert)?;
    let eku = extract_eku(&cert)?;
    let subject_key_id = extract_subject_key_id(&cert)?;

    Ok(ParsedCertificate {
        der: cert_der.to_vec(),
        tbs_der,
        signature,
        signature_algorithm: cert.signature_algorithm.oid,
        spki_der,
        not_before,
        not_after,
        serial_number: tbs.serial_number.as_bytes().to_vec(),
        subject_key_id,
        san_identity,
        fulcio,
        eku,
        subject_der,
        issuer_der,
    })
}

/// Reject certificates with critical extensions we do not understand.
///
/// RFC 5280 requires rejection of any unprocessed critical extension.
/// Non-critical unknowns are ignored.
fn screen_critical_extensions(cert: &Certificate) -> Result<()> {
    let Some(extensions) = &cert.tbs_certificate.extensions else {
        return Ok(());
    };

    for ext in extensions.iter() {
        if !ext.critical {
            continue;
        }
        let known = ext.extn_id == ID_CE_SUBJECT_ALT_NAME
            || ext.extn_id == ID_CE_EXT_KEY_USAGE
            || ext.extn_id == ID_CE_KEY_USAGE
            || ext.extn_id == ID_CE_BASIC_CONSTRAINTS
            || ext.extn_id == ID_CE_SUBJECT_KEY_IDENTIFIER
            || ext.extn_id == ID_CE_AUTHORITY_KEY_IDENTIFIER
            || ext.extn_id == ID_CE_CERTIFICATE_POLICIES
            || ext.extn_id == OID_SCT_LIST;
        if !known {
            return Err(Error::UnsupportedCriticalExtension(ext.extn_id.to_string()));
        }
    }

    Ok(())
}

/// Extract the identity from the Subject Alternative Name extension.
///
/// Fulcio places the OIDC subject here; URI entries take precedence over
/// RFC 822 names.
fn extract_san_identity(cert: &Certificate) -> Result<Option<String>> {
    let san_opt: Option<(bool, SubjectAltName)> = cert
        .tbs_certificate
        .get()
        .map_err(|e| Error::InvalidCertificate(format!("failed to get SAN extension: {}", e)))?;

    let Some((_critical, san)) = san_opt else {
        return Ok(None);
    };

    let mut email = None;
    for name in san.0.iter() {
        match name {
            GeneralName::UniformResourceIdentifier(uri) => {
                return Ok(Some(uri.to_string()));
            }
            GeneralName::Rfc822Name(addr) => {
                if email.is_none() {
                    email = Some(addr.to_string());
                }
            }
            _ => continue,
        }
    }

    Ok(email)
}

/// Extract the OIDC claims from Fulcio extensions, preferring the v2 OIDs
fn extract_fulcio_claims(cert: &Certificate) -> Result<FulcioClaims> {
    let mut claims = FulcioClaims::default();
    let Some(extensions) = &cert.tbs_certificate.extensions else {
        return Ok(claims);
    };

    let mut issuer_v1 = None;
    let mut repository_legacy = None;
    let mut workflow_ref_legacy = None;

    for ext in extensions.iter() {
        let value = ext.extn_value.as_bytes();
        if ext.extn_id == OID_FULCIO_ISSUER_V2 {
            claims.issuer = decode_extension_string(value);
        } else if ext.extn_id == OID_FULCIO_ISSUER_V1 {
            issuer_v1 = decode_extension_string(value);
        } else if ext.extn_id == OID_FULCIO_SOURCE_REPOSITORY_URI {
            claims.repository = decode_extension_string(value);
        } else if ext.extn_id == OID_FULCIO_REPOSITORY_LEGACY {
            repository_legacy = decode_extension_string(value);
        } else if ext.extn_id == OID_FULCIO_SOURCE_REPOSITORY_REF {
            claims.workflow_ref = decode_extension_string(value);
        } else if ext.extn_id == OID_FULCIO_WORKFLOW_REF_LEGACY {
            workflow_ref_legacy = decode_extension_string(value);
        } else if ext.extn_id == OID_FULCIO_TRIGGER {
            claims.event_name = decode_extension_string(value);
        }
    }

    if claims.issuer.is_none() {
        claims.issuer = issuer_v1;
    }
    if claims.repository.is_none() {
        claims.repository = repository_legacy;
    }
    if claims.workflow_ref.is_none() {
        claims.workflow_ref = workflow_ref_legacy;
    }

    Ok(claims)
}

/// Decode an extension value as a DER UTF8String, falling back to the raw
/// bytes (the legacy Fulcio OIDs are unwrapped strings).
fn decode_extension_string(value: &[u8]) -> Option<String> {
    if let Ok(s) = Utf8StringRef::from_der(value) {
        return Some(s.to_string());
    }
    match std::str::from_utf8(value) {
        Ok(s) if !s.is_empty() => Some(s.to_string()),
        _ => None,
    }
}

fn extract_eku(cert: &Certificate) -> Result<Vec<ObjectIdentifier>> {
    let eku_opt: Option<(bool, ExtendedKeyUsage)> = cert
        .tbs_certificate
        .get()
        .map_err(|e| Error::InvalidCertificate(format!("failed to get EKU extension: {}", e)))?;

    Ok(eku_opt.map(|(_, eku)| eku.0).unwrap_or_default())
}

fn extract_subject_key_id(cert: &Certificate) -> Result<Option<Vec<u8>>> {
    let ski_opt: Option<(bool, SubjectKeyIdentifier)> = cert
        .tbs_certificate
        .get()
        .map_err(|e| Error::InvalidCertificate(format!("failed to get SKI extension: {}", e)))?;

    Ok(ski_opt.map(|(_, ski)| ski.0.as_bytes().to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_garbage_rejected() {
        assert!(matches!(
            parse_certificate(b"definitely not DER"),
            Err(Error::InvalidCertificate(_))
        ));
    }

    #[test]
    fn test_size_cap() {
        let huge = vec![0u8; MAX_CERT_BYTES + 1];
        let err = parse_certificate(&huge).unwrap_err();
        assert!(err.to_string().contains("maximum"));
    }

    #[test]
    fn test_decode_extension_string() {
        // DER UTF8String "hi"
        assert_eq!(
            decode_extension_string(&[0x0C, 0x02, b'h', b'i']),
            Some("hi".to_string())
        );
        // raw legacy value
        assert_eq!(decode_extension_string(b"push"), Some("push".to_string()));
        assert_eq!(decode_extension_string(b""), None);
    }
}
