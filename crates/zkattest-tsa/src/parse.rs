//! Timestamp token parsing
//!
//! Bundles carry the token either as a bare CMS ContentInfo or wrapped in a
//! full TimeStampResp; both forms are accepted.

use crate::asn1::{self, TimeStampResp, TstInfo};
use crate::error::{Error, Result};
use cms::cert::CertificateChoices;
use cms::content_info::ContentInfo;
use cms::signed_data::SignedData;
use const_oid::ObjectIdentifier;
use der::{Decode, Encode};

/// OID for CMS SignedData: 1.2.840.113549.1.7.2
const OID_SIGNED_DATA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.2");

/// A parsed timestamp token
#[derive(Debug, Clone)]
pub struct ParsedTimestamp {
    /// The decoded TSTInfo
    pub tst_info: TstInfo,
    /// The exact eContent bytes (the CMS signature message digest input)
    pub econtent_der: Vec<u8>,
    /// The CMS SignedData structure
    pub signed_data: SignedData,
    /// DER certificates embedded in the SignedData, if any
    pub embedded_certs: Vec<Vec<u8>>,
}

/// Parse an RFC 3161 timestamp token from DER bytes.
///
/// Accepts either a TimeStampResp (status + token) or a bare ContentInfo.
/// The encapsulated content type must be id-ct-TSTInfo.
pub fn parse_timestamp_token(token_der: &[u8]) -> Result<ParsedTimestamp> {
    let content_info = match TimeStampResp::from_der(token_der) {
        Ok(resp) => {
            if !resp.status.is_success() {
                return Err(Error::NotGranted(resp.status.status));
            }
            let token_any = resp.time_stamp_token.ok_or(Error::NoToken)?;
            let bytes = token_any
                .to_der()
                .map_err(|e| Error::ParseError(format!("failed to re-encode token: {}", e)))?;
            ContentInfo::from_der(&bytes)
                .map_err(|e| Error::ParseError(format!("failed to decode ContentInfo: {}", e)))?
        }
        Err(_) => ContentInfo::from_der(token_der)
            .map_err(|e| Error::ParseError(format!("failed to decode timestamp token: {}", e)))?,
    };

    if content_info.content_type != OID_SIGNED_DATA {
        return Err(Error::ParseError(
            "ContentInfo content type is not SignedData".to_string(),
        ));
    }

    let signed_data_der = content_info
        .content
        .to_der()
        .map_err(|e| Error::ParseError(format!("failed to encode SignedData content: {}", e)))?;
    let signed_data = SignedData::from_der(&signed_data_der)
        .map_err(|e| Error::ParseError(format!("failed to decode SignedData: {}", e)))?;

    if signed_data.encap_content_info.econtent_type != asn1::OID_TST_INFO {
        return Err(Error::ParseError(
            "encapsulated content type is not TSTInfo".to_string(),
        ));
    }

    let econtent = signed_data
        .encap_content_info
        .econtent
        .as_ref()
        .ok_or(Error::NoTstInfo)?;
    let econtent_der = econtent.value().to_vec();

    let tst_info = TstInfo::from_der_bytes(&econtent_der)
        .map_err(|e| Error::ParseError(format!("failed to decode TSTInfo: {}", e)))?;

    let embedded_certs = extract_certificates(&signed_data);

    Ok(ParsedTimestamp {
        tst_info,
        econtent_der,
        signed_data,
        embedded_certs,
    })
}

/// Extract DER certificates embedded in the SignedData
fn extract_certificates(signed_data: &SignedData) -> Vec<Vec<u8>> {
    let mut certificates = Vec::new();

    if let Some(cert_set) = &signed_data.certificates {
        for cert_choice in cert_set.0.iter() {
            match cert_choice {
                CertificateChoices::Certificate(cert) => {
                    if let Ok(der) = cert.to_der() {
                        certificates.push(der);
                    }
                }
                CertificateChoices::Other(_) => {
                    tracing::debug!("skipping non-standard certificate format in SignedData");
                }
            }
        }
    }

    certificates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_rejected() {
        assert!(parse_timestamp_token(b"not a token").is_err());
    }

    #[test]
    fn test_rejected_status() {
        // TimeStampResp { status: { status: 2 } } with no token
        let resp = TimeStampResp {
            status: crate::asn1::PkiStatusInfo {
                status: 2,
                fail_info: None,
            },
            time_stamp_token: None,
        };
        let der_bytes = resp.to_der().unwrap();
        assert!(matches!(
            parse_timestamp_token(&der_bytes),
            Err(Error::NotGranted(2))
        ));
    }
}
