//! OIDC identity extraction
//!
//! The leaf certificate carries the OIDC claims Fulcio bound at issuance:
//! the subject in the SAN, everything else in dedicated extensions. All
//! fields are optional; absent claims become empty strings in the result.

use crate::result::OidcIdentity;
use zkattest_crypto::ParsedCertificate;

/// Extract the OIDC identity from a parsed leaf certificate
pub fn extract_identity(leaf: &ParsedCertificate) -> OidcIdentity {
    OidcIdentity {
        issuer: leaf.fulcio.issuer.clone().unwrap_or_default(),
        subject: leaf.san_identity.clone().unwrap_or_default(),
        workflow_ref: leaf.fulcio.workflow_ref.clone().unwrap_or_default(),
        repository: leaf.fulcio.repository.clone().unwrap_or_default(),
        event_name: leaf.fulcio.event_name.clone().unwrap_or_default(),
    }
}
