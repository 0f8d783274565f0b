//! Signature verification
//!
//! Supports the algorithm pairs accepted by the verifier: ECDSA P-256 with
//! SHA-256 and ECDSA P-384 with SHA-384 (DSSE and certificate signatures),
//! plus RSA PKCS#1 v1.5 with SHA-256/SHA-384 (RFC 3161 countersignatures
//! only). ECDSA signatures are rejected when `s` is above the half order.

use crate::error::{Error, Result};
use const_oid::db::rfc5912::{
    ECDSA_WITH_SHA_256, ECDSA_WITH_SHA_384, ID_EC_PUBLIC_KEY, RSA_ENCRYPTION, SECP_256_R_1,
    SECP_384_R_1, SHA_256_WITH_RSA_ENCRYPTION, SHA_384_WITH_RSA_ENCRYPTION,
};
use const_oid::ObjectIdentifier;
use rsa::pkcs8::DecodePublicKey;
use sha2::{Sha256, Sha384};
use signature::Verifier;
use spki::SubjectPublicKeyInfoRef;

/// A signature algorithm identified by its X.509 OID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// ecdsa-with-SHA256 over P-256
    EcdsaP256Sha256,
    /// ecdsa-with-SHA384 over P-384
    EcdsaP384Sha384,
    /// sha256WithRSAEncryption
    RsaPkcs1Sha256,
    /// sha384WithRSAEncryption
    RsaPkcs1Sha384,
}

impl SignatureAlgorithm {
    /// Resolve a signature algorithm OID to a supported pair.
    ///
    /// The curve half of ECDSA pairs is fixed by the key, checked in
    /// [`VerifyingKey::verify`].
    pub fn from_oid(oid: &ObjectIdentifier) -> Result<Self> {
        match *oid {
            ECDSA_WITH_SHA_256 => Ok(SignatureAlgorithm::EcdsaP256Sha256),
            ECDSA_WITH_SHA_384 => Ok(SignatureAlgorithm::EcdsaP384Sha384),
            SHA_256_WITH_RSA_ENCRYPTION => Ok(SignatureAlgorithm::RsaPkcs1Sha256),
            SHA_384_WITH_RSA_ENCRYPTION => Ok(SignatureAlgorithm::RsaPkcs1Sha384),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// A public key parsed from SubjectPublicKeyInfo
#[derive(Debug, Clone)]
pub enum VerifyingKey {
    /// ECDSA over NIST P-256
    P256(p256::ecdsa::VerifyingKey),
    /// ECDSA over NIST P-384
    P384(p384::ecdsa::VerifyingKey),
    /// RSA (PKCS#1 v1.5)
    Rsa(rsa::RsaPublicKey),
}

impl VerifyingKey {
    /// Parse a verification key from DER-encoded SPKI bytes.
    ///
    /// The curve is detected from the algorithm parameters; unknown curves
    /// and key types are rejected rather than defaulted.
    pub fn from_spki_der(spki_der: &[u8]) -> Result<Self> {
        let spki = SubjectPublicKeyInfoRef::try_from(spki_der)
            .map_err(|e| Error::InvalidKey(format!("invalid SPKI: {}", e)))?;

        let alg_oid = spki.algorithm.oid;

        if alg_oid == ID_EC_PUBLIC_KEY {
            let curve_oid = spki
                .algorithm
                .parameters_oid()
                .map_err(|e| Error::InvalidKey(format!("invalid EC curve OID: {}", e)))?;

            let point = spki
                .subject_public_key
                .as_bytes()
                .ok_or_else(|| Error::InvalidKey("EC public key has unused bits".to_string()))?;

            if curve_oid == SECP_256_R_1 {
                let key = p256::ecdsa::VerifyingKey::from_sec1_bytes(point)
                    .map_err(|e| Error::InvalidKey(format!("invalid P-256 point: {}", e)))?;
                Ok(VerifyingKey::P256(key))
            } else if curve_oid == SECP_384_R_1 {
                let key = p384::ecdsa::VerifyingKey::from_sec1_bytes(point)
                    .map_err(|e| Error::InvalidKey(format!("invalid P-384 point: {}", e)))?;
                Ok(VerifyingKey::P384(key))
            } else {
                Err(Error::UnsupportedAlgorithm(format!(
                    "EC curve: {}",
                    curve_oid
                )))
            }
        } else if alg_oid == RSA_ENCRYPTION {
            let key = rsa::RsaPublicKey::from_public_key_der(spki_der)
                .map_err(|e| Error::InvalidKey(format!("invalid RSA key: {}", e)))?;
            Ok(VerifyingKey::Rsa(key))
        } else {
            Err(Error::UnsupportedAlgorithm(alg_oid.to_string()))
        }
    }

    /// The algorithm pair this key uses for DSSE signatures.
    ///
    /// DSSE carries no algorithm identifier; the hash is fixed by the key's
    /// curve. RSA keys are not accepted for DSSE.
    pub fn dsse_algorithm(&self) -> Result<SignatureAlgorithm> {
        match self {
            VerifyingKey::P256(_) => Ok(SignatureAlgorithm::EcdsaP256Sha256),
            VerifyingKey::P384(_) => Ok(SignatureAlgorithm::EcdsaP384Sha384),
            VerifyingKey::Rsa(_) => Err(Error::UnsupportedAlgorithm(
                "RSA keys are not accepted for DSSE envelopes".to_string(),
            )),
        }
    }

    /// Verify a signature over `message` with the given algorithm pair.
    ///
    /// ECDSA signatures are DER-encoded (r, s); RSA signatures are PKCS#1
    /// v1.5 blocks. Algorithm/key mismatches are rejected.
    pub fn verify(
        &self,
        algorithm: SignatureAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<()> {
        match (self, algorithm) {
            (VerifyingKey::P256(key), SignatureAlgorithm::EcdsaP256Sha256) => {
                let sig = p256::ecdsa::Signature::from_der(signature)
                    .map_err(|e| Error::Der(format!("invalid ECDSA signature: {}", e)))?;
                // s above n/2 has an equivalent mirrored signature
                if sig.normalize_s().is_some() {
                    return Err(Error::MalleableSignature);
                }
                key.verify(message, &sig)
                    .map_err(|_| Error::Verification("ECDSA P-256 signature invalid".to_string()))
            }
            (VerifyingKey::P384(key), SignatureAlgorithm::EcdsaP384Sha384) => {
                let sig = p384::ecdsa::Signature::from_der(signature)
                    .map_err(|e| Error::Der(format!("invalid ECDSA signature: {}", e)))?;
                if sig.normalize_s().is_some() {
                    return Err(Error::MalleableSignature);
                }
                key.verify(message, &sig)
                    .map_err(|_| Error::Verification("ECDSA P-384 signature invalid".to_string()))
            }
            (VerifyingKey::Rsa(key), SignatureAlgorithm::RsaPkcs1Sha256) => {
                let vk = rsa::pkcs1v15::VerifyingKey::<Sha256>::new(key.clone());
                let sig = rsa::pkcs1v15::Signature::try_from(signature)
                    .map_err(|e| Error::Der(format!("invalid RSA signature: {}", e)))?;
                vk.verify(message, &sig)
                    .map_err(|_| Error::Verification("RSA SHA-256 signature invalid".to_string()))
            }
            (VerifyingKey::Rsa(key), SignatureAlgorithm::RsaPkcs1Sha384) => {
                let vk = rsa::pkcs1v15::VerifyingKey::<Sha384>::new(key.clone());
                let sig = rsa::pkcs1v15::Signature::try_from(signature)
                    .map_err(|e| Error::Der(format!("invalid RSA signature: {}", e)))?;
                vk.verify(message, &sig)
                    .map_err(|_| Error::Verification("RSA SHA-384 signature invalid".to_string()))
            }
            (key, algorithm) => Err(Error::UnsupportedAlgorithm(format!(
                "key type {} does not match algorithm {:?}",
                match key {
                    VerifyingKey::P256(_) => "P-256",
                    VerifyingKey::P384(_) => "P-384",
                    VerifyingKey::Rsa(_) => "RSA",
                },
                algorithm
            ))),
        }
    }

    /// Verify a DSSE signature, selecting the algorithm pair from the key.
    pub fn verify_dsse(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        self.verify(self.dsse_algorithm()?, message, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::signature::Signer;
    use p256::pkcs8::EncodePublicKey;

    fn test_key() -> (p256::ecdsa::SigningKey, Vec<u8>) {
        let sk = p256::ecdsa::SigningKey::from_slice(&[0x5A; 32]).unwrap();
        let spki = sk
            .verifying_key()
            .to_public_key_der()
            .unwrap()
            .into_vec();
        (sk, spki)
    }

    #[test]
    fn test_verify_ecdsa_p256() {
        let (sk, spki) = test_key();
        let msg = b"test data";
        let sig: p256::ecdsa::Signature = sk.sign(msg);
        let sig = sig.normalize_s().unwrap_or(sig);

        let key = VerifyingKey::from_spki_der(&spki).unwrap();
        assert!(key
            .verify(SignatureAlgorithm::EcdsaP256Sha256, msg, sig.to_der().as_bytes())
            .is_ok());
    }

    #[test]
    fn test_verify_wrong_message() {
        let (sk, spki) = test_key();
        let sig: p256::ecdsa::Signature = sk.sign(b"test data");
        let sig = sig.normalize_s().unwrap_or(sig);

        let key = VerifyingKey::from_spki_der(&spki).unwrap();
        assert!(matches!(
            key.verify(
                SignatureAlgorithm::EcdsaP256Sha256,
                b"other data",
                sig.to_der().as_bytes()
            ),
            Err(Error::Verification(_))
        ));
    }

    #[test]
    fn test_high_s_rejected() {
        let (sk, spki) = test_key();
        let msg = b"test data";
        let sig: p256::ecdsa::Signature = sk.sign(msg);
        let low = sig.normalize_s().unwrap_or(sig);

        // mirror s into the upper half of the order
        let r: p256::Scalar = *low.r();
        let neg_s: p256::Scalar = -*low.s();
        let high = p256::ecdsa::Signature::from_scalars(r, neg_s).unwrap();

        let key = VerifyingKey::from_spki_der(&spki).unwrap();
        assert!(matches!(
            key.verify(
                SignatureAlgorithm::EcdsaP256Sha256,
                msg,
                high.to_der().as_bytes()
            ),
            Err(Error::MalleableSignature)
        ));
    }

    #[test]
    fn test_algorithm_key_mismatch() {
        let (_, spki) = test_key();
        let key = VerifyingKey::from_spki_der(&spki).unwrap();
        assert!(matches!(
            key.verify(SignatureAlgorithm::EcdsaP384Sha384, b"m", b"sig"),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_dsse_algorithm_from_key() {
        let (_, spki) = test_key();
        let key = VerifyingKey::from_spki_der(&spki).unwrap();
        assert_eq!(
            key.dsse_algorithm().unwrap(),
            SignatureAlgorithm::EcdsaP256Sha256
        );
    }

    #[test]
    fn test_from_spki_garbage() {
        assert!(VerifyingKey::from_spki_der(b"not a key").is_err());
    }
}
