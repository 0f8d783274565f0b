//! Hash algorithm identifiers

use serde::{Deserialize, Serialize};

/// Hash algorithms appearing in bundle and trust-root material
///
/// Wire names follow the Sigstore protobuf enum spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// SHA2-256
    #[serde(rename = "SHA2_256")]
    Sha2256,
    /// SHA2-384
    #[serde(rename = "SHA2_384")]
    Sha2384,
    /// SHA2-512
    #[serde(rename = "SHA2_512")]
    Sha2512,
}

impl HashAlgorithm {
    /// Digest length in bytes
    pub fn digest_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha2256 => 32,
            HashAlgorithm::Sha2384 => 48,
            HashAlgorithm::Sha2512 => 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let alg: HashAlgorithm = serde_json::from_str("\"SHA2_256\"").unwrap();
        assert_eq!(alg, HashAlgorithm::Sha2256);
        assert_eq!(serde_json::to_string(&HashAlgorithm::Sha2384).unwrap(), "\"SHA2_384\"");
    }

    #[test]
    fn test_digest_len() {
        assert_eq!(HashAlgorithm::Sha2256.digest_len(), 32);
        assert_eq!(HashAlgorithm::Sha2384.digest_len(), 48);
        assert_eq!(HashAlgorithm::Sha2512.digest_len(), 64);
    }
}
