//! Hashing helpers

use sha2::{Digest, Sha256, Sha384};

/// Hash data using SHA-256
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Hash data using SHA-384
pub fn sha384(data: &[u8]) -> [u8; 48] {
    Sha384::digest(data).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let hash = sha256(b"hello");
        let expected =
            hex::decode("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")
                .unwrap();
        assert_eq!(&hash[..], &expected[..]);
    }

    #[test]
    fn test_sha384_length() {
        assert_eq!(sha384(b"hello").len(), 48);
    }
}
