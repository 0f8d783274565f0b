//! Merkle tree hashing
//!
//! RFC 6962 hashing with domain separation: 0x00 prefixes leaves, 0x01
//! prefixes internal nodes. SHA-256 throughout.

use sha2::{Digest, Sha256};

/// Prefix for leaf nodes
pub const LEAF_HASH_PREFIX: u8 = 0x00;

/// Prefix for internal nodes
pub const NODE_HASH_PREFIX: u8 = 0x01;

/// Hash size in bytes (SHA-256)
pub const HASH_SIZE: usize = 32;

/// Hash a leaf node
///
/// Returns: SHA256(0x00 || leaf_data)
pub fn hash_leaf(data: &[u8]) -> [u8; HASH_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_HASH_PREFIX]);
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash two child nodes into their parent
///
/// Returns: SHA256(0x01 || left || right)
pub fn hash_children(left: &[u8; HASH_SIZE], right: &[u8; HASH_SIZE]) -> [u8; HASH_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update([NODE_HASH_PREFIX]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Position of the most significant set bit
pub fn bit_length(n: u64) -> u32 {
    if n == 0 {
        0
    } else {
        64 - n.leading_zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_leaf_domain_separation() {
        let data = b"test data";
        let leaf = hash_leaf(data);

        let raw: [u8; 32] = Sha256::digest(data).into();
        assert_ne!(leaf, raw);
    }

    #[test]
    fn test_hash_children_order_matters() {
        let left = [0u8; 32];
        let right = [1u8; 32];
        assert_ne!(hash_children(&left, &right), hash_children(&right, &left));
    }

    #[test]
    fn test_empty_leaf() {
        // RFC 6962 test vector: SHA256(0x00)
        assert_eq!(
            hex::encode(hash_leaf(b"")),
            "6e340b9cffb37a989ca544e6bb780a2c78901d3fb33738768511a30617afa01d"
        );
    }

    #[test]
    fn test_bit_length() {
        assert_eq!(bit_length(0), 0);
        assert_eq!(bit_length(1), 1);
        assert_eq!(bit_length(2), 2);
        assert_eq!(bit_length(3), 2);
        assert_eq!(bit_length(4), 3);
        assert_eq!(bit_length(255), 8);
        assert_eq!(bit_length(256), 9);
    }
}
