//! Inclusion proof verification
//!
//! Follows the RFC 6962 algorithm as implemented by the sigstore-go and
//! sigstore-python reference verifiers, including the strict proof-length
//! precheck: a proof with the wrong number of sibling hashes is rejected
//! before any hashing.

use crate::error::{Error, Result};
use crate::tree::{bit_length, hash_children, HASH_SIZE};

/// Verify an inclusion proof for a leaf in a Merkle tree
///
/// # Arguments
/// * `leaf_hash` - The RFC 6962 hash of the leaf entry
/// * `leaf_index` - Index of the leaf in the tree (0-based)
/// * `tree_size` - Total number of leaves in the tree
/// * `proof_hashes` - The sibling hashes on the path to the root
/// * `expected_root` - The root hash to verify against
pub fn verify_inclusion_proof(
    leaf_hash: &[u8; HASH_SIZE],
    leaf_index: u64,
    tree_size: u64,
    proof_hashes: &[[u8; HASH_SIZE]],
    expected_root: &[u8; HASH_SIZE],
) -> Result<()> {
    if tree_size == 0 {
        return Err(Error::InvalidTreeSize(
            "tree size cannot be zero".to_string(),
        ));
    }

    if leaf_index >= tree_size {
        return Err(Error::InvalidLeafIndex(format!(
            "leaf index {} >= tree size {}",
            leaf_index, tree_size
        )));
    }

    // The proof length is fully determined by (leaf_index, tree_size);
    // anything else cannot reconstruct the root honestly.
    let expected_len = expected_proof_len(leaf_index, tree_size);
    if proof_hashes.len() != expected_len {
        return Err(Error::InvalidProof(format!(
            "expected {} proof hashes for index {} in tree of size {}, got {}",
            expected_len,
            leaf_index,
            tree_size,
            proof_hashes.len()
        )));
    }

    // Walk from the leaf to the root. When the current node is a right child
    // (odd index) or the rightmost node of an incomplete subtree, the sibling
    // goes on the left.
    let mut hash = *leaf_hash;
    let mut index = leaf_index;
    let mut last_node = tree_size - 1;

    for proof_hash in proof_hashes {
        if index % 2 == 1 || index == last_node {
            hash = hash_children(proof_hash, &hash);
        } else {
            hash = hash_children(&hash, proof_hash);
        }
        index /= 2;
        last_node /= 2;
    }

    if hash != *expected_root {
        return Err(Error::HashMismatch {
            expected: hex::encode(expected_root),
            actual: hex::encode(hash),
        });
    }

    Ok(())
}

/// Number of sibling hashes required for a leaf at `index` in a tree of
/// `tree_size` leaves: the inner path below the split point plus one border
/// hash per set bit above it.
fn expected_proof_len(index: u64, tree_size: u64) -> usize {
    let inner = inner_proof_size(index, tree_size);
    let border = (index >> inner).count_ones() as usize;
    inner + border
}

fn inner_proof_size(index: u64, tree_size: u64) -> usize {
    bit_length(index ^ (tree_size - 1)) as usize
}
