//! RFC 6962 conformance tests
//!
//! Builds small Merkle trees over known leaves and checks that every leaf's
//! inclusion proof verifies, and that corrupted proofs are rejected.

use zkattest_merkle::{hash_children, hash_leaf, verify_inclusion_proof, HASH_SIZE};

/// Compute the RFC 6962 Merkle tree hash of a range of leaves
fn mth(leaves: &[Vec<u8>]) -> [u8; HASH_SIZE] {
    match leaves.len() {
        0 => panic!("empty tree"),
        1 => hash_leaf(&leaves[0]),
        n => {
            // split at the largest power of two less than n
            let k = 1usize << (usize::BITS - 1 - (n - 1).leading_zeros());
            let left = mth(&leaves[..k]);
            let right = mth(&leaves[k..]);
            hash_children(&left, &right)
        }
    }
}

/// Build the inclusion proof for `index` over the given leaves
fn build_proof(index: usize, leaves: &[Vec<u8>]) -> Vec<[u8; HASH_SIZE]> {
    let n = leaves.len();
    if n == 1 {
        return Vec::new();
    }
    let k = 1usize << (usize::BITS - 1 - (n - 1).leading_zeros());
    if index < k {
        let mut proof = build_proof(index, &leaves[..k]);
        proof.push(mth(&leaves[k..]));
        proof
    } else {
        let mut proof = build_proof(index - k, &leaves[k..]);
        proof.push(mth(&leaves[..k]));
        proof
    }
}

fn leaves(n: usize) -> Vec<Vec<u8>> {
    (0..n).map(|i| format!("leaf-{}", i).into_bytes()).collect()
}

#[test]
fn all_proofs_verify_for_small_trees() {
    for n in 1..=8 {
        let leaves = leaves(n);
        let root = mth(&leaves);
        for i in 0..n {
            let proof = build_proof(i, &leaves);
            let leaf_hash = hash_leaf(&leaves[i]);
            verify_inclusion_proof(&leaf_hash, i as u64, n as u64, &proof, &root)
                .unwrap_or_else(|e| panic!("leaf {} of {} failed: {}", i, n, e));
        }
    }
}

#[test]
fn corrupted_sibling_is_rejected() {
    let leaves = leaves(7);
    let root = mth(&leaves);
    let mut proof = build_proof(3, &leaves);
    proof[0][0] ^= 0x01;

    let leaf_hash = hash_leaf(&leaves[3]);
    assert!(verify_inclusion_proof(&leaf_hash, 3, 7, &proof, &root).is_err());
}

#[test]
fn corrupted_root_is_rejected() {
    let leaves = leaves(5);
    let mut root = mth(&leaves);
    root[31] ^= 0x80;

    let proof = build_proof(2, &leaves);
    let leaf_hash = hash_leaf(&leaves[2]);
    assert!(verify_inclusion_proof(&leaf_hash, 2, 5, &proof, &root).is_err());
}

#[test]
fn wrong_leaf_is_rejected() {
    let leaves = leaves(4);
    let root = mth(&leaves);
    let proof = build_proof(1, &leaves);

    let wrong = hash_leaf(b"not-the-leaf");
    assert!(verify_inclusion_proof(&wrong, 1, 4, &proof, &root).is_err());
}
