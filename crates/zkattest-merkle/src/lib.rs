//! RFC 6962 Merkle tree verification
//!
//! Implements the leaf/node hashing and inclusion-proof verification used by
//! the Rekor transparency log.

pub mod error;
pub mod proof;
pub mod tree;

pub use error::{Error, Result};
pub use proof::verify_inclusion_proof;
pub use tree::{hash_children, hash_leaf, HASH_SIZE, LEAF_HASH_PREFIX, NODE_HASH_PREFIX};
