//! Merkle tree construction and BIP37 partial-tree verification (§4.6).

pub mod merkleblock;
pub mod tree;

pub use merkleblock::MerkleBlock;
pub use tree::{merkle_parent, parent_level, root, MerkleTree};
