//! `btcspv_core`: secp256k1/ECDSA, Script, Transaction, Block/PoW, Merkle
//! and BloomFilter primitives for an SPV Bitcoin client.
//!
//! Layout follows the teacher workspace's `core` crate: a leaf `encoding`
//! module, then the domain modules (`secp`, `script`, `transaction`,
//! `block`, `merkle`, `bloom`), plumbed together by the shared `error`
//! taxonomy and `params::ChainParams`.

pub mod block;
pub mod bloom;
pub mod encoding;
pub mod error;
pub mod merkle;
pub mod params;
pub mod script;
pub mod secp;
pub mod transaction;

pub use error::{Error, ErrorKind, Result};
pub use params::{ChainParams, Network};
