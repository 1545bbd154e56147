//! secp256k1 field/curve arithmetic, ECDSA and the key types built on top of
//! them (§4.2). Grounded on `core/src/core/target.rs`'s use of `BigUint` for
//! big-integer domain types, generalized here to the full curve.

pub mod ecdsa;
pub mod field;
pub mod point;
pub mod privkey;
pub mod rfc6979;
pub mod sec;
pub mod signature;

pub use ecdsa::{sign, verify};
pub use field::FieldElement;
pub use point::Point;
pub use privkey::PrivateKey;
pub use signature::Signature;
