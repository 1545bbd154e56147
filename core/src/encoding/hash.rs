//! Primary hash functions used throughout the protocol: `hash256` (double
//! SHA-256) and `hash160` (SHA-256 then RIPEMD-160).
//!
//! Grounded on `core/src/core/hash.rs`'s `Hash` newtype: a fixed-size byte
//! array with hex `Display`, plus a `Hashed` trait for types that derive
//! their identity from `hash256` of their own serialization.

use std::fmt;

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// A 32-byte double-SHA256 digest. Used pervasively to identify blocks,
/// transactions and merkle nodes.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash256(pub [u8; 32]);

pub const ZERO_HASH: Hash256 = Hash256([0u8; 32]);

impl Hash256 {
	pub fn from_bytes(bytes: &[u8]) -> Hash256 {
		let mut a = [0u8; 32];
		a.copy_from_slice(bytes);
		Hash256(a)
	}

	pub fn as_bytes(&self) -> &[u8; 32] {
		&self.0
	}

	pub fn to_vec(&self) -> Vec<u8> {
		self.0.to_vec()
	}

	/// Returns the hash with byte order reversed, as used for on-wire and
	/// display-order txids/block hashes.
	pub fn reversed(&self) -> Hash256 {
		let mut out = self.0;
		out.reverse();
		Hash256(out)
	}

	/// Interprets the bytes as a big-endian 256-bit integer.
	pub fn to_big_uint(&self) -> num_bigint::BigUint {
		num_bigint::BigUint::from_bytes_be(&self.0)
	}
}

impl fmt::Debug for Hash256 {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Hash256({})", self)
	}
}

impl fmt::Display for Hash256 {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for byte in self.0.iter() {
			write!(f, "{:02x}", byte)?;
		}
		Ok(())
	}
}

/// Types that derive their canonical identity from `hash256` of their wire
/// serialization.
pub trait Hashed {
	fn hash(&self) -> Hash256;
}

/// Double SHA-256: `SHA256(SHA256(b))`.
pub fn hash256(data: &[u8]) -> Hash256 {
	let first = Sha256::digest(data);
	let second = Sha256::digest(&first);
	Hash256::from_bytes(&second)
}

/// `SHA256` then `RIPEMD160`, as used for pubkey -> pubkey-hash and
/// redeem-script -> script-hash.
pub fn hash160(data: &[u8]) -> [u8; 20] {
	let sha = Sha256::digest(data);
	let ripe = Ripemd160::digest(sha);
	let mut out = [0u8; 20];
	out.copy_from_slice(&ripe);
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hash256_matches_known_vector() {
		// SHA256(SHA256("")) is a well known constant.
		let h = hash256(b"");
		assert_eq!(
			format!("{}", h),
			"5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
		);
	}

	#[test]
	fn hash160_len() {
		let h = hash160(b"hello");
		assert_eq!(h.len(), 20);
	}

	#[test]
	fn reversed_round_trips() {
		let h = hash256(b"round trip me");
		assert_eq!(h.reversed().reversed(), h);
	}
}
