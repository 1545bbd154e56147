//! Block header parse/serialize and proof-of-work checking (§3/§4.5).
//!
//! Grounded on `core/src/core/block.rs`'s `BlockHeader` and its
//! `Writeable`/`Readable` pair, generalized to the fixed 80-byte Bitcoin
//! wire layout.

use std::io::{self, Read, Write};

use num_bigint::BigUint;

use super::target::{bits_to_target, retarget, target_to_bits};
use crate::encoding::bytes::{read_u32_le, write_u32_le};
use crate::encoding::hash::hash256;
use crate::encoding::{Hash256, Hashed};
use crate::error::Error;

/// A Bitcoin block header: 80 bytes on the wire, all fields little-endian.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BlockHeader {
	pub version: u32,
	pub prev_block: Hash256,
	pub merkle_root: Hash256,
	pub timestamp: u32,
	pub bits: u32,
	pub nonce: u32,
}

impl BlockHeader {
	pub fn serialize<W: Write>(&self, w: &mut W) -> io::Result<()> {
		write_u32_le(w, self.version)?;
		w.write_all(self.prev_block.as_bytes())?;
		w.write_all(self.merkle_root.as_bytes())?;
		write_u32_le(w, self.timestamp)?;
		write_u32_le(w, self.bits)?;
		write_u32_le(w, self.nonce)
	}

	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(80);
		self.serialize(&mut out).expect("writing to a Vec never fails");
		out
	}

	pub fn parse<R: Read>(r: &mut R) -> Result<BlockHeader, Error> {
		let version = read_u32_le(r)?;
		let mut prev_block = [0u8; 32];
		r.read_exact(&mut prev_block)?;
		let mut merkle_root = [0u8; 32];
		r.read_exact(&mut merkle_root)?;
		let timestamp = read_u32_le(r)?;
		let bits = read_u32_le(r)?;
		let nonce = read_u32_le(r)?;
		Ok(BlockHeader {
			version,
			prev_block: Hash256::from_bytes(&prev_block),
			merkle_root: Hash256::from_bytes(&merkle_root),
			timestamp,
			bits,
			nonce,
		})
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<BlockHeader, Error> {
		BlockHeader::parse(&mut &bytes[..])
	}

	pub fn from_hex(hex_str: &str) -> Result<BlockHeader, Error> {
		let bytes = btcspv_util::hex::from_hex(hex_str)
			.map_err(|e| crate::error::ErrorKind::Encoding(format!("bad header hex: {}", e)))?;
		BlockHeader::from_bytes(&bytes)
	}

	/// The target this header's proof of work must beat.
	pub fn target(&self) -> BigUint {
		bits_to_target(self.bits)
	}

	/// `true` iff `hash256(serialization)`, read as a little-endian integer,
	/// is below this header's target.
	pub fn check_pow(&self) -> bool {
		let digest = hash256(&self.to_bytes());
		// The digest bytes are produced in the order `hash256` returns them;
		// read as a little-endian integer means reversing before the
		// big-endian `BigUint` parse.
		let proof = BigUint::from_bytes_le(digest.as_bytes());
		let ok = proof < self.target();
		if !ok {
			log::debug!("header {} failed PoW check against bits {:08x}", digest.reversed(), self.bits);
		}
		ok
	}

	/// Computes the next period's `bits` given the first header of the
	/// 2016-block period this header closes.
	pub fn next_bits(&self, first_of_period: &BlockHeader) -> u32 {
		retarget(first_of_period.timestamp, self.timestamp, self.bits)
	}

	/// Re-encodes `target` as this header's `bits` would be (normalization
	/// helper shared with [`super::target`]).
	pub fn bits_for_target(target: &BigUint) -> u32 {
		target_to_bits(target)
	}
}

impl Hashed for BlockHeader {
	/// Internal (little-endian / wire) byte order. Callers that want the
	/// conventional display/explorer order should call `.reversed()`.
	fn hash(&self) -> Hash256 {
		hash256(&self.to_bytes())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_then_serialize_round_trips() {
		let header = BlockHeader {
			version: 0x20000002,
			prev_block: Hash256::from_bytes(&[0x8e; 32]),
			merkle_root: Hash256::from_bytes(&[0x5b; 32]),
			timestamp: 1_503_831_875,
			bits: 0x18013ce9,
			nonce: 0x03049e99,
		};
		let bytes = header.to_bytes();
		assert_eq!(bytes.len(), 80);
		let parsed = BlockHeader::from_bytes(&bytes).unwrap();
		assert_eq!(parsed, header);
	}

	#[test]
	fn hash_round_trips_through_reversal() {
		let header = BlockHeader {
			version: 1,
			prev_block: Hash256::from_bytes(&[0u8; 32]),
			merkle_root: Hash256::from_bytes(&[1u8; 32]),
			timestamp: 1_231_006_505,
			bits: 0x1d00ffff,
			nonce: 2083236893,
		};
		let h = header.hash();
		assert_eq!(h.reversed().reversed(), h);
	}

	#[test]
	fn max_bits_header_is_near_the_pow_boundary() {
		let header = BlockHeader {
			version: 1,
			prev_block: Hash256::from_bytes(&[0u8; 32]),
			merkle_root: Hash256::from_bytes(&[0u8; 32]),
			timestamp: 0,
			bits: 0x1d00ffff,
			nonce: 0,
		};
		// Not asserting a specific outcome (nonce 0 may or may not satisfy
		// PoW); just that check_pow runs and agrees with a direct target
		// comparison.
		let digest = hash256(&header.to_bytes());
		let proof = BigUint::from_bytes_le(digest.as_bytes());
		assert_eq!(header.check_pow(), proof < header.target());
	}
}
