//! BIP37 bloom filter: per-item MurmurHash3-32 with per-function seeds,
//! serialized as a `filterload` payload (§4.7).
//!
//! Grounded on `pkg/bitcoin/block/bloomfilter.go`'s `BloomFilter{Size,
//! Bitfield, FunctionCount, Tweak}` and its `Add`, generalized with the
//! same varint/byte codecs the rest of this crate's wire types use.

use std::io::{self, Read, Write};

use crate::encoding::bytes::{read_u32_le, write_u32_le};
use crate::encoding::varint::{read_varint, write_varint};
use crate::error::Error;

const BIP37_CONSTANT: u32 = 0xfba4c795;

/// A BIP37 bloom filter used to ask a peer to filter the transactions it
/// relays down to those matching a watched set of items.
#[derive(Clone, Debug)]
pub struct BloomFilter {
	size_bytes: u32,
	bitfield: Vec<u8>,
	function_count: u32,
	tweak: u32,
}

impl BloomFilter {
	/// Builds an empty filter of `size_bytes` bytes, using `function_count`
	/// hash functions and a caller-chosen `tweak` (peers use a random tweak
	/// to keep their filter's item set private; this crate leaves the
	/// choice to the caller rather than reaching for a source of entropy).
	pub fn new(size_bytes: u32, function_count: u32, tweak: u32) -> BloomFilter {
		BloomFilter {
			size_bytes,
			bitfield: vec![0u8; size_bytes as usize],
			function_count,
			tweak,
		}
	}

	/// Sets the bits corresponding to `item` under each of this filter's
	/// hash functions.
	pub fn add(&mut self, item: &[u8]) {
		for i in 0..self.function_count {
			let seed = i.wrapping_mul(BIP37_CONSTANT).wrapping_add(self.tweak);
			let h = murmur3_32(item, seed);
			let bit = (h as u64 % (self.size_bytes as u64 * 8)) as usize;
			self.bitfield[bit / 8] |= 1 << (bit % 8);
		}
	}

	/// `true` iff every bit `item` would set is already set (a possible
	/// match; bloom filters never false-negative, only false-positive).
	pub fn might_contain(&self, item: &[u8]) -> bool {
		for i in 0..self.function_count {
			let seed = i.wrapping_mul(BIP37_CONSTANT).wrapping_add(self.tweak);
			let h = murmur3_32(item, seed);
			let bit = (h as u64 % (self.size_bytes as u64 * 8)) as usize;
			if self.bitfield[bit / 8] & (1 << (bit % 8)) == 0 {
				return false;
			}
		}
		true
	}

	/// Serializes the `filterload` payload: `varint(size) ‖ bitfield ‖
	/// function_count_u32_LE ‖ tweak_u32_LE ‖ flags_u8`. `flags` is fixed to
	/// `BLOOM_UPDATE_NONE` (0); this workspace does not implement the
	/// auto-update variants.
	pub fn serialize<W: Write>(&self, w: &mut W) -> io::Result<()> {
		write_varint(w, self.bitfield.len() as u64)?;
		w.write_all(&self.bitfield)?;
		write_u32_le(w, self.function_count)?;
		write_u32_le(w, self.tweak)?;
		w.write_all(&[0u8])
	}

	pub fn parse<R: Read>(r: &mut R) -> Result<BloomFilter, Error> {
		let len = read_varint(r)?;
		let mut bitfield = vec![0u8; len as usize];
		r.read_exact(&mut bitfield)?;
		let function_count = read_u32_le(r)?;
		let tweak = read_u32_le(r)?;
		let mut flags = [0u8; 1];
		r.read_exact(&mut flags)?;
		Ok(BloomFilter {
			size_bytes: bitfield.len() as u32,
			bitfield,
			function_count,
			tweak,
		})
	}
}

/// MurmurHash3 x86 32-bit, as used by BIP37. `data` is hashed in 4-byte
/// blocks with the standard MurmurHash3 mixing constants and a tail handler
/// for the final 0..3 remaining bytes.
fn murmur3_32(data: &[u8], seed: u32) -> u32 {
	const C1: u32 = 0xcc9e2d51;
	const C2: u32 = 0x1b873593;

	let mut h1 = seed;
	let chunks = data.chunks_exact(4);
	let tail = chunks.remainder();

	for chunk in chunks {
		let mut k1 = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
		k1 = k1.wrapping_mul(C1);
		k1 = k1.rotate_left(15);
		k1 = k1.wrapping_mul(C2);

		h1 ^= k1;
		h1 = h1.rotate_left(13);
		h1 = h1.wrapping_mul(5).wrapping_add(0xe6546b64);
	}

	let mut k1 = 0u32;
	for (i, &byte) in tail.iter().enumerate().rev() {
		k1 ^= (byte as u32) << (8 * i);
		if i == 0 {
			k1 = k1.wrapping_mul(C1);
			k1 = k1.rotate_left(15);
			k1 = k1.wrapping_mul(C2);
			h1 ^= k1;
		}
	}

	h1 ^= data.len() as u32;
	h1 ^= h1 >> 16;
	h1 = h1.wrapping_mul(0x85ebca6b);
	h1 ^= h1 >> 13;
	h1 = h1.wrapping_mul(0xc2b2ae35);
	h1 ^= h1 >> 16;
	h1
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn murmur3_of_empty_with_zero_seed_is_zero() {
		assert_eq!(murmur3_32(b"", 0), 0);
	}

	#[test]
	fn added_item_is_found() {
		let mut filter = BloomFilter::new(8, 3, 0);
		filter.add(b"hello");
		assert!(filter.might_contain(b"hello"));
	}

	#[test]
	fn unrelated_item_is_usually_absent() {
		let mut filter = BloomFilter::new(64, 5, 0x1234);
		filter.add(b"alpha");
		// Not a universal guarantee (bloom filters can false-positive), but
		// with a filter this large relative to one inserted item, a clearly
		// unrelated item should not match.
		assert!(!filter.might_contain(b"something else entirely"));
	}

	#[test]
	fn serialize_round_trips() {
		let mut filter = BloomFilter::new(4, 2, 7);
		filter.add(b"x");
		let mut buf = Vec::new();
		filter.serialize(&mut buf).unwrap();
		let parsed = BloomFilter::parse(&mut &buf[..]).unwrap();
		assert_eq!(parsed.bitfield, filter.bitfield);
		assert_eq!(parsed.function_count, filter.function_count);
		assert_eq!(parsed.tweak, filter.tweak);
	}
}
