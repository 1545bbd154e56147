//! Little-endian integer codecs and byte-order helpers used by transaction,
//! block header and wire-message serialization.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

pub fn write_u32_le<W: Write>(w: &mut W, n: u32) -> io::Result<()> {
	w.write_u32::<LittleEndian>(n)
}

pub fn read_u32_le<R: Read>(r: &mut R) -> io::Result<u32> {
	r.read_u32::<LittleEndian>()
}

pub fn write_u64_le<W: Write>(w: &mut W, n: u64) -> io::Result<()> {
	w.write_u64::<LittleEndian>(n)
}

pub fn read_u64_le<R: Read>(r: &mut R) -> io::Result<u64> {
	r.read_u64::<LittleEndian>()
}

/// A single byte, little-endian by construction. `UInt8ToLittleEndianBytes`
/// in `original_source/` tries (and fails) to special-case this; for a
/// one-byte integer there is no endianness to account for (Open Question 2).
pub fn u8_to_le_bytes(n: u8) -> [u8; 1] {
	[n]
}

/// Reverses a 32-byte hash for display-order <-> wire-order conversion (txids
/// and block hashes are stored internally little-endian but displayed/
/// referenced big-endian).
pub fn reverse32(bytes: &[u8; 32]) -> [u8; 32] {
	let mut out = *bytes;
	out.reverse();
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn le_round_trip() {
		let mut buf = Vec::new();
		write_u32_le(&mut buf, 0x01020304).unwrap();
		assert_eq!(buf, vec![0x04, 0x03, 0x02, 0x01]);
		let mut cursor = &buf[..];
		assert_eq!(read_u32_le(&mut cursor).unwrap(), 0x01020304);
	}

	#[test]
	fn single_byte_is_identity() {
		assert_eq!(u8_to_le_bytes(0xab), [0xab]);
	}
}
