//! Script integer encoding: two's-complement, little-endian, with the sign
//! carried in the high bit of the most significant byte (§4.3). Distinct
//! from the protocol-wide little-endian integer codecs in
//! [`crate::encoding::bytes`], which are fixed-width and unsigned.

/// Decodes a script-encoded integer. The empty vector is zero.
pub fn decode_num(bytes: &[u8]) -> i64 {
	if bytes.is_empty() {
		return 0;
	}
	let mut be = bytes.to_vec();
	let negative = be[be.len() - 1] & 0x80 != 0;
	let last = be.len() - 1;
	be[last] &= 0x7f;

	let mut result: i64 = 0;
	for (i, byte) in be.iter().enumerate() {
		result |= (*byte as i64) << (8 * i);
	}
	if negative {
		-result
	} else {
		result
	}
}

/// Encodes an integer in script's minimal two's-complement little-endian
/// form (empty vector for zero).
pub fn encode_num(n: i64) -> Vec<u8> {
	if n == 0 {
		return Vec::new();
	}
	let negative = n < 0;
	let mut abs = n.unsigned_abs();
	let mut out = Vec::new();
	while abs > 0 {
		out.push((abs & 0xff) as u8);
		abs >>= 8;
	}
	let last = out.len() - 1;
	if out[last] & 0x80 != 0 {
		out.push(if negative { 0x80 } else { 0x00 });
	} else if negative {
		out[last] |= 0x80;
	}
	out
}

/// Script truthiness: the empty vector and "negative zero" (`0x80`, and its
/// longer-encoding equivalents of all-zero bytes with a set sign bit on the
/// last one) are false; everything else is true.
pub fn is_truthy(bytes: &[u8]) -> bool {
	if bytes.is_empty() {
		return false;
	}
	for (i, &byte) in bytes.iter().enumerate() {
		if byte != 0 {
			if i == bytes.len() - 1 && byte == 0x80 {
				return false;
			}
			return true;
		}
	}
	false
}
