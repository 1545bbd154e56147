//! Thin hex-encoding wrappers shared by every crate in the workspace.
//!
//! Kept as a named module (rather than having every call site reach for the
//! `hex` crate directly) so the lowercase-with-no-`0x`-prefix convention used
//! throughout this workspace's `Display`/`Debug` impls is defined in one
//! place.

/// Encodes bytes as a lowercase hex string, no `0x` prefix.
pub fn to_hex(bytes: &[u8]) -> String {
	hex::encode(bytes)
}

/// Decodes a hex string (optionally `0x`-prefixed) into bytes.
pub fn from_hex(hex_str: &str) -> Result<Vec<u8>, hex::FromHexError> {
	let trimmed = hex_str.strip_prefix("0x").unwrap_or(hex_str);
	hex::decode(trimmed)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trip() {
		let bytes = vec![0x00, 0xab, 0xff];
		let s = to_hex(&bytes);
		assert_eq!(s, "00abff");
		assert_eq!(from_hex(&s).unwrap(), bytes);
		assert_eq!(from_hex("0x00abff").unwrap(), bytes);
	}
}
