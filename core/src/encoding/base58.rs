//! Base58 and Base58Check encoding.
//!
//! Grounded on `keychain/src/base58.rs` (a vendored copy of `rust-bitcoin`'s
//! base58 module): same alphabet, same `hash256`-based 4-byte checksum.
//! The big-integer base conversion itself is delegated to the `bs58` crate
//! (already pulled in for Bitcoin address work by `lapseSoup-simply-sats`),
//! keeping the behaviour bit-exact while skipping a hand-rolled
//! arbitrary-base divider.

use crate::error::{Error, ErrorKind};

/// `"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz"` — the
/// alphabet `bs58::Alphabet::BITCOIN` already implements.
pub fn encode_base58(data: &[u8]) -> String {
	bs58::encode(data).into_string()
}

/// Decodes a plain (non-checksummed) Base58 string.
pub fn decode_base58(s: &str) -> Result<Vec<u8>, Error> {
	bs58::decode(s)
		.into_vec()
		.map_err(|e| ErrorKind::Encoding(format!("invalid base58: {}", e)).into())
}

/// `Base58(b ‖ hash256(b)[0..4])`.
pub fn encode_base58check(data: &[u8]) -> String {
	bs58::encode(data).with_check().into_string()
}

/// Decodes a Base58Check string, validating the trailing 4-byte checksum.
/// Returns the payload with the checksum stripped (the version/prefix byte
/// is left in place — callers that encoded `prefix ‖ payload` slice it off).
pub fn decode_base58check(s: &str) -> Result<Vec<u8>, Error> {
	bs58::decode(s)
		.with_check(None)
		.into_vec()
		.map_err(|e| ErrorKind::ChecksumMismatch.into_with_cause(e))
}

trait IntoWithCause<T> {
	fn into_with_cause(self, cause: T) -> Error;
}

impl IntoWithCause<bs58::decode::Error> for ErrorKind {
	fn into_with_cause(self, cause: bs58::decode::Error) -> Error {
		match cause {
			bs58::decode::Error::InvalidChecksum { .. } => ErrorKind::ChecksumMismatch.into(),
			other => ErrorKind::Encoding(format!("invalid base58check: {}", other)).into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn s1_base58_decode() {
		// S1 from spec.md: decoding strips the 4-byte checksum, leaving
		// the version byte followed by the 20-byte hash160.
		let addr = "mzx5YhAH9kNHtcN481u6WkjeHjYtVeKVh2";
		let decoded = decode_base58check(addr).expect("valid checksum");
		let body = &decoded[1..];
		assert_eq!(btcspv_util::hex::to_hex(body), "d52ad7ca9b3d096a38e752c2018e6fbc40cdf26");
	}

	#[test]
	fn round_trip() {
		let data = vec![0x00u8, 1, 2, 3, 4, 5];
		let encoded = encode_base58check(&data);
		let decoded = decode_base58check(&encoded).unwrap();
		assert_eq!(decoded, data);
	}

	#[test]
	fn checksum_mismatch_detected() {
		let data = vec![9u8, 9, 9];
		let mut encoded = encode_base58check(&data);
		encoded.push('1');
		assert!(decode_base58check(&encoded).is_err());
	}
}
