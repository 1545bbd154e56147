//! Compact-bits ↔ target conversion and the 2016-block difficulty retarget
//! (§4.5). Grounded on `core/src/pow/difficulty.rs`'s `Difficulty{num:
//! BigUint}` newtype-over-`BigUint` pattern.

use num_bigint::BigUint;
use num_traits::Zero;

/// Two weeks in seconds: the interval 2016 blocks are supposed to take at
/// the target 10-minute spacing.
pub const TWO_WEEKS: i64 = 1_209_600;

/// `bits` of the maximum-difficulty (easiest) target: `0x1d00ffff`.
pub const MAX_BITS: u32 = 0x1d00ffff;

/// Decodes the compact "bits" encoding into a full 256-bit target.
/// `bits` LE byte layout is `[coeff0, coeff1, coeff2, exponent]`; as the
/// `u32` this crate reads off the wire (little-endian), that is
/// `exponent << 24 | coeff2 << 16 | coeff1 << 8 | coeff0`.
pub fn bits_to_target(bits: u32) -> BigUint {
	let exponent = (bits >> 24) as u32;
	let coefficient = BigUint::from(bits & 0x00ff_ffff);
	if exponent <= 3 {
		coefficient >> (8 * (3 - exponent))
	} else {
		coefficient << (8 * (exponent - 3))
	}
}

/// Encodes a target back into compact "bits" form, applying the canonical
/// normalization: if the coefficient's leading byte would have its high bit
/// set, prepend a zero byte and grow the exponent by one (keeps the value
/// unsigned under the sign-magnitude-like compact encoding).
pub fn target_to_bits(target: &BigUint) -> u32 {
	if target.is_zero() {
		return 0;
	}
	let mut bytes = target.to_bytes_be();
	// Strip any big-endian leading zero bytes `to_bytes_be` never leaves in,
	// but normalize defensively in case callers hand in a padded vector.
	while bytes.len() > 1 && bytes[0] == 0 {
		bytes.remove(0);
	}

	let mut exponent = bytes.len() as u32;
	if bytes[0] & 0x80 != 0 {
		bytes.insert(0, 0x00);
		exponent += 1;
	}
	if bytes.len() < 3 {
		bytes.resize(3, 0);
	}
	let coefficient = u32::from(bytes[0]) << 16 | u32::from(bytes[1]) << 8 | u32::from(bytes[2]);
	(exponent << 24) | coefficient
}

/// Computes the new `bits` after a 2016-block retarget, given the
/// first and last header timestamps of the just-finished period and the
/// last period's bits.
pub fn retarget(first_timestamp: u32, last_timestamp: u32, last_bits: u32) -> u32 {
	let max_target = bits_to_target(MAX_BITS);
	let last_target = bits_to_target(last_bits);

	let mut elapsed = i64::from(last_timestamp) - i64::from(first_timestamp);
	elapsed = elapsed.clamp(TWO_WEEKS / 4, TWO_WEEKS * 4);

	let mut new_target = (last_target * BigUint::from(elapsed as u64)) / BigUint::from(TWO_WEEKS as u64);
	if new_target > max_target {
		new_target = max_target;
	}
	target_to_bits(&new_target)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn s4_bits_to_target() {
		// S4 from spec.md: wire bytes `e9 3c 01 18` read LE as u32 give
		// coefficient 0x013ce9, exponent 0x18.
		let bits: u32 = 0x18013ce9;
		let target = bits_to_target(bits);
		let expected = BigUint::from(0x013ce9u32) * BigUint::from(2u32).pow(8 * (0x18 - 3));
		assert_eq!(target, expected);
	}

	#[test]
	fn max_bits_round_trips() {
		let target = bits_to_target(MAX_BITS);
		assert_eq!(target_to_bits(&target), MAX_BITS);
	}

	#[test]
	fn retarget_at_exactly_two_weeks_is_unchanged() {
		let bits = 0x1d00ffffu32;
		let new_bits = retarget(0, TWO_WEEKS as u32, bits);
		assert_eq!(new_bits, bits);
	}

	#[test]
	fn retarget_clamps_extreme_deltas() {
		let bits = 0x18013ce9u32;
		let fast = retarget(0, 10, bits);
		let slow = retarget(0, (TWO_WEEKS * 100) as u32, bits);
		assert!(bits_to_target(fast) < bits_to_target(bits));
		assert!(bits_to_target(slow) > bits_to_target(bits) || bits_to_target(slow) == bits_to_target(MAX_BITS));
	}
}
