//! Deterministic nonce derivation per RFC 6979, specialized to HMAC-SHA256
//! and the secp256k1 order `n` (§4.2). `original_source/`'s
//! `PrivateKey.Sign` instead draws `k` from `crypto/rand`; the spec requires
//! determinism explicitly, so this module follows the spec, not the source.

use hmac::{Hmac, Mac};
use num_bigint::BigUint;
use num_traits::One;
use sha2::Sha256;

use super::point::N;

type HmacSha256 = Hmac<Sha256>;

fn hmac(key: &[u8], msg: &[u8]) -> [u8; 32] {
	let mut mac = <HmacSha256 as Mac>::new_from_slice(key).expect("HMAC accepts any key length");
	mac.update(msg);
	let result = mac.finalize().into_bytes();
	let mut out = [0u8; 32];
	out.copy_from_slice(&result);
	out
}

fn to_32_be(n: &BigUint) -> [u8; 32] {
	let raw = n.to_bytes_be();
	let mut out = [0u8; 32];
	out[32 - raw.len()..].copy_from_slice(&raw);
	out
}

/// Derives the deterministic nonce `k` for signing `z` under `secret`.
/// Two calls with identical `(secret, z)` always return the same `k`.
pub fn deterministic_k(secret: &BigUint, z: &BigUint) -> BigUint {
	let z = if z >= &*N { z - &*N } else { z.clone() };

	let secret_bytes = to_32_be(secret);
	let z_bytes = to_32_be(&z);

	let mut v = [0x01u8; 32];
	let mut k = [0x00u8; 32];

	let mut msg = Vec::with_capacity(32 + 1 + 32 + 32);
	msg.extend_from_slice(&v);
	msg.push(0x00);
	msg.extend_from_slice(&secret_bytes);
	msg.extend_from_slice(&z_bytes);
	k = hmac(&k, &msg);
	v = hmac(&k, &v);

	msg.clear();
	msg.extend_from_slice(&v);
	msg.push(0x01);
	msg.extend_from_slice(&secret_bytes);
	msg.extend_from_slice(&z_bytes);
	k = hmac(&k, &msg);
	v = hmac(&k, &v);

	loop {
		v = hmac(&k, &v);
		let candidate = BigUint::from_bytes_be(&v);
		if candidate >= BigUint::one() && candidate < *N {
			return candidate;
		}
		let mut msg = Vec::with_capacity(33);
		msg.extend_from_slice(&v);
		msg.push(0x00);
		k = hmac(&k, &msg);
		v = hmac(&k, &v);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deterministic_across_calls() {
		let secret = BigUint::from(12345u32);
		let z = BigUint::from(67890u32);
		let k1 = deterministic_k(&secret, &z);
		let k2 = deterministic_k(&secret, &z);
		assert_eq!(k1, k2);
	}

	#[test]
	fn different_z_gives_different_k() {
		let secret = BigUint::from(12345u32);
		let k1 = deterministic_k(&secret, &BigUint::from(1u32));
		let k2 = deterministic_k(&secret, &BigUint::from(2u32));
		assert_ne!(k1, k2);
	}

	#[test]
	fn k_is_in_range() {
		let secret = BigUint::from(999999u32);
		let z = BigUint::from(42u32);
		let k = deterministic_k(&secret, &z);
		assert!(k >= BigUint::one());
		assert!(k < *N);
	}
}
