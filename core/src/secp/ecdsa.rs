//! ECDSA signing and verification over secp256k1 (§4.2).

use num_bigint::BigUint;
use num_traits::{One, Zero};

use super::point::{Point, N};
use super::rfc6979::deterministic_k;
use super::signature::Signature;
use crate::error::{Error, ErrorKind};

/// Signs `z` with `secret`, using RFC 6979 deterministic `k` and returning a
/// low-S canonical signature.
pub fn sign(secret: &BigUint, z: &BigUint) -> Signature {
	let k = deterministic_k(secret, z);
	let r_point = Point::generator().scalar_mul(&k);
	let r = r_point.x().expect("kG is never the identity for k in [1, n)").num() % &*N;

	let k_inv = mod_inverse(&k, &N);
	let mut s = (z + &(&r * secret)) % &*N;
	s = (&s * &k_inv) % &*N;

	let half_n = &*N / BigUint::from(2u32);
	if s > half_n {
		s = &*N - &s;
	}

	Signature::new(r, s)
}

/// Verifies that `(r, s)` is a valid signature of `z` under `pubkey`.
/// Returns an error (not `Ok(false)`) only when `r`/`s` are malformed;
/// a cryptographically valid-but-wrong signature is `Ok(false)`.
pub fn verify(pubkey: &Point, z: &BigUint, sig: &Signature) -> Result<bool, Error> {
	if sig.r.is_zero() || sig.r >= *N || sig.s.is_zero() || sig.s >= *N {
		return Err(ErrorKind::SignatureFormat("r or s outside [1, n)".to_string()).into());
	}

	let s_inv = mod_inverse(&sig.s, &N);
	let u = (z * &s_inv) % &*N;
	let v = (&sig.r * &s_inv) % &*N;

	let total = Point::generator().scalar_mul(&u).add(&pubkey.scalar_mul(&v));
	match total.x() {
		None => Ok(false),
		Some(x) => Ok(x.num() % &*N == sig.r),
	}
}

/// `a^-1 mod m` via Fermat's little theorem (`m` is prime for both of this
/// crate's moduli, `p` and `n`).
fn mod_inverse(a: &BigUint, m: &BigUint) -> BigUint {
	a.modpow(&(m - BigUint::from(2u32)), m)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sign_then_verify_succeeds() {
		let secret = BigUint::from(1234567890u64);
		let pubkey = Point::generator().scalar_mul(&secret);
		let z = BigUint::from(0xdeadbeefu64);
		let sig = sign(&secret, &z);
		assert!(verify(&pubkey, &z, &sig).unwrap());
	}

	#[test]
	fn tampered_z_fails_verification() {
		let secret = BigUint::from(42u64);
		let pubkey = Point::generator().scalar_mul(&secret);
		let z = BigUint::from(100u64);
		let sig = sign(&secret, &z);
		let wrong_z = BigUint::from(101u64);
		assert!(!verify(&pubkey, &wrong_z, &sig).unwrap());
	}

	#[test]
	fn wrong_pubkey_fails_verification() {
		let secret = BigUint::from(42u64);
		let other_pubkey = Point::generator().scalar_mul(&BigUint::from(43u64));
		let z = BigUint::from(100u64);
		let sig = sign(&secret, &z);
		assert!(!verify(&other_pubkey, &z, &sig).unwrap());
	}

	#[test]
	fn signing_is_deterministic() {
		let secret = BigUint::from(555u64);
		let z = BigUint::from(777u64);
		let sig1 = sign(&secret, &z);
		let sig2 = sign(&secret, &z);
		assert_eq!(sig1.der(), sig2.der());
	}

	#[test]
	fn signature_is_low_s() {
		let secret = BigUint::from(98765u64);
		let z = BigUint::from(111111u64);
		let sig = sign(&secret, &z);
		assert!(sig.s <= &*N / BigUint::from(2u32));
	}

}
