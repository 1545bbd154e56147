//! Modular arithmetic over the secp256k1 field prime
//! `p = 2^256 - 2^32 - 977`.
//!
//! Grounded on `pkg/ecc/fieldelement/fieldelement.go`'s generic
//! `FieldElement{Num, Prime}` (big-integer, Fermat-exponent inverse); we
//! specialize it to the one prime this workspace cares about and use
//! `num-bigint` the way `core/src/core/target.rs` uses `BigUint` for
//! `Difficulty`.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::{Error, ErrorKind};

lazy_static::lazy_static! {
	/// `p = 2^256 - 2^32 - 977`
	pub static ref P: BigUint = {
		let two = BigUint::from(2u32);
		two.pow(256) - two.pow(32) - BigUint::from(977u32)
	};
}

/// An element of the secp256k1 base field, always reduced into `[0, p)`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FieldElement {
	num: BigUint,
}

impl FieldElement {
	/// Constructs a field element, reducing `num` modulo `p`.
	pub fn new(num: BigUint) -> FieldElement {
		FieldElement { num: num % &*P }
	}

	pub fn from_u64(n: u64) -> FieldElement {
		FieldElement::new(BigUint::from(n))
	}

	pub fn zero() -> FieldElement {
		FieldElement { num: BigUint::zero() }
	}

	pub fn num(&self) -> &BigUint {
		&self.num
	}

	pub fn is_zero(&self) -> bool {
		self.num.is_zero()
	}

	/// Parses a field element from a 32-byte big-endian encoding.
	pub fn from_be_bytes(bytes: &[u8]) -> FieldElement {
		FieldElement::new(BigUint::from_bytes_be(bytes))
	}

	/// Encodes as a 32-byte big-endian, zero-padded integer.
	pub fn to_be_bytes(&self) -> [u8; 32] {
		let raw = self.num.to_bytes_be();
		let mut out = [0u8; 32];
		out[32 - raw.len()..].copy_from_slice(&raw);
		out
	}

	/// `self^exponent mod p`, exponent taken as a non-negative integer.
	pub fn pow(&self, exponent: &BigUint) -> FieldElement {
		FieldElement {
			num: self.num.modpow(exponent, &P),
		}
	}

	/// Modular inverse via Fermat's little theorem: `a^(p-2) mod p`.
	pub fn inverse(&self) -> Result<FieldElement, Error> {
		if self.is_zero() {
			return Err(ErrorKind::FieldDomain("cannot invert zero".to_string()).into());
		}
		let exponent = &*P - BigUint::from(2u32);
		Ok(self.pow(&exponent))
	}

	/// Square root, valid because `p ≡ 3 (mod 4)` for secp256k1: the square
	/// root of a quadratic residue `a` is `a^((p+1)/4) mod p`.
	pub fn sqrt(&self) -> FieldElement {
		let exponent = (&*P + BigUint::one()) / BigUint::from(4u32);
		self.pow(&exponent)
	}

	pub fn is_even(&self) -> bool {
		(&self.num % BigUint::from(2u32)).is_zero()
	}
}

impl fmt::Debug for FieldElement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "FieldElement({:#x})", self.num)
	}
}

impl Add for &FieldElement {
	type Output = FieldElement;
	fn add(self, other: &FieldElement) -> FieldElement {
		FieldElement::new(&self.num + &other.num)
	}
}

impl Sub for &FieldElement {
	type Output = FieldElement;
	fn sub(self, other: &FieldElement) -> FieldElement {
		// BigUint has no negative values, so add `p` before subtracting to
		// avoid underflow when `other > self`.
		FieldElement::new(&self.num + &*P - &other.num)
	}
}

impl Mul for &FieldElement {
	type Output = FieldElement;
	fn mul(self, other: &FieldElement) -> FieldElement {
		FieldElement::new(&self.num * &other.num)
	}
}

impl Neg for &FieldElement {
	type Output = FieldElement;
	fn neg(self) -> FieldElement {
		FieldElement::new(&*P - &self.num)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn add_sub_are_inverses() {
		let a = FieldElement::from_u64(5);
		let b = FieldElement::from_u64(9999999999);
		let sum = &a + &b;
		assert_eq!(&sum - &b, a);
	}

	#[test]
	fn inverse_round_trips() {
		let a = FieldElement::from_u64(1234567);
		let inv = a.inverse().unwrap();
		let one = &a * &inv;
		assert_eq!(one.num(), &BigUint::one());
	}

	#[test]
	fn zero_has_no_inverse() {
		assert!(FieldElement::zero().inverse().is_err());
	}

	#[test]
	fn sqrt_of_square_is_a_square_root() {
		let a = FieldElement::from_u64(12345);
		let squared = &a * &a;
		let root = squared.sqrt();
		// root is *a* square root, not necessarily `a` itself (could be
		// `p - a`), but squaring it must reproduce the original value.
		let check = &root * &root;
		assert_eq!(check, squared);
	}

	#[test]
	fn be_bytes_round_trip() {
		let a = FieldElement::from_u64(0xdeadbeef);
		let bytes = a.to_be_bytes();
		assert_eq!(bytes.len(), 32);
		assert_eq!(FieldElement::from_be_bytes(&bytes), a);
	}
}
