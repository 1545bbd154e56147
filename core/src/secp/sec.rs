//! SEC (Standards for Efficient Cryptography) public key encoding: the
//! compressed (`02`/`03 ‖ X`) and uncompressed (`04 ‖ X ‖ Y`) wire forms of
//! a curve point (§4.2).

use super::field::FieldElement;
use super::point::Point;
use crate::encoding::hash160;
use crate::error::{Error, ErrorKind};

impl Point {
	/// Encodes this (non-identity) point in SEC format.
	pub fn to_sec(&self, compressed: bool) -> Result<Vec<u8>, Error> {
		let (x, y) = match self {
			Point::Affine { x, y } => (x, y),
			Point::Identity => {
				return Err(ErrorKind::CurveDomain("cannot SEC-encode the point at infinity".to_string()).into());
			}
		};
		if compressed {
			let mut out = Vec::with_capacity(33);
			out.push(if y.is_even() { 0x02 } else { 0x03 });
			out.extend_from_slice(&x.to_be_bytes());
			Ok(out)
		} else {
			let mut out = Vec::with_capacity(65);
			out.push(0x04);
			out.extend_from_slice(&x.to_be_bytes());
			out.extend_from_slice(&y.to_be_bytes());
			Ok(out)
		}
	}

	/// Decodes a SEC-encoded public key, recovering `y` from `x` via a
	/// modular square root for the compressed form.
	pub fn parse_sec(data: &[u8]) -> Result<Point, Error> {
		match data.first() {
			Some(0x04) => {
				if data.len() != 65 {
					return Err(ErrorKind::Encoding("uncompressed SEC pubkey must be 65 bytes".to_string()).into());
				}
				let x = FieldElement::from_be_bytes(&data[1..33]);
				let y = FieldElement::from_be_bytes(&data[33..65]);
				Point::affine(x, y)
			}
			Some(prefix @ (0x02 | 0x03)) => {
				if data.len() != 33 {
					return Err(ErrorKind::Encoding("compressed SEC pubkey must be 33 bytes".to_string()).into());
				}
				let x = FieldElement::from_be_bytes(&data[1..33]);
				let alpha = &(&(&x * &x) * &x) + &FieldElement::from_u64(7);
				let beta = alpha.sqrt();
				let (even_root, odd_root) = if beta.is_even() {
					(beta.clone(), -&beta)
				} else {
					(-&beta, beta.clone())
				};
				let y = if *prefix == 0x02 { even_root } else { odd_root };
				Point::affine(x, y)
			}
			_ => Err(ErrorKind::Encoding("unrecognized SEC pubkey prefix".to_string()).into()),
		}
	}

	/// `hash160` of the uncompressed-or-compressed SEC encoding, as used to
	/// build P2PKH addresses.
	pub fn hash160(&self, compressed: bool) -> Result<[u8; 20], Error> {
		Ok(hash160(&self.to_sec(compressed)?))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sec_round_trip_compressed() {
		let g = Point::generator();
		let sec = g.to_sec(true).unwrap();
		assert_eq!(sec.len(), 33);
		let parsed = Point::parse_sec(&sec).unwrap();
		assert_eq!(parsed, g);
	}

	#[test]
	fn sec_round_trip_uncompressed() {
		let g = Point::generator();
		let sec = g.to_sec(false).unwrap();
		assert_eq!(sec.len(), 65);
		assert_eq!(sec[0], 0x04);
		let parsed = Point::parse_sec(&sec).unwrap();
		assert_eq!(parsed, g);
	}

	#[test]
	fn identity_cannot_be_sec_encoded() {
		assert!(Point::identity().to_sec(true).is_err());
	}
}
