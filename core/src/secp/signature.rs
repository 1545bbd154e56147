//! ECDSA signature type, DER encoding/decoding and low-S canonicalization
//! (§3, §4.2).

use num_bigint::BigUint;

use crate::error::{Error, ErrorKind};

/// An ECDSA signature `(r, s)`, both reduced mod the curve order `n`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Signature {
	pub r: BigUint,
	pub s: BigUint,
}

impl Signature {
	pub fn new(r: BigUint, s: BigUint) -> Signature {
		Signature { r, s }
	}

	/// DER encodes as `30 Ltot 02 Lr R 02 Ls S`, with a leading `0x00`
	/// prepended to `R`/`S` whenever their high bit is set (keeping the
	/// ASN.1 INTEGER positive).
	pub fn der(&self) -> Vec<u8> {
		let r_bytes = der_integer_bytes(&self.r);
		let s_bytes = der_integer_bytes(&self.s);

		let mut body = Vec::new();
		body.push(0x02);
		body.push(r_bytes.len() as u8);
		body.extend_from_slice(&r_bytes);
		body.push(0x02);
		body.push(s_bytes.len() as u8);
		body.extend_from_slice(&s_bytes);

		let mut out = Vec::with_capacity(body.len() + 2);
		out.push(0x30);
		out.push(body.len() as u8);
		out.extend_from_slice(&body);
		out
	}

	/// Parses a strict DER signature: `30 Ltot 02 Lr R 02 Ls S`.
	pub fn parse_der(data: &[u8]) -> Result<Signature, Error> {
		let mut cursor = Cursor { data, pos: 0 };
		cursor.expect(0x30)?;
		let total_len = cursor.read_u8()? as usize;
		if cursor.remaining() < total_len {
			return Err(ErrorKind::SignatureFormat("DER sequence length exceeds input".to_string()).into());
		}
		let r = cursor.read_der_integer()?;
		let s = cursor.read_der_integer()?;
		if cursor.pos != 2 + total_len {
			return Err(ErrorKind::SignatureFormat("trailing bytes after DER signature".to_string()).into());
		}
		Ok(Signature { r, s })
	}
}

/// Big-endian, leading-zero-stripped encoding of `n`, with a single `0x00`
/// prepended if the high bit of the first byte would otherwise be set.
fn der_integer_bytes(n: &BigUint) -> Vec<u8> {
	let mut bytes = n.to_bytes_be();
	if bytes.is_empty() {
		bytes.push(0);
	}
	if bytes[0] & 0x80 != 0 {
		let mut padded = Vec::with_capacity(bytes.len() + 1);
		padded.push(0x00);
		padded.extend_from_slice(&bytes);
		bytes = padded;
	}
	bytes
}

struct Cursor<'a> {
	data: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	fn remaining(&self) -> usize {
		self.data.len() - self.pos
	}

	fn read_u8(&mut self) -> Result<u8, Error> {
		if self.pos >= self.data.len() {
			return Err(ErrorKind::SignatureFormat("truncated DER signature".to_string()).into());
		}
		let b = self.data[self.pos];
		self.pos += 1;
		Ok(b)
	}

	fn expect(&mut self, want: u8) -> Result<(), Error> {
		let got = self.read_u8()?;
		if got != want {
			return Err(ErrorKind::SignatureFormat(format!("expected byte 0x{:02x}, got 0x{:02x}", want, got)).into());
		}
		Ok(())
	}

	fn read_der_integer(&mut self) -> Result<BigUint, Error> {
		self.expect(0x02)?;
		let len = self.read_u8()? as usize;
		if self.remaining() < len {
			return Err(ErrorKind::SignatureFormat("DER integer length exceeds input".to_string()).into());
		}
		let bytes = &self.data[self.pos..self.pos + len];
		self.pos += len;
		Ok(BigUint::from_bytes_be(bytes))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn der_round_trip() {
		let sig = Signature::new(BigUint::from(37u32), BigUint::from(255u32));
		let der = sig.der();
		let parsed = Signature::parse_der(&der).unwrap();
		assert_eq!(sig, parsed);
	}

	#[test]
	fn high_bit_gets_zero_padded() {
		// 0xFF alone would look negative in two's-complement ASN.1, so DER
		// must prepend a 0x00.
		let sig = Signature::new(BigUint::from(0xFFu32), BigUint::from(1u32));
		let der = sig.der();
		// 30 len 02 02 00 ff 02 01 01
		assert_eq!(der, vec![0x30, 0x08, 0x02, 0x02, 0x00, 0xff, 0x02, 0x01, 0x01]);
	}

	#[test]
	fn rejects_truncated_input() {
		assert!(Signature::parse_der(&[0x30, 0x05, 0x02]).is_err());
	}
}
