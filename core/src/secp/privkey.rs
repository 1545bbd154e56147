//! Private key type: signing, the public key it derives, and the WIF/
//! address round-trip helpers (§4.1/§4.2/§6).
//!
//! Grounded on `pkg/ecc/curves/secp256k1`'s `PrivateKey`/address helpers,
//! reworked onto this crate's `BigUint`-backed field/curve types.

use num_bigint::BigUint;

use super::ecdsa;
use super::point::Point;
use super::signature::Signature;
use crate::encoding::base58::{decode_base58check, encode_base58check};
use crate::error::{Error, ErrorKind};
use crate::params::ChainParams;

/// A secp256k1 secret scalar together with the public point it derives.
/// Owns its secret exclusively; nothing else in this crate clones it except
/// through the explicit [`PrivateKey::secret`] accessor.
#[derive(Clone)]
pub struct PrivateKey {
	secret: BigUint,
	public_key: Point,
}

impl PrivateKey {
	pub fn from_secret(secret: BigUint) -> PrivateKey {
		let public_key = Point::generator().scalar_mul(&secret);
		PrivateKey { secret, public_key }
	}

	pub fn secret(&self) -> &BigUint {
		&self.secret
	}

	pub fn public_key(&self) -> &Point {
		&self.public_key
	}

	/// Signs `z` with RFC 6979 deterministic `k`.
	pub fn sign(&self, z: &BigUint) -> Signature {
		ecdsa::sign(&self.secret, z)
	}

	/// Encodes as Wallet Import Format: `Base58Check(version ‖ secret32 ‖
	/// [0x01 if compressed])`.
	pub fn to_wif(&self, compressed: bool, params: &ChainParams) -> String {
		let mut payload = Vec::with_capacity(34);
		payload.push(params.wif_version);
		let mut secret_bytes = self.secret.to_bytes_be();
		if secret_bytes.len() < 32 {
			let mut padded = vec![0u8; 32 - secret_bytes.len()];
			padded.extend_from_slice(&secret_bytes);
			secret_bytes = padded;
		}
		payload.extend_from_slice(&secret_bytes);
		if compressed {
			payload.push(0x01);
		}
		encode_base58check(&payload)
	}

	/// Decodes a WIF string, inferring compression from its length and the
	/// network from the version byte matching `params`.
	pub fn from_wif(wif: &str, params: &ChainParams) -> Result<(PrivateKey, bool), Error> {
		let payload = decode_base58check(wif)?;
		if payload.is_empty() || payload[0] != params.wif_version {
			return Err(ErrorKind::Encoding("WIF version byte does not match the expected network".to_string()).into());
		}
		let (secret_bytes, compressed) = match payload.len() {
			34 => (&payload[1..33], true),
			33 => (&payload[1..33], false),
			_ => return Err(ErrorKind::Encoding("WIF payload has an unexpected length".to_string()).into()),
		};
		let secret = BigUint::from_bytes_be(secret_bytes);
		Ok((PrivateKey::from_secret(secret), compressed))
	}

	/// The P2PKH address (Base58Check of `version ‖ hash160(SEC pubkey)`).
	pub fn address(&self, compressed: bool, params: &ChainParams) -> Result<String, Error> {
		let h160 = self.public_key.hash160(compressed)?;
		let mut payload = Vec::with_capacity(21);
		payload.push(params.p2pkh_version);
		payload.extend_from_slice(&h160);
		Ok(encode_base58check(&payload))
	}
}
