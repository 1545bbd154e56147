//! The wire envelope every message travels in (§4.8): 4-byte magic, 12-byte
//! ASCII command, 4-byte payload length, 4-byte checksum, payload.
//!
//! Grounded on the teacher's `p2p/src/msg.rs` `MsgHeader` (magic + type byte,
//! `acceptable()` validity check), generalized to Bitcoin's longer
//! NUL-padded command string and `hash256`-based checksum instead of a
//! fixed one-byte type tag.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use btcspv_core::encoding::hash256;
use btcspv_core::ChainParams;

use crate::error::{Error, ErrorKind};

const COMMAND_LEN: usize = 12;

/// A framed wire message: a command name and its raw (not-yet-parsed)
/// payload bytes.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Envelope {
	pub command: String,
	pub payload: Vec<u8>,
}

impl Envelope {
	pub fn new(command: &str, payload: Vec<u8>) -> Envelope {
		Envelope {
			command: command.to_string(),
			payload,
		}
	}

	/// `magic ‖ command(12, NUL-padded) ‖ len_u32_LE ‖ checksum4 ‖ payload`.
	pub fn serialize<W: Write>(&self, w: &mut W, params: &ChainParams) -> io::Result<()> {
		w.write_all(&params.magic)?;
		w.write_all(&command_bytes(&self.command))?;
		w.write_u32::<LittleEndian>(self.payload.len() as u32)?;
		w.write_all(&checksum(&self.payload))?;
		w.write_all(&self.payload)
	}

	pub fn to_bytes(&self, params: &ChainParams) -> Vec<u8> {
		let mut out = Vec::new();
		self.serialize(&mut out, params).expect("writing to a Vec never fails");
		out
	}

	/// Reads and validates one envelope off `r`, checking `magic` against
	/// `params` and the checksum against the payload actually received.
	pub fn parse<R: Read>(r: &mut R, params: &ChainParams) -> Result<Envelope, Error> {
		let mut magic = [0u8; 4];
		r.read_exact(&mut magic)?;
		if magic != params.magic {
			log::warn!("envelope magic {:02x?} did not match expected {:02x?}", magic, params.magic);
			return Err(ErrorKind::BadMagic.into());
		}

		let mut command_raw = [0u8; COMMAND_LEN];
		r.read_exact(&mut command_raw)?;
		let command = parse_command(&command_raw);

		let length = r.read_u32::<LittleEndian>()?;
		let mut expected_checksum = [0u8; 4];
		r.read_exact(&mut expected_checksum)?;

		let mut payload = vec![0u8; length as usize];
		r.read_exact(&mut payload)?;

		if checksum(&payload) != expected_checksum {
			log::warn!("checksum mismatch on {} envelope ({} byte payload)", command, payload.len());
			return Err(ErrorKind::ChecksumMismatch.into());
		}

		log::trace!("received {} envelope ({} byte payload)", command, payload.len());
		Ok(Envelope { command, payload })
	}
}

fn command_bytes(command: &str) -> [u8; COMMAND_LEN] {
	let mut out = [0u8; COMMAND_LEN];
	let bytes = command.as_bytes();
	let n = bytes.len().min(COMMAND_LEN);
	out[..n].copy_from_slice(&bytes[..n]);
	out
}

fn parse_command(raw: &[u8; COMMAND_LEN]) -> String {
	let end = raw.iter().position(|&b| b == 0).unwrap_or(COMMAND_LEN);
	String::from_utf8_lossy(&raw[..end]).into_owned()
}

fn checksum(payload: &[u8]) -> [u8; 4] {
	let digest = hash256(payload);
	let mut out = [0u8; 4];
	out.copy_from_slice(&digest.as_bytes()[..4]);
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips() {
		let params = ChainParams::mainnet();
		let envelope = Envelope::new("verack", Vec::new());
		let bytes = envelope.to_bytes(&params);
		let parsed = Envelope::parse(&mut &bytes[..], &params).unwrap();
		assert_eq!(parsed, envelope);
	}

	#[test]
	fn command_is_nul_padded_and_trimmed() {
		let params = ChainParams::mainnet();
		let envelope = Envelope::new("ping", vec![1, 2, 3, 4, 5, 6, 7, 8]);
		let bytes = envelope.to_bytes(&params);
		assert_eq!(&bytes[4..8], b"ping");
		assert_eq!(&bytes[8..16], &[0u8; 8]);
		let parsed = Envelope::parse(&mut &bytes[..], &params).unwrap();
		assert_eq!(parsed.command, "ping");
	}

	#[test]
	fn wrong_magic_is_rejected() {
		let bytes = Envelope::new("verack", Vec::new()).to_bytes(&ChainParams::testnet());
		assert!(Envelope::parse(&mut &bytes[..], &ChainParams::mainnet()).is_err());
	}

	#[test]
	fn tampered_payload_fails_checksum() {
		let params = ChainParams::mainnet();
		let mut bytes = Envelope::new("ping", vec![1, 2, 3, 4, 5, 6, 7, 8]).to_bytes(&params);
		let last = bytes.len() - 1;
		bytes[last] ^= 0xff;
		assert!(Envelope::parse(&mut &bytes[..], &params).is_err());
	}
}
