//! Script command list: parse/serialize between the wire byte form and the
//! tagged `Command` list (§3/§4.3).
//!
//! Grounded on `pkg/bitcoin/script/script.go`'s top-level `Script` type, but
//! modeled per the spec's design note as a tagged `Op(u8) | Data(Vec<u8>)`
//! variant rather than parallel opcode/data fields.

use std::io::{self, Read, Write};

use super::opcodes::{OP_PUSHDATA1, OP_PUSHDATA2, OP_PUSHDATA4};
use crate::encoding::varint::{read_varint, write_varint};
use crate::error::{Error, ErrorKind};

/// One element of a script: either an opcode byte or a pushed data element
/// (1..520 bytes).
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Command {
	Op(u8),
	Data(Vec<u8>),
}

/// An ordered sequence of [`Command`]s.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Script(pub Vec<Command>);

impl Script {
	pub fn new(commands: Vec<Command>) -> Script {
		Script(commands)
	}

	pub fn commands(&self) -> &[Command] {
		&self.0
	}

	/// Concatenates `self` and `other`'s commands (used to splice a
	/// redeem/witness script onto `scriptSig ‖ scriptPubKey`).
	pub fn append(&self, other: &Script) -> Script {
		let mut commands = self.0.clone();
		commands.extend(other.0.iter().cloned());
		Script(commands)
	}

	/// Encodes just the command bytes, with no length prefix.
	pub fn raw_serialize(&self) -> Vec<u8> {
		let mut out = Vec::new();
		for cmd in &self.0 {
			match cmd {
				Command::Op(op) => out.push(*op),
				Command::Data(data) => {
					let len = data.len();
					if len < 76 {
						out.push(len as u8);
					} else if len <= 0xff {
						out.push(OP_PUSHDATA1);
						out.push(len as u8);
					} else if len <= 0xffff {
						out.push(OP_PUSHDATA2);
						out.extend_from_slice(&(len as u16).to_le_bytes());
					} else {
						out.push(OP_PUSHDATA4);
						out.extend_from_slice(&(len as u32).to_le_bytes());
					}
					out.extend_from_slice(data);
				}
			}
		}
		out
	}

	/// `varint(len(raw)) ‖ raw`.
	pub fn serialize<W: Write>(&self, w: &mut W) -> io::Result<()> {
		let raw = self.raw_serialize();
		write_varint(w, raw.len() as u64)?;
		w.write_all(&raw)
	}

	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = Vec::new();
		self.serialize(&mut out).expect("writing to a Vec never fails");
		out
	}

	/// Parses a length-prefixed script from a stream.
	pub fn parse<R: Read>(r: &mut R) -> Result<Script, Error> {
		let length = read_varint(r)?;
		let mut body = vec![0u8; length as usize];
		r.read_exact(&mut body)?;
		Script::parse_raw(&body)
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<Script, Error> {
		Script::parse(&mut &bytes[..])
	}

	/// Parses an already-length-delimited command byte buffer (no varint
	/// prefix), the form used for a pushed-and-reparsed redeem/witness
	/// script.
	pub fn parse_raw(body: &[u8]) -> Result<Script, Error> {
		let mut commands = Vec::new();
		let mut pos = 0usize;
		while pos < body.len() {
			let b = body[pos];
			pos += 1;
			match b {
				0x00 => commands.push(Command::Data(Vec::new())),
				1..=75 => {
					let len = b as usize;
					let data = read_n(body, &mut pos, len)?;
					commands.push(Command::Data(data));
				}
				OP_PUSHDATA1 => {
					let len = read_n(body, &mut pos, 1)?[0] as usize;
					let data = read_n(body, &mut pos, len)?;
					commands.push(Command::Data(data));
				}
				OP_PUSHDATA2 => {
					let len_bytes = read_n(body, &mut pos, 2)?;
					let len = u16::from_le_bytes([len_bytes[0], len_bytes[1]]) as usize;
					let data = read_n(body, &mut pos, len)?;
					commands.push(Command::Data(data));
				}
				OP_PUSHDATA4 => {
					let len_bytes = read_n(body, &mut pos, 4)?;
					let len = u32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]) as usize;
					if len > 520 {
						return Err(ErrorKind::ScriptError("push exceeds 520 bytes".to_string()).into());
					}
					let data = read_n(body, &mut pos, len)?;
					commands.push(Command::Data(data));
				}
				op => commands.push(Command::Op(op)),
			}
		}
		Ok(Script(commands))
	}
}

fn read_n(body: &[u8], pos: &mut usize, len: usize) -> Result<Vec<u8>, Error> {
	if *pos + len > body.len() {
		return Err(ErrorKind::ScriptError("push length exceeds script body".to_string()).into());
	}
	let out = body[*pos..*pos + len].to_vec();
	*pos += len;
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn s2_script_parse_two_data_pushes() {
		// S2 from spec.md describes a scriptSig of one DER+sighash signature
		// (71 bytes, pushed with a bare length byte 0x47) followed by one
		// compressed pubkey (33 bytes, pushed with 0x21); the vector itself
		// is prose-truncated, so this test builds an equivalent shape and
		// checks the bare-length push framing the spec describes.
		let sig = vec![0x30u8; 71];
		let pubkey = vec![0x02u8; 33];
		let script = Script::new(vec![Command::Data(sig.clone()), Command::Data(pubkey.clone())]);
		let raw = script.raw_serialize();
		assert_eq!(raw[0], 71);
		assert_eq!(raw[1..72], sig[..]);
		assert_eq!(raw[72], 33);
		assert_eq!(raw[73..106], pubkey[..]);

		let parsed = Script::parse_raw(&raw).unwrap();
		assert_eq!(parsed, script);
	}

	#[test]
	fn round_trip_with_opcode_and_data() {
		let script = Script::new(vec![Command::Op(0x76), Command::Op(0xa9), Command::Data(vec![0xab; 20])]);
		let bytes = script.to_bytes();
		let parsed = Script::parse(&mut &bytes[..]).unwrap();
		assert_eq!(parsed, script);
	}

	#[test]
	fn pushdata1_round_trips_for_a_76_byte_push() {
		let data = vec![0x07u8; 76];
		let script = Script::new(vec![Command::Data(data.clone())]);
		let raw = script.raw_serialize();
		assert_eq!(raw[0], OP_PUSHDATA1);
		assert_eq!(raw[1], 76);
		let parsed = Script::parse_raw(&raw).unwrap();
		assert_eq!(parsed.0[0], Command::Data(data));
	}

	#[test]
	fn truncated_push_is_an_error() {
		assert!(Script::parse_raw(&[5, 1, 2]).is_err());
	}
}
