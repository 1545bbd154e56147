//! `ping`/`pong`: an 8-byte nonce each, used as a liveness check and echoed
//! back verbatim (§4.8).

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::Error;

pub const PING_COMMAND: &str = "ping";
pub const PONG_COMMAND: &str = "pong";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PingMessage {
	pub nonce: u64,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PongMessage {
	pub nonce: u64,
}

impl PingMessage {
	pub fn new(nonce: u64) -> PingMessage {
		PingMessage { nonce }
	}

	pub fn serialize<W: Write>(&self, w: &mut W) -> io::Result<()> {
		w.write_u64::<LittleEndian>(self.nonce)
	}

	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = Vec::new();
		self.serialize(&mut out).expect("writing to a Vec never fails");
		out
	}

	pub fn parse<R: Read>(r: &mut R) -> Result<PingMessage, Error> {
		Ok(PingMessage { nonce: r.read_u64::<LittleEndian>()? })
	}

	/// The `pong` reply to this `ping`: same nonce, verbatim.
	pub fn pong(&self) -> PongMessage {
		PongMessage { nonce: self.nonce }
	}
}

impl PongMessage {
	pub fn new(nonce: u64) -> PongMessage {
		PongMessage { nonce }
	}

	pub fn serialize<W: Write>(&self, w: &mut W) -> io::Result<()> {
		w.write_u64::<LittleEndian>(self.nonce)
	}

	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = Vec::new();
		self.serialize(&mut out).expect("writing to a Vec never fails");
		out
	}

	pub fn parse<R: Read>(r: &mut R) -> Result<PongMessage, Error> {
		Ok(PongMessage { nonce: r.read_u64::<LittleEndian>()? })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pong_echoes_pings_nonce() {
		let ping = PingMessage::new(0xdead_beef);
		let bytes = ping.to_bytes();
		let parsed = PingMessage::parse(&mut &bytes[..]).unwrap();
		assert_eq!(parsed.pong().nonce, ping.nonce);
	}
}
