//! The `getheaders` request: a single block-locator hash and an optional
//! stop hash (§4.8). Grounded on
//! `pkg/bitcoin/network/messages/getheaders.go`'s `GetHeaders`.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use btcspv_core::encoding::hash::Hash256;
use btcspv_core::encoding::varint::{read_varint, write_varint};

use crate::error::Error;

pub const COMMAND: &str = "getheaders";

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GetHeadersMessage {
	pub version: u32,
	pub start_block: Hash256,
	/// All-zero requests as many headers as the peer is willing to send.
	pub end_block: Hash256,
}

impl GetHeadersMessage {
	pub fn new(version: u32, start_block: Hash256) -> GetHeadersMessage {
		GetHeadersMessage {
			version,
			start_block,
			end_block: Hash256::from_bytes(&[0u8; 32]),
		}
	}

	pub fn serialize<W: Write>(&self, w: &mut W) -> io::Result<()> {
		w.write_u32::<LittleEndian>(self.version)?;
		write_varint(w, 1)?;
		w.write_all(self.start_block.as_bytes())?;
		w.write_all(self.end_block.as_bytes())
	}

	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = Vec::new();
		self.serialize(&mut out).expect("writing to a Vec never fails");
		out
	}

	pub fn parse<R: Read>(r: &mut R) -> Result<GetHeadersMessage, Error> {
		let version = r.read_u32::<LittleEndian>()?;
		let num_hashes = read_varint(r)?;
		if num_hashes != 1 {
			return Err(crate::error::ErrorKind::MalformedHeaders("getheaders with other than one locator hash is unsupported".to_string()).into());
		}
		let mut start_block = [0u8; 32];
		r.read_exact(&mut start_block)?;
		let mut end_block = [0u8; 32];
		r.read_exact(&mut end_block)?;
		Ok(GetHeadersMessage {
			version,
			start_block: Hash256::from_bytes(&start_block),
			end_block: Hash256::from_bytes(&end_block),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips() {
		let msg = GetHeadersMessage::new(70015, Hash256::from_bytes(&[0xab; 32]));
		let bytes = msg.to_bytes();
		let parsed = GetHeadersMessage::parse(&mut &bytes[..]).unwrap();
		assert_eq!(parsed, msg);
	}
}
