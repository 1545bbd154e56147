//! The `headers` reply: a batch of block headers, each followed by a
//! transaction count that a `headers`-only response always sets to zero
//! (§4.8).

use std::io::{Read, Write};

use btcspv_core::block::header::BlockHeader;
use btcspv_core::encoding::varint::{read_varint, write_varint};

use crate::error::{Error, ErrorKind};

pub const COMMAND: &str = "headers";

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct HeadersMessage {
	pub headers: Vec<BlockHeader>,
}

impl HeadersMessage {
	pub fn new(headers: Vec<BlockHeader>) -> HeadersMessage {
		HeadersMessage { headers }
	}

	pub fn serialize<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
		write_varint(w, self.headers.len() as u64)?;
		for header in &self.headers {
			header.serialize(w)?;
			write_varint(w, 0)?;
		}
		Ok(())
	}

	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = Vec::new();
		self.serialize(&mut out).expect("writing to a Vec never fails");
		out
	}

	pub fn parse<R: Read>(r: &mut R) -> Result<HeadersMessage, Error> {
		let count = read_varint(r)?;
		let mut headers = Vec::with_capacity(count as usize);
		for _ in 0..count {
			let header = BlockHeader::parse(r)?;
			let tx_count = read_varint(r)?;
			if tx_count != 0 {
				return Err(ErrorKind::MalformedHeaders(format!("headers reply carried {} transactions for a header", tx_count)).into());
			}
			headers.push(header);
		}
		Ok(HeadersMessage { headers })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use btcspv_core::encoding::hash::Hash256;

	fn sample_header(nonce: u32) -> BlockHeader {
		BlockHeader {
			version: 1,
			prev_block: Hash256::from_bytes(&[0u8; 32]),
			merkle_root: Hash256::from_bytes(&[1u8; 32]),
			timestamp: 1_231_006_505,
			bits: 0x1d00ffff,
			nonce,
		}
	}

	#[test]
	fn round_trips_with_two_headers() {
		let msg = HeadersMessage::new(vec![sample_header(1), sample_header(2)]);
		let bytes = msg.to_bytes();
		let parsed = HeadersMessage::parse(&mut &bytes[..]).unwrap();
		assert_eq!(parsed, msg);
	}

	#[test]
	fn nonzero_tx_count_is_rejected() {
		let mut bytes = HeadersMessage::new(vec![sample_header(1)]).to_bytes();
		let last = bytes.len() - 1;
		bytes[last] = 1;
		assert!(HeadersMessage::parse(&mut &bytes[..]).is_err());
	}
}
