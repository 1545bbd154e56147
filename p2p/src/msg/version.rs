//! The `version` message: first thing either side of a connection sends
//! (§4.8).

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use btcspv_core::encoding::varint::{read_varint, write_varint};

use crate::error::Error;

pub const COMMAND: &str = "version";

/// The protocol version this workspace speaks.
pub const PROTOCOL_VERSION: i32 = 70015;
/// `NODE_NETWORK`: a full node that can serve the complete block chain.
pub const SERVICES_NODE_NETWORK: u64 = 0x01;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct VersionMessage {
	pub version: i32,
	pub services: u64,
	pub timestamp: i64,
	pub receiver_services: u64,
	pub receiver_ip: [u8; 16],
	pub receiver_port: u16,
	pub sender_services: u64,
	pub sender_ip: [u8; 16],
	pub sender_port: u16,
	pub nonce: u64,
	pub user_agent: String,
	pub latest_block: u32,
	pub relay: bool,
}

impl VersionMessage {
	/// An outbound handshake `version`, addressed to `receiver_ip:receiver_port`.
	pub fn new(nonce: u64, latest_block: u32, receiver_ip: [u8; 16], receiver_port: u16) -> VersionMessage {
		VersionMessage {
			version: PROTOCOL_VERSION,
			services: 0,
			timestamp: 0,
			receiver_services: 0,
			receiver_ip,
			receiver_port,
			sender_services: 0,
			sender_ip: [0u8; 16],
			sender_port: 0,
			nonce,
			user_agent: "/btcspv:0.1.0/".to_string(),
			latest_block,
			relay: false,
		}
	}

	pub fn serialize<W: Write>(&self, w: &mut W) -> io::Result<()> {
		w.write_i32::<LittleEndian>(self.version)?;
		w.write_u64::<LittleEndian>(self.services)?;
		w.write_i64::<LittleEndian>(self.timestamp)?;
		w.write_u64::<LittleEndian>(self.receiver_services)?;
		w.write_all(&self.receiver_ip)?;
		w.write_u16::<byteorder::BigEndian>(self.receiver_port)?;
		w.write_u64::<LittleEndian>(self.sender_services)?;
		w.write_all(&self.sender_ip)?;
		w.write_u16::<byteorder::BigEndian>(self.sender_port)?;
		w.write_u64::<LittleEndian>(self.nonce)?;
		write_varint(w, self.user_agent.len() as u64)?;
		w.write_all(self.user_agent.as_bytes())?;
		w.write_u32::<LittleEndian>(self.latest_block)?;
		w.write_u8(self.relay as u8)
	}

	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = Vec::new();
		self.serialize(&mut out).expect("writing to a Vec never fails");
		out
	}

	pub fn parse<R: Read>(r: &mut R) -> Result<VersionMessage, Error> {
		let version = r.read_i32::<LittleEndian>()?;
		let services = r.read_u64::<LittleEndian>()?;
		let timestamp = r.read_i64::<LittleEndian>()?;
		let receiver_services = r.read_u64::<LittleEndian>()?;
		let mut receiver_ip = [0u8; 16];
		r.read_exact(&mut receiver_ip)?;
		let receiver_port = r.read_u16::<byteorder::BigEndian>()?;
		let sender_services = r.read_u64::<LittleEndian>()?;
		let mut sender_ip = [0u8; 16];
		r.read_exact(&mut sender_ip)?;
		let sender_port = r.read_u16::<byteorder::BigEndian>()?;
		let nonce = r.read_u64::<LittleEndian>()?;
		let ua_len = read_varint(r)?;
		let mut ua_bytes = vec![0u8; ua_len as usize];
		r.read_exact(&mut ua_bytes)?;
		let user_agent = String::from_utf8_lossy(&ua_bytes).into_owned();
		let latest_block = r.read_u32::<LittleEndian>()?;
		let relay = r.read_u8()? != 0;
		Ok(VersionMessage {
			version,
			services,
			timestamp,
			receiver_services,
			receiver_ip,
			receiver_port,
			sender_services,
			sender_ip,
			sender_port,
			nonce,
			user_agent,
			latest_block,
			relay,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips() {
		let msg = VersionMessage::new(123456789, 700000, [0u8; 16], 8333);
		let bytes = msg.to_bytes();
		let parsed = VersionMessage::parse(&mut &bytes[..]).unwrap();
		assert_eq!(parsed, msg);
	}
}
