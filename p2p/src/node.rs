//! A synchronous connection to a single peer (§4.8, §5): handshake, a
//! blocking `wait_for`, and the `fetch_headers` convenience built on top.
//!
//! Grounded on `pkg/bitcoin/network/node/simple/simple.go`'s `Node{Testnet,
//! Host, Port, Socket}` and its `Send`/`Read`/`WaitFor` loop; generalized
//! from a concrete `net.Conn` to any `Read + Write` byte-stream, and
//! extended with `Handshake` and `fetch_headers` per this crate's
//! synchronous single-peer concurrency model.

use std::io::{Read, Write};

use btcspv_core::block::header::BlockHeader;
use btcspv_core::encoding::hash::Hash256;
use btcspv_core::ChainParams;

use crate::envelope::Envelope;
use crate::error::{Error, ErrorKind};
use crate::msg::{GetHeadersMessage, Message, PingMessage, VersionMessage};

/// Owns exactly one byte-stream to one peer (§5): no internal threads, no
/// background I/O. Not `Sync` with itself — a caller wanting parallelism
/// runs independent `Node`s over independent streams.
pub struct Node<S> {
	stream: S,
	params: ChainParams,
	nonce: u64,
}

impl<S: Read + Write> Node<S> {
	pub fn new(stream: S, params: ChainParams, nonce: u64) -> Node<S> {
		Node { stream, params, nonce }
	}

	/// Serializes `message` as an envelope and writes it to the peer.
	pub fn send(&mut self, message: &Message) -> Result<(), Error> {
		let envelope = message.to_envelope();
		envelope.serialize(&mut self.stream, &self.params)?;
		Ok(())
	}

	/// Reads one framed envelope from the peer.
	pub fn read_envelope(&mut self) -> Result<Envelope, Error> {
		Envelope::parse(&mut self.stream, &self.params)
	}

	/// Blocks until an envelope with the given command arrives, servicing
	/// `ping`/`version` overhead messages from the peer along the way.
	/// Mirrors the teacher's synchronous `WaitFor` loop.
	pub fn wait_for(&mut self, command: &str) -> Result<Message, Error> {
		loop {
			let envelope = self.read_envelope()?;
			if envelope.command == command {
				return Message::from_envelope(&envelope);
			}
			self.service_overhead(&envelope)?;
		}
	}

	/// Handles the messages a peer may send unprompted: replies `pong` to a
	/// `ping`, replies `verack` to a `version`; anything else is dropped.
	fn service_overhead(&mut self, envelope: &Envelope) -> Result<(), Error> {
		match Message::from_envelope(envelope)? {
			Message::Ping(ping) => self.send(&Message::Pong(ping.pong())),
			Message::Version(_) => self.send(&Message::Verack),
			_ => Ok(()),
		}
	}

	/// Sends our `version`, then waits until both the peer's `version` and
	/// `verack` have been observed, replying `verack` to the peer's
	/// `version` along the way (§4.8's `Handshake`).
	pub fn handshake(&mut self, latest_block: u32) -> Result<(), Error> {
		let version = VersionMessage::new(self.nonce, latest_block, [0u8; 16], self.params.port);
		self.send(&Message::Version(version))?;
		log::debug!("sent version, awaiting peer's version/verack");

		let mut saw_version = false;
		let mut saw_verack = false;
		while !saw_version || !saw_verack {
			let envelope = self.read_envelope()?;
			match Message::from_envelope(&envelope)? {
				Message::Version(peer_version) => {
					log::debug!("peer version {} user_agent {:?}", peer_version.version, peer_version.user_agent);
					saw_version = true;
					self.send(&Message::Verack)?;
				}
				Message::Verack => saw_verack = true,
				Message::Ping(ping) => self.send(&Message::Pong(ping.pong()))?,
				_ => {}
			}
		}
		log::info!("handshake complete");
		Ok(())
	}

	/// Requests headers starting after `start_block` and returns whatever
	/// batch the peer replies with.
	pub fn fetch_headers(&mut self, start_block: Hash256) -> Result<Vec<BlockHeader>, Error> {
		let request = GetHeadersMessage::new(VersionMessage::new(self.nonce, 0, [0u8; 16], self.params.port).version as u32, start_block);
		self.send(&Message::GetHeaders(request))?;
		match self.wait_for("headers")? {
			Message::Headers(headers) => Ok(headers.headers),
			_ => Err(ErrorKind::ConnectionClosed.into()),
		}
	}

	/// Sends a `ping` and blocks until the matching `pong` arrives.
	pub fn ping(&mut self, nonce: u64) -> Result<(), Error> {
		self.send(&Message::Ping(PingMessage::new(nonce)))?;
		match self.wait_for("pong")? {
			Message::Pong(pong) if pong.nonce == nonce => Ok(()),
			Message::Pong(_) => Err(ErrorKind::HandshakeFailed("pong nonce did not match our ping".to_string()).into()),
			_ => unreachable!("wait_for only returns the requested command"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Cursor;

	/// An in-memory duplex: reads come from `inbound`, writes go to `outbound`.
	struct MockStream {
		inbound: Cursor<Vec<u8>>,
		outbound: Vec<u8>,
	}

	impl Read for MockStream {
		fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
			self.inbound.read(buf)
		}
	}

	impl Write for MockStream {
		fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
			self.outbound.write(buf)
		}
		fn flush(&mut self) -> std::io::Result<()> {
			Ok(())
		}
	}

	fn scripted_inbound(envelopes: &[Envelope], params: &ChainParams) -> Vec<u8> {
		let mut buf = Vec::new();
		for envelope in envelopes {
			envelope.serialize(&mut buf, params).unwrap();
		}
		buf
	}

	#[test]
	fn handshake_replies_verack_to_peers_version_and_completes() {
		let params = ChainParams::mainnet();
		let peer_version = VersionMessage::new(1, 0, [0u8; 16], params.port);
		let inbound = scripted_inbound(
			&[Message::Version(peer_version).to_envelope(), Message::Verack.to_envelope()],
			&params,
		);
		let mut node = Node::new(
			MockStream {
				inbound: Cursor::new(inbound),
				outbound: Vec::new(),
			},
			params,
			42,
		);
		node.handshake(0).unwrap();
		let sent = Envelope::parse(&mut &node.stream.outbound[..], &node.params).unwrap();
		assert_eq!(sent.command, "version");
	}

	#[test]
	fn wait_for_skips_pings_and_returns_the_requested_command() {
		let params = ChainParams::mainnet();
		let inbound = scripted_inbound(
			&[
				Message::Ping(PingMessage::new(7)).to_envelope(),
				Message::Pong(crate::msg::PongMessage::new(99)).to_envelope(),
			],
			&params,
		);
		let mut node = Node::new(
			MockStream {
				inbound: Cursor::new(inbound),
				outbound: Vec::new(),
			},
			params,
			1,
		);
		let message = node.wait_for("pong").unwrap();
		assert_eq!(message, Message::Pong(crate::msg::PongMessage::new(99)));
	}
}
