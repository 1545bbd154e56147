//! Typed wire messages (§4.8): `version`, `verack`, `ping`/`pong`,
//! `getheaders`, `headers`. [`Message`] is the payload a parsed
//! [`crate::envelope::Envelope`] is decoded into.

pub mod getheaders;
pub mod headers;
pub mod ping_pong;
pub mod verack;
pub mod version;

pub use getheaders::GetHeadersMessage;
pub use headers::HeadersMessage;
pub use ping_pong::{PingMessage, PongMessage};
pub use verack::VerackMessage;
pub use version::VersionMessage;

use crate::envelope::Envelope;
use crate::error::Error;

/// A decoded message, tagged by which of the wire commands it came from.
/// `Unknown` carries anything this workspace does not otherwise model so
/// `Node::wait_for` can still recognize and skip it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Message {
	Version(VersionMessage),
	Verack,
	Ping(PingMessage),
	Pong(PongMessage),
	GetHeaders(GetHeadersMessage),
	Headers(HeadersMessage),
	Unknown(String),
}

impl Message {
	pub fn command(&self) -> &str {
		match self {
			Message::Version(_) => version::COMMAND,
			Message::Verack => verack::COMMAND,
			Message::Ping(_) => ping_pong::PING_COMMAND,
			Message::Pong(_) => ping_pong::PONG_COMMAND,
			Message::GetHeaders(_) => getheaders::COMMAND,
			Message::Headers(_) => headers::COMMAND,
			Message::Unknown(command) => command,
		}
	}

	/// Wraps `self`'s serialization in an envelope under its own command.
	pub fn to_envelope(&self) -> Envelope {
		let payload = match self {
			Message::Version(m) => m.to_bytes(),
			Message::Verack => VerackMessage.to_bytes(),
			Message::Ping(m) => m.to_bytes(),
			Message::Pong(m) => m.to_bytes(),
			Message::GetHeaders(m) => m.to_bytes(),
			Message::Headers(m) => m.to_bytes(),
			Message::Unknown(_) => Vec::new(),
		};
		Envelope::new(self.command(), payload)
	}

	/// Decodes `envelope`'s payload according to its command string.
	/// Commands this workspace does not model parse to `Unknown`.
	pub fn from_envelope(envelope: &Envelope) -> Result<Message, Error> {
		let mut cursor = &envelope.payload[..];
		let message = match envelope.command.as_str() {
			version::COMMAND => Message::Version(VersionMessage::parse(&mut cursor)?),
			verack::COMMAND => Message::Verack,
			ping_pong::PING_COMMAND => Message::Ping(PingMessage::parse(&mut cursor)?),
			ping_pong::PONG_COMMAND => Message::Pong(PongMessage::parse(&mut cursor)?),
			getheaders::COMMAND => Message::GetHeaders(GetHeadersMessage::parse(&mut cursor)?),
			headers::COMMAND => Message::Headers(HeadersMessage::parse(&mut cursor)?),
			other => Message::Unknown(other.to_string()),
		};
		Ok(message)
	}
}
