//! Error taxonomy for `btcspv_p2p`, mirroring `btcspv_core::error`'s
//! `Context<ErrorKind>`-over-`failure` shape.

use failure::{Backtrace, Context, Fail};
use std::fmt::{self, Display};
use std::io;

#[derive(Debug)]
pub struct Error {
	inner: Context<ErrorKind>,
}

#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
	/// A message's core type (envelope, header, transaction) failed to parse.
	#[fail(display = "Core error: {}", _0)]
	Core(String),
	/// Envelope magic did not match the expected network.
	#[fail(display = "Bad network magic")]
	BadMagic,
	/// Envelope checksum did not match `hash256(payload)[0..4]`.
	#[fail(display = "Checksum mismatch")]
	ChecksumMismatch,
	/// The peer's `version`/`verack` handshake did not complete.
	#[fail(display = "Handshake failed: {}", _0)]
	HandshakeFailed(String),
	/// `WaitFor` was asked for a command this connection never received.
	#[fail(display = "Connection closed before an expected message arrived")]
	ConnectionClosed,
	/// A `headers` reply carried a non-zero tx_count, which violates §4.8.
	#[fail(display = "Malformed headers reply: {}", _0)]
	MalformedHeaders(String),
	/// Underlying I/O error on the peer's byte-stream.
	#[fail(display = "I/O error: {}", _0)]
	Io(String),
}

impl Fail for Error {
	fn cause(&self) -> Option<&dyn Fail> {
		self.inner.cause()
	}

	fn backtrace(&self) -> Option<&Backtrace> {
		self.inner.backtrace()
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		Display::fmt(&self.inner, f)
	}
}

impl Error {
	pub fn kind(&self) -> ErrorKind {
		self.inner.get_context().clone()
	}
}

impl From<ErrorKind> for Error {
	fn from(kind: ErrorKind) -> Error {
		Error { inner: Context::new(kind) }
	}
}

impl From<Context<ErrorKind>> for Error {
	fn from(inner: Context<ErrorKind>) -> Error {
		Error { inner }
	}
}

impl From<io::Error> for Error {
	fn from(error: io::Error) -> Error {
		Error {
			inner: Context::new(ErrorKind::Io(error.to_string())),
		}
	}
}

impl From<btcspv_core::Error> for Error {
	fn from(error: btcspv_core::Error) -> Error {
		Error {
			inner: Context::new(ErrorKind::Core(error.to_string())),
		}
	}
}

pub type Result<T> = ::std::result::Result<T, Error>;
