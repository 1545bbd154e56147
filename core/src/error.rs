//! Error taxonomy for `btcspv_core`, grouped by origin the way
//! `chain/src/error.rs` groups chain-validation errors in the teacher repo.

use failure::{Backtrace, Context, Fail};
use std::fmt::{self, Display};
use std::io;

/// Top-level error type. Wraps an [`ErrorKind`] in a `failure::Context` so a
/// backtrace and an optional cause chain survive conversion between layers.
#[derive(Debug)]
pub struct Error {
	inner: Context<ErrorKind>,
}

/// Error kinds, grouped by origin per the error taxonomy.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
	/// Truncated stream, varint overflow, base58 checksum mismatch.
	#[fail(display = "Encoding error: {}", _0)]
	Encoding(String),
	/// Arithmetic between elements of different primes, or sqrt of a
	/// non-residue.
	#[fail(display = "Field domain error: {}", _0)]
	FieldDomain(String),
	/// Point not on curve, or adding points from different curves.
	#[fail(display = "Curve domain error: {}", _0)]
	CurveDomain(String),
	/// Malformed DER, or r/s outside [1, n).
	#[fail(display = "Signature format error: {}", _0)]
	SignatureFormat(String),
	/// ECDSA verify returned false, or script evaluation returned false.
	#[fail(display = "Verification failed: {}", _0)]
	VerifyFailed(String),
	/// Stack underflow, mismatched IF/ENDIF, oversized push, unknown opcode.
	#[fail(display = "Script error: {}", _0)]
	ScriptError(String),
	/// Header hash did not beat its target.
	#[fail(display = "Proof of work invalid: {}", _0)]
	PowInvalid(String),
	/// Wire envelope magic did not match the expected network.
	#[fail(display = "Bad network magic")]
	BadMagic,
	/// Envelope or Base58Check checksum mismatch.
	#[fail(display = "Checksum mismatch")]
	ChecksumMismatch,
	/// Merkle-block hash/flag-bit walk did not consume exactly its inputs.
	#[fail(display = "Malformed merkle proof: {}", _0)]
	MalformedProof(String),
	/// The `PrevTxResolver` could not supply a prior transaction.
	#[fail(display = "Could not fetch previous transaction: {}", _0)]
	FetchError(String),
	/// Underlying I/O error while reading/writing a stream.
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
	/// Returns the classification of this error.
	pub fn kind(&self) -> ErrorKind {
		self.inner.get_context().clone()
	}
}

impl From<ErrorKind> for Error {
	fn from(kind: ErrorKind) -> Error {
		Error {
			inner: Context::new(kind),
		}
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

/// Shorthand used throughout the crate.
pub type Result<T> = ::std::result::Result<T, Error>;
