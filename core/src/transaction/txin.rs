//! Transaction input: previous outpoint, scriptSig, sequence and (for
//! SegWit spends) witness stack (§3/§4.4).

use std::io::{self, Read, Write};

use crate::encoding::bytes::{read_u32_le, write_u32_le};
use crate::encoding::hash::Hash256;
use crate::encoding::varint::{read_varint, write_varint};
use crate::error::Error;
use crate::script::Script;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TxIn {
	pub prev_txid: Hash256,
	pub prev_vout: u32,
	pub script_sig: Script,
	pub sequence: u32,
	/// Present only for SegWit spends; empty for legacy inputs.
	pub witness: Vec<Vec<u8>>,
}

impl TxIn {
	pub fn new(prev_txid: Hash256, prev_vout: u32, script_sig: Script, sequence: u32) -> TxIn {
		TxIn {
			prev_txid,
			prev_vout,
			script_sig,
			sequence,
			witness: Vec::new(),
		}
	}

	/// `true` iff this is the sole input of a coinbase transaction:
	/// `prev_txid = 0` and `prev_vout = 0xFFFFFFFF`.
	pub fn is_coinbase_prevout(&self) -> bool {
		self.prev_txid.as_bytes() == &[0u8; 32] && self.prev_vout == 0xFFFF_FFFF
	}

	/// Serializes the non-witness portion: `prev_txid_LE32 ‖
	/// prev_vout_u32_LE ‖ script_sig ‖ sequence_u32_LE`.
	pub fn serialize<W: Write>(&self, w: &mut W) -> io::Result<()> {
		w.write_all(self.prev_txid.as_bytes())?;
		write_u32_le(w, self.prev_vout)?;
		self.script_sig.serialize(w)?;
		write_u32_le(w, self.sequence)
	}

	pub fn parse<R: Read>(r: &mut R) -> Result<TxIn, Error> {
		let mut prev_txid = [0u8; 32];
		r.read_exact(&mut prev_txid)?;
		let prev_vout = read_u32_le(r)?;
		let script_sig = Script::parse(r)?;
		let sequence = read_u32_le(r)?;
		Ok(TxIn {
			prev_txid: Hash256::from_bytes(&prev_txid),
			prev_vout,
			script_sig,
			sequence,
			witness: Vec::new(),
		})
	}

	/// The `prev_txid_LE32 ‖ prev_vout_u32_LE` outpoint, as used both in
	/// legacy serialization and as BIP143's per-input `hashPrevouts` term.
	pub fn outpoint(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(36);
		out.extend_from_slice(self.prev_txid.as_bytes());
		out.extend_from_slice(&self.prev_vout.to_le_bytes());
		out
	}

	pub fn serialize_witness<W: Write>(&self, w: &mut W) -> io::Result<()> {
		write_varint(w, self.witness.len() as u64)?;
		for item in &self.witness {
			write_varint(w, item.len() as u64)?;
			w.write_all(item)?;
		}
		Ok(())
	}

	pub fn parse_witness<R: Read>(&mut self, r: &mut R) -> Result<(), Error> {
		let count = read_varint(r)?;
		let mut items = Vec::with_capacity(count as usize);
		for _ in 0..count {
			let len = read_varint(r)?;
			let mut item = vec![0u8; len as usize];
			r.read_exact(&mut item)?;
			items.push(item);
		}
		self.witness = items;
		Ok(())
	}
}
