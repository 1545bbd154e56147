//! Transaction output: amount and the script that gates its spending.

use std::io::{self, Read, Write};

use crate::encoding::bytes::{read_u64_le, write_u64_le};
use crate::error::Error;
use crate::script::Script;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TxOut {
	pub amount_sat: u64,
	pub script_pubkey: Script,
}

impl TxOut {
	pub fn new(amount_sat: u64, script_pubkey: Script) -> TxOut {
		TxOut { amount_sat, script_pubkey }
	}

	pub fn serialize<W: Write>(&self, w: &mut W) -> io::Result<()> {
		write_u64_le(w, self.amount_sat)?;
		self.script_pubkey.serialize(w)
	}

	pub fn parse<R: Read>(r: &mut R) -> Result<TxOut, Error> {
		let amount_sat = read_u64_le(r)?;
		let script_pubkey = Script::parse(r)?;
		Ok(TxOut { amount_sat, script_pubkey })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::script::Command;

	#[test]
	fn round_trips() {
		let out = TxOut::new(5000, Script::new(vec![Command::Op(0x51)]));
		let mut buf = Vec::new();
		out.serialize(&mut buf).unwrap();
		let mut cursor = &buf[..];
		let parsed = TxOut::parse(&mut cursor).unwrap();
		assert_eq!(parsed, out);
	}
}
