//! The script stack machine: command model, opcode table and evaluator
//! (§4.3).

pub mod command;
pub mod eval;
pub mod num;
pub mod opcodes;

pub use command::{Command, Script};
pub use eval::{evaluate, EvalContext};

impl Script {
	/// `OP_DUP OP_HASH160 <20B> OP_EQUALVERIFY OP_CHECKSIG`.
	pub fn p2pkh(pubkey_hash: &[u8; 20]) -> Script {
		Script::new(vec![
			Command::Op(opcodes::OP_DUP),
			Command::Op(opcodes::OP_HASH160),
			Command::Data(pubkey_hash.to_vec()),
			Command::Op(opcodes::OP_EQUALVERIFY),
			Command::Op(opcodes::OP_CHECKSIG),
		])
	}

	/// `OP_HASH160 <20B> OP_EQUAL`.
	pub fn p2sh(script_hash: &[u8; 20]) -> Script {
		Script::new(vec![
			Command::Op(opcodes::OP_HASH160),
			Command::Data(script_hash.to_vec()),
			Command::Op(opcodes::OP_EQUAL),
		])
	}

	/// `OP_0 <20B>`.
	pub fn p2wpkh(pubkey_hash: &[u8; 20]) -> Script {
		Script::new(vec![Command::Op(opcodes::OP_0), Command::Data(pubkey_hash.to_vec())])
	}

	/// Classifies a script_pubkey into one of the three special forms the
	/// transaction layer needs to distinguish (§4.4's `VerifyInput`).
	pub fn classify(&self) -> ScriptType {
		let cmds = self.commands();
		if let [Command::Op(op1), Command::Op(op2), Command::Data(h), Command::Op(op3), Command::Op(op4)] = cmds {
			if *op1 == opcodes::OP_DUP && *op2 == opcodes::OP_HASH160 && h.len() == 20 && *op3 == opcodes::OP_EQUALVERIFY && *op4 == opcodes::OP_CHECKSIG {
				return ScriptType::P2pkh(clone20(h));
			}
		}
		if let [Command::Op(op1), Command::Data(h), Command::Op(op2)] = cmds {
			if *op1 == opcodes::OP_HASH160 && h.len() == 20 && *op2 == opcodes::OP_EQUAL {
				return ScriptType::P2sh(clone20(h));
			}
		}
		if let [Command::Op(op0), Command::Data(h)] = cmds {
			if *op0 == opcodes::OP_0 && h.len() == 20 {
				return ScriptType::P2wpkh(clone20(h));
			}
		}
		ScriptType::Other
	}

}

fn clone20(bytes: &[u8]) -> [u8; 20] {
	let mut out = [0u8; 20];
	out.copy_from_slice(bytes);
	out
}

/// The script_pubkey shapes `VerifyInput` dispatches on.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScriptType {
	P2pkh([u8; 20]),
	P2sh([u8; 20]),
	P2wpkh([u8; 20]),
	Other,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn classifies_p2pkh() {
		let h = [0xab; 20];
		assert_eq!(Script::p2pkh(&h).classify(), ScriptType::P2pkh(h));
	}

	#[test]
	fn classifies_p2sh() {
		let h = [0xcd; 20];
		assert_eq!(Script::p2sh(&h).classify(), ScriptType::P2sh(h));
	}

	#[test]
	fn classifies_p2wpkh() {
		let h = [0xef; 20];
		assert_eq!(Script::p2wpkh(&h).classify(), ScriptType::P2wpkh(h));
	}

	#[test]
	fn arbitrary_script_is_other() {
		let script = Script::new(vec![Command::Op(opcodes::OP_RETURN)]);
		assert_eq!(script.classify(), ScriptType::Other);
	}
}
