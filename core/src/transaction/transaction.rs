//! The transaction type itself: parse/serialize (legacy and BIP141 SegWit),
//! id, fee and per-input verification (§3/§4.4).
//!
//! Grounded on `pkg/bitcoin/tx/tx.go`'s `Tx` struct and its `Fee`/`Verify`
//! methods, reworked onto this crate's `Script`/`EvalContext` evaluator and
//! the BIP143 sighash this crate adds.

use std::cell::RefCell;
use std::io::{self, Read, Write};

use num_bigint::BigUint;

use crate::encoding::bytes::{read_u32_le, write_u32_le};
use crate::encoding::hash::{hash256, Hash256, Hashed};
use crate::encoding::varint::{read_varint, write_varint};
use crate::error::{Error, ErrorKind};
use crate::script::{evaluate, Command, EvalContext, Script, ScriptType};

use super::resolver::PrevTxResolver;
use super::txin::TxIn;
use super::txout::TxOut;

/// SIGHASH type flags (§4.4). Only `ALL` is exercised by the P2PKH/P2WPKH
/// paths this crate implements; the others are accepted as a sighash byte
/// value but this crate does not special-case their input/output pruning.
pub const SIGHASH_ALL: u32 = 0x01;
pub const SIGHASH_NONE: u32 = 0x02;
pub const SIGHASH_SINGLE: u32 = 0x03;
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;

const SEGWIT_MARKER: u8 = 0x00;
const SEGWIT_FLAG: u8 = 0x01;

/// The BIP143 per-transaction memo cache (§5's memoization note). Reset to
/// empty by `Transaction`'s manual `Clone` impl, since a clone is, per spec,
/// a fresh transaction that recomputes its caches on demand.
#[derive(Default)]
struct Bip143Cache {
	hash_prevouts: Option<Hash256>,
	hash_sequence: Option<Hash256>,
	hash_outputs: Option<Hash256>,
}

pub struct Transaction {
	pub version: u32,
	pub inputs: Vec<TxIn>,
	pub outputs: Vec<TxOut>,
	pub locktime: u32,
	pub segwit: bool,
	pub testnet: bool,
	cache: RefCell<Bip143Cache>,
}

impl Clone for Transaction {
	fn clone(&self) -> Transaction {
		Transaction {
			version: self.version,
			inputs: self.inputs.clone(),
			outputs: self.outputs.clone(),
			locktime: self.locktime,
			segwit: self.segwit,
			testnet: self.testnet,
			cache: RefCell::new(Bip143Cache::default()),
		}
	}
}

impl Transaction {
	pub fn new(version: u32, inputs: Vec<TxIn>, outputs: Vec<TxOut>, locktime: u32, segwit: bool, testnet: bool) -> Transaction {
		Transaction {
			version,
			inputs,
			outputs,
			locktime,
			segwit,
			testnet,
			cache: RefCell::new(Bip143Cache::default()),
		}
	}

	/// `true` iff this is a coinbase transaction: exactly one input, with
	/// the all-zero/all-ones coinbase prevout.
	pub fn is_coinbase(&self) -> bool {
		self.inputs.len() == 1 && self.inputs[0].is_coinbase_prevout()
	}

	/// `hash256` of the legacy (non-witness) serialization, byte-reversed to
	/// display order — the transaction's id.
	pub fn txid(&self) -> Hash256 {
		self.hash().reversed()
	}

	/// Serializes legacy or BIP141 SegWit form depending on `self.segwit`.
	pub fn serialize<W: Write>(&self, w: &mut W) -> io::Result<()> {
		if self.segwit {
			self.serialize_segwit(w)
		} else {
			self.serialize_legacy(w)
		}
	}

	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = Vec::new();
		self.serialize(&mut out).expect("writing to a Vec never fails");
		out
	}

	fn serialize_legacy<W: Write>(&self, w: &mut W) -> io::Result<()> {
		write_u32_le(w, self.version)?;
		write_varint(w, self.inputs.len() as u64)?;
		for input in &self.inputs {
			input.serialize(w)?;
		}
		write_varint(w, self.outputs.len() as u64)?;
		for output in &self.outputs {
			output.serialize(w)?;
		}
		write_u32_le(w, self.locktime)
	}

	fn serialize_segwit<W: Write>(&self, w: &mut W) -> io::Result<()> {
		write_u32_le(w, self.version)?;
		w.write_all(&[SEGWIT_MARKER, SEGWIT_FLAG])?;
		write_varint(w, self.inputs.len() as u64)?;
		for input in &self.inputs {
			input.serialize(w)?;
		}
		write_varint(w, self.outputs.len() as u64)?;
		for output in &self.outputs {
			output.serialize(w)?;
		}
		for input in &self.inputs {
			input.serialize_witness(w)?;
		}
		write_u32_le(w, self.locktime)
	}

	/// Parses either form, peeking the byte that follows `version` to tell
	/// a SegWit marker (`0x00`) from an input count.
	pub fn parse<R: Read>(r: &mut R, testnet: bool) -> Result<Transaction, Error> {
		let version = read_u32_le(r)?;
		let mut marker = [0u8; 1];
		r.read_exact(&mut marker)?;
		if marker[0] == SEGWIT_MARKER {
			let mut flag = [0u8; 1];
			r.read_exact(&mut flag)?;
			if flag[0] != SEGWIT_FLAG {
				return Err(ErrorKind::Encoding("unrecognized SegWit flag byte".to_string()).into());
			}
			Transaction::parse_segwit_body(r, version, testnet)
		} else {
			Transaction::parse_legacy_body(r, version, testnet, marker[0])
		}
	}

	/// `first_count_byte` is the byte already consumed while peeking for the
	/// SegWit marker; it is the first byte of the input-count varint.
	fn parse_legacy_body<R: Read>(r: &mut R, version: u32, testnet: bool, first_count_byte: u8) -> Result<Transaction, Error> {
		let input_count = read_varint_with_first_byte(r, first_count_byte)?;
		let mut inputs = Vec::with_capacity(input_count as usize);
		for _ in 0..input_count {
			inputs.push(TxIn::parse(r)?);
		}
		let output_count = read_varint(r)?;
		let mut outputs = Vec::with_capacity(output_count as usize);
		for _ in 0..output_count {
			outputs.push(TxOut::parse(r)?);
		}
		let locktime = read_u32_le(r)?;
		Ok(Transaction::new(version, inputs, outputs, locktime, false, testnet))
	}

	fn parse_segwit_body<R: Read>(r: &mut R, version: u32, testnet: bool) -> Result<Transaction, Error> {
		let input_count = read_varint(r)?;
		let mut inputs = Vec::with_capacity(input_count as usize);
		for _ in 0..input_count {
			inputs.push(TxIn::parse(r)?);
		}
		let output_count = read_varint(r)?;
		let mut outputs = Vec::with_capacity(output_count as usize);
		for _ in 0..output_count {
			outputs.push(TxOut::parse(r)?);
		}
		for input in &mut inputs {
			input.parse_witness(r)?;
		}
		let locktime = read_u32_le(r)?;
		Ok(Transaction::new(version, inputs, outputs, locktime, true, testnet))
	}

	/// Sum of input amounts minus sum of output amounts, resolving each
	/// input's previous output through `resolver`.
	pub fn fee(&self, resolver: &dyn PrevTxResolver) -> Result<i64, Error> {
		let mut input_sum: i64 = 0;
		for input in &self.inputs {
			let prev = resolver.fetch(&input.prev_txid, self.testnet)?;
			let prev_out = prev
				.outputs
				.get(input.prev_vout as usize)
				.ok_or_else(|| Error::from(ErrorKind::FetchError("prev_vout out of range".to_string())))?;
			input_sum += prev_out.amount_sat as i64;
		}
		let output_sum: i64 = self.outputs.iter().map(|o| o.amount_sat as i64).sum();
		Ok(input_sum - output_sum)
	}

	/// `true` iff `fee >= 0` and every input verifies (§4.4's `Verify`).
	pub fn verify(&self, resolver: &dyn PrevTxResolver) -> Result<bool, Error> {
		let fee = self.fee(resolver)?;
		if fee < 0 {
			log::debug!("transaction {} rejected: negative fee {}", self.txid(), fee);
			return Ok(false);
		}
		for i in 0..self.inputs.len() {
			if !self.verify_input(i, resolver)? {
				log::debug!("transaction {} rejected: input {} failed to verify", self.txid(), i);
				return Ok(false);
			}
		}
		Ok(true)
	}

	/// Legacy sighash (§4.4): empty every `script_sig` but input `i`,
	/// substitute `script_code` there, append the sighash type, hash256 the
	/// result and read it as a big-endian integer.
	pub fn sighash_legacy(&self, index: usize, script_code: &Script, sighash_type: u32) -> BigUint {
		let mut buf = Vec::new();
		write_u32_le(&mut buf, self.version).expect("Vec write never fails");
		write_varint(&mut buf, self.inputs.len() as u64).expect("Vec write never fails");
		for (i, input) in self.inputs.iter().enumerate() {
			let script_sig = if i == index { script_code.clone() } else { Script::new(Vec::new()) };
			buf.extend_from_slice(input.prev_txid.as_bytes());
			write_u32_le(&mut buf, input.prev_vout).expect("Vec write never fails");
			script_sig.serialize(&mut buf).expect("Vec write never fails");
			write_u32_le(&mut buf, input.sequence).expect("Vec write never fails");
		}
		write_varint(&mut buf, self.outputs.len() as u64).expect("Vec write never fails");
		for output in &self.outputs {
			output.serialize(&mut buf).expect("Vec write never fails");
		}
		write_u32_le(&mut buf, self.locktime).expect("Vec write never fails");
		write_u32_le(&mut buf, sighash_type).expect("Vec write never fails");
		hash256(&buf).to_big_uint()
	}

	fn hash_prevouts(&self) -> Hash256 {
		if let Some(h) = self.cache.borrow().hash_prevouts {
			return h;
		}
		let mut buf = Vec::new();
		for input in &self.inputs {
			buf.extend_from_slice(&input.outpoint());
		}
		let h = hash256(&buf);
		self.cache.borrow_mut().hash_prevouts = Some(h);
		h
	}

	fn hash_sequence(&self) -> Hash256 {
		if let Some(h) = self.cache.borrow().hash_sequence {
			return h;
		}
		let mut buf = Vec::new();
		for input in &self.inputs {
			buf.extend_from_slice(&input.sequence.to_le_bytes());
		}
		let h = hash256(&buf);
		self.cache.borrow_mut().hash_sequence = Some(h);
		h
	}

	fn hash_outputs(&self) -> Hash256 {
		if let Some(h) = self.cache.borrow().hash_outputs {
			return h;
		}
		let mut buf = Vec::new();
		for output in &self.outputs {
			output.serialize(&mut buf).expect("Vec write never fails");
		}
		let h = hash256(&buf);
		self.cache.borrow_mut().hash_outputs = Some(h);
		h
	}

	/// BIP143 sighash (§4.4): `script_code` is the witness/redeem script (or
	/// the input's own script_pubkey for a bare P2WPKH spend).
	pub fn sighash_segwit(&self, index: usize, script_code: &Script, amount_sat: u64, sighash_type: u32) -> BigUint {
		let input = &self.inputs[index];
		let mut buf = Vec::new();
		write_u32_le(&mut buf, self.version).expect("Vec write never fails");
		buf.extend_from_slice(self.hash_prevouts().as_bytes());
		buf.extend_from_slice(self.hash_sequence().as_bytes());
		buf.extend_from_slice(&input.outpoint());
		script_code.serialize(&mut buf).expect("Vec write never fails");
		buf.extend_from_slice(&amount_sat.to_le_bytes());
		buf.extend_from_slice(&input.sequence.to_le_bytes());
		buf.extend_from_slice(self.hash_outputs().as_bytes());
		write_u32_le(&mut buf, self.locktime).expect("Vec write never fails");
		write_u32_le(&mut buf, sighash_type).expect("Vec write never fails");
		hash256(&buf).to_big_uint()
	}

	/// A synthetic P2PKH script over `pubkey_hash`, used as BIP143's
	/// `scriptCode` for a bare P2WPKH spend.
	fn p2wpkh_script_code(pubkey_hash: &[u8; 20]) -> Script {
		Script::p2pkh(pubkey_hash)
	}

	/// Classifies the previous output, computes the correct sighash `z` and
	/// evaluates the combined script (§4.4's `VerifyInput`).
	pub fn verify_input(&self, index: usize, resolver: &dyn PrevTxResolver) -> Result<bool, Error> {
		let input = &self.inputs[index]
			.clone();
		let prev_tx = resolver.fetch(&input.prev_txid, self.testnet)?;
		let prev_out = prev_tx
			.outputs
			.get(input.prev_vout as usize)
			.ok_or_else(|| Error::from(ErrorKind::FetchError("prev_vout out of range".to_string())))?;

		match prev_out.script_pubkey.classify() {
			ScriptType::P2pkh(_) => {
				let z = self.sighash_legacy(index, &prev_out.script_pubkey, SIGHASH_ALL);
				let combined = input.script_sig.append(&prev_out.script_pubkey);
				self.evaluate_combined(&combined, z, &[])
			}
			ScriptType::P2wpkh(pubkey_hash) => {
				let script_code = Transaction::p2wpkh_script_code(&pubkey_hash);
				let z = self.sighash_segwit(index, &script_code, prev_out.amount_sat, SIGHASH_ALL);
				// The witness program itself (`OP_0 <hash>`) is the combined
				// script: it is what `try_pattern_expand` recognizes and
				// rewrites into the witness stack plus the implied P2PKH check.
				self.evaluate_combined(&prev_out.script_pubkey, z, &input.witness)
			}
			ScriptType::P2sh(script_hash) => {
				let redeem_bytes = redeem_script_bytes(&input.script_sig, &script_hash)?;
				let redeem = Script::parse_raw(&redeem_bytes)?;
				match redeem.classify() {
					ScriptType::P2wpkh(pubkey_hash) => {
						let script_code = Transaction::p2wpkh_script_code(&pubkey_hash);
						let z = self.sighash_segwit(index, &script_code, prev_out.amount_sat, SIGHASH_ALL);
						self.evaluate_combined(&redeem, z, &input.witness)
					}
					_ => {
						let z = self.sighash_legacy(index, &redeem, SIGHASH_ALL);
						let combined = input.script_sig.append(&prev_out.script_pubkey);
						self.evaluate_combined(&combined, z, &[])
					}
				}
			}
			ScriptType::Other => {
				let z = self.sighash_legacy(index, &prev_out.script_pubkey, SIGHASH_ALL);
				let combined = input.script_sig.append(&prev_out.script_pubkey);
				self.evaluate_combined(&combined, z, &[])
			}
		}
	}

	fn evaluate_combined(&self, combined: &Script, z: BigUint, witness: &[Vec<u8>]) -> Result<bool, Error> {
		let mut ctx = EvalContext::new(z);
		ctx.locktime = self.locktime;
		ctx.version = self.version;
		ctx.witness = witness.to_vec();
		evaluate(combined, &ctx)
	}
}

impl Hashed for Transaction {
	/// `hash256` of the legacy serialization, in wire (non-reversed) order.
	/// Witness data never contributes to a txid (§3).
	fn hash(&self) -> Hash256 {
		let mut buf = Vec::new();
		self.serialize_legacy(&mut buf).expect("Vec write never fails");
		hash256(&buf)
	}
}

fn redeem_script_bytes(script_sig: &Script, script_hash: &[u8; 20]) -> Result<Vec<u8>, Error> {
	match script_sig.commands().last() {
		Some(Command::Data(bytes)) => {
			if crate::encoding::hash160(bytes)[..] != script_hash[..] {
				return Err(ErrorKind::VerifyFailed("P2SH redeem script does not match script_pubkey hash".to_string()).into());
			}
			Ok(bytes.clone())
		}
		_ => Err(ErrorKind::ScriptError("P2SH scriptSig does not end in a data push".to_string()).into()),
	}
}

fn read_varint_with_first_byte<R: Read>(r: &mut R, first: u8) -> Result<u64, Error> {
	use byteorder::{LittleEndian, ReadBytesExt};
	let value = match first {
		0xFD => r.read_u16::<LittleEndian>().map(|v| v as u64).map_err(|e| ErrorKind::Encoding(format!("varint u16: {}", e)))?,
		0xFE => r.read_u32::<LittleEndian>().map(|v| v as u64).map_err(|e| ErrorKind::Encoding(format!("varint u32: {}", e)))?,
		0xFF => r.read_u64::<LittleEndian>().map_err(|e| ErrorKind::Encoding(format!("varint u64: {}", e)))?,
		n => n as u64,
	};
	Ok(value)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::secp::privkey::PrivateKey;
	use crate::transaction::resolver::MapResolver;

	fn simple_p2pkh_chain() -> (Transaction, Transaction, PrivateKey) {
		let key = PrivateKey::from_secret(BigUint::from(8_675_309u64));
		let sec = key.public_key().to_sec(true).unwrap();
		let pubkey_hash = crate::encoding::hash160(&sec);

		let prev_tx = Transaction::new(
			1,
			vec![TxIn::new(Hash256::from_bytes(&[0xAA; 32]), 0, Script::new(Vec::new()), 0xffff_ffff)],
			vec![TxOut::new(5_000_000_000, Script::p2pkh(&pubkey_hash))],
			0,
			false,
			true,
		);

		let spend_unsigned = Transaction::new(
			1,
			vec![TxIn::new(prev_tx.txid().reversed(), 0, Script::new(Vec::new()), 0xffff_ffff)],
			vec![TxOut::new(4_999_000_000, Script::p2pkh(&pubkey_hash))],
			0,
			false,
			true,
		);

		(prev_tx, spend_unsigned, key)
	}

	#[test]
	fn legacy_round_trip() {
		let (prev_tx, _spend, _key) = simple_p2pkh_chain();
		let bytes = prev_tx.to_bytes();
		let parsed = Transaction::parse(&mut &bytes[..], true).unwrap();
		assert_eq!(parsed.to_bytes(), bytes);
		assert_eq!(parsed.txid(), prev_tx.txid());
	}

	#[test]
	fn fee_is_input_minus_output_sum() {
		let (prev_tx, spend_unsigned, _key) = simple_p2pkh_chain();
		let mut resolver = MapResolver::new();
		resolver.insert(prev_tx);
		assert_eq!(spend_unsigned.fee(&resolver).unwrap(), 1_000_000_000);
	}

	#[test]
	fn p2pkh_spend_verifies_end_to_end() {
		let (prev_tx, spend_unsigned, key) = simple_p2pkh_chain();
		let mut resolver = MapResolver::new();
		resolver.insert(prev_tx.clone());

		let z = spend_unsigned.sighash_legacy(0, &prev_tx.outputs[0].script_pubkey, SIGHASH_ALL);
		let sig = key.sign(&z);
		let mut der = sig.der();
		der.push(SIGHASH_ALL as u8);
		let sec = key.public_key().to_sec(true).unwrap();

		let mut spend = spend_unsigned;
		spend.inputs[0].script_sig = Script::new(vec![Command::Data(der), Command::Data(sec)]);

		assert!(spend.verify(&resolver).unwrap());
	}

	#[test]
	fn tampering_with_the_amount_breaks_verification() {
		let (prev_tx, spend_unsigned, key) = simple_p2pkh_chain();
		let mut resolver = MapResolver::new();
		resolver.insert(prev_tx.clone());

		let z = spend_unsigned.sighash_legacy(0, &prev_tx.outputs[0].script_pubkey, SIGHASH_ALL);
		let sig = key.sign(&z);
		let mut der = sig.der();
		der.push(SIGHASH_ALL as u8);
		let sec = key.public_key().to_sec(true).unwrap();

		let mut spend = spend_unsigned;
		spend.inputs[0].script_sig = Script::new(vec![Command::Data(der), Command::Data(sec)]);
		spend.outputs[0].amount_sat += 1;

		assert!(!spend.verify(&resolver).unwrap());
	}
}
