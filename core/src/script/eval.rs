//! The script stack machine (§4.3): opcode dispatch, control flow and the
//! P2SH/P2WPKH pattern recognizers.
//!
//! Grounded on the evaluation loop shape the spec describes (a queue of
//! commands consumed front-to-back, pattern recognition triggered on the
//! command list's remaining shape); IF/NOTIF branch selection follows the
//! spec's design note of a forward pre-scan rather than in-place list
//! mutation, since `pkg/bitcoin/script/opcodes`' per-opcode `Execute(Stack)`
//! shape has no analogous control-flow handling to ground this on directly.

use std::collections::VecDeque;

use num_bigint::BigUint;

use super::command::Command;
use super::num::{decode_num, encode_num, is_truthy};
use super::opcodes::*;
use super::command::Script;
use crate::encoding::hash::{hash160, hash256};
use crate::error::{Error, ErrorKind};
use crate::secp::ecdsa;
use crate::secp::point::Point;
use crate::secp::signature::Signature;

/// Per-input context an evaluation needs beyond the script bytes
/// themselves: the sighash `z`, BIP65/BIP112 locktime context, and the
/// witness stack (empty for non-SegWit spends).
#[derive(Clone, Debug)]
pub struct EvalContext {
	pub z: BigUint,
	pub locktime: u32,
	pub sequence: u32,
	pub version: u32,
	pub witness: Vec<Vec<u8>>,
}

impl EvalContext {
	pub fn new(z: BigUint) -> EvalContext {
		EvalContext {
			z,
			locktime: 0,
			sequence: 0xffff_ffff,
			version: 1,
			witness: Vec::new(),
		}
	}
}

/// Evaluates `script` (the concatenation of `scriptSig` and `scriptPubKey`,
/// already spliced as the spec's combined-script rule describes), returning
/// whether the final stack top is truthy.
pub fn evaluate(script: &Script, ctx: &EvalContext) -> Result<bool, Error> {
	let mut stack: Vec<Vec<u8>> = Vec::new();
	let mut altstack: Vec<Vec<u8>> = Vec::new();
	let mut commands: VecDeque<Command> = script.commands().iter().cloned().collect();

	while !commands.is_empty() {
		if let Some(expanded) = try_pattern_expand(&stack, &commands, ctx)? {
			commands = expanded;
			continue;
		}
		let cmd = commands.pop_front().expect("checked non-empty above");
		match cmd {
			Command::Data(data) => stack.push(data),
			Command::Op(op) => {
				if !dispatch(op, &mut stack, &mut altstack, &mut commands, ctx)? {
					return Ok(false);
				}
			}
		}
	}

	match stack.last() {
		Some(top) => Ok(is_truthy(top)),
		None => Ok(false),
	}
}

/// Checks whether the *remaining* command list matches the P2SH or P2WPKH
/// tail shapes and, if so, returns the expanded command queue. The stack's
/// current top supplies the "most recently pushed data element" the spec
/// refers to for P2SH.
fn try_pattern_expand(
	stack: &[Vec<u8>],
	commands: &VecDeque<Command>,
	ctx: &EvalContext,
) -> Result<Option<VecDeque<Command>>, Error> {
	if commands.len() == 3 {
		if let (Command::Op(op1), Command::Data(h), Command::Op(op2)) = (&commands[0], &commands[1], &commands[2]) {
			if *op1 == OP_HASH160 && h.len() == 20 && *op2 == OP_EQUAL {
				let redeem_bytes = match stack.last() {
					Some(top) => top.clone(),
					None => return Err(ErrorKind::ScriptError("P2SH redeem script missing from stack".to_string()).into()),
				};
				if hash160(&redeem_bytes)[..] != h[..] {
					return Err(ErrorKind::VerifyFailed("P2SH redeem script does not match script_pubkey hash".to_string()).into());
				}
				let redeem = Script::parse_raw(&redeem_bytes)?;
				let mut rest: VecDeque<Command> = VecDeque::new();
				rest.extend(redeem.commands().iter().cloned());
				return Ok(Some(rest));
			}
		}
	}
	if commands.len() == 2 {
		if let (Command::Op(op0), Command::Data(h)) = (&commands[0], &commands[1]) {
			if *op0 == OP_0 && h.len() == 20 {
				let mut rest: VecDeque<Command> = VecDeque::new();
				for item in &ctx.witness {
					rest.push_back(Command::Data(item.clone()));
				}
				rest.push_back(Command::Op(OP_DUP));
				rest.push_back(Command::Op(OP_HASH160));
				rest.push_back(Command::Data(h.clone()));
				rest.push_back(Command::Op(OP_EQUALVERIFY));
				rest.push_back(Command::Op(OP_CHECKSIG));
				return Ok(Some(rest));
			}
		}
	}
	Ok(None)
}

/// Scans `commands` (the body right after an `IF`/`NOTIF`) for its matching
/// `ELSE`/`ENDIF`, tracking nested `IF`/`NOTIF` depth, and returns
/// `(true_branch, false_branch, consumed)` where `consumed` is the number of
/// elements (including the terminating `ENDIF`) to drop from the front of
/// the original queue.
fn split_if_branches(commands: &VecDeque<Command>) -> Result<(Vec<Command>, Vec<Command>, usize), Error> {
	let mut depth = 0i32;
	let mut true_branch = Vec::new();
	let mut false_branch = Vec::new();
	let mut in_else = false;

	for (i, cmd) in commands.iter().enumerate() {
		if let Command::Op(op) = cmd {
			match *op {
				OP_IF | OP_NOTIF => {
					depth += 1;
					push_branch(&mut true_branch, &mut false_branch, in_else, cmd.clone());
				}
				OP_ELSE if depth == 0 => {
					if in_else {
						return Err(ErrorKind::ScriptError("duplicate ELSE".to_string()).into());
					}
					in_else = true;
				}
				OP_ENDIF if depth == 0 => {
					return Ok((true_branch, false_branch, i + 1));
				}
				OP_ENDIF => {
					depth -= 1;
					push_branch(&mut true_branch, &mut false_branch, in_else, cmd.clone());
				}
				_ => push_branch(&mut true_branch, &mut false_branch, in_else, cmd.clone()),
			}
		} else {
			push_branch(&mut true_branch, &mut false_branch, in_else, cmd.clone());
		}
	}
	Err(ErrorKind::ScriptError("unterminated IF/NOTIF".to_string()).into())
}

fn push_branch(true_branch: &mut Vec<Command>, false_branch: &mut Vec<Command>, in_else: bool, cmd: Command) {
	if in_else {
		false_branch.push(cmd);
	} else {
		true_branch.push(cmd);
	}
}

/// Executes one opcode. Returns `Ok(false)` for an evaluation-ending
/// script-level failure (e.g. `OP_VERIFY` on a falsy top, `OP_RETURN`);
/// returns `Err` for malformed input (stack underflow, unknown opcode).
fn dispatch(
	op: u8,
	stack: &mut Vec<Vec<u8>>,
	altstack: &mut Vec<Vec<u8>>,
	commands: &mut VecDeque<Command>,
	ctx: &EvalContext,
) -> Result<bool, Error> {
	macro_rules! pop {
		() => {
			stack.pop().ok_or_else(|| Error::from(ErrorKind::ScriptError("stack underflow".to_string())))?
		};
	}
	macro_rules! pop_num {
		() => {
			decode_num(&pop!())
		};
	}

	match op {
		OP_0 => stack.push(Vec::new()),
		OP_1NEGATE => stack.push(encode_num(-1)),
		op if is_op_n(op) => stack.push(encode_num(op_n_value(op) as i64)),
		OP_NOP => {}

		OP_IF | OP_NOTIF => {
			let condition = is_truthy(&pop!());
			let want_true = if op == OP_IF { condition } else { !condition };
			let (true_branch, false_branch, consumed) = split_if_branches(commands)?;
			for _ in 0..consumed {
				commands.pop_front();
			}
			let chosen = if want_true { true_branch } else { false_branch };
			for cmd in chosen.into_iter().rev() {
				commands.push_front(cmd);
			}
		}
		OP_ELSE | OP_ENDIF => {
			return Err(ErrorKind::ScriptError("ELSE/ENDIF without matching IF/NOTIF".to_string()).into());
		}
		OP_VERIFY => {
			if !is_truthy(&pop!()) {
				return Ok(false);
			}
		}
		OP_RETURN => return Ok(false),

		OP_TOALTSTACK => altstack.push(pop!()),
		OP_FROMALTSTACK => {
			let v = altstack
				.pop()
				.ok_or_else(|| Error::from(ErrorKind::ScriptError("altstack underflow".to_string())))?;
			stack.push(v);
		}

		OP_2DROP => {
			pop!();
			pop!();
		}
		OP_2DUP => {
			let n = stack.len();
			require(stack.len() >= 2)?;
			let (a, b) = (stack[n - 2].clone(), stack[n - 1].clone());
			stack.push(a);
			stack.push(b);
		}
		OP_3DUP => {
			require(stack.len() >= 3)?;
			let n = stack.len();
			for i in n - 3..n {
				stack.push(stack[i].clone());
			}
		}
		OP_2OVER => {
			require(stack.len() >= 4)?;
			let n = stack.len();
			stack.push(stack[n - 4].clone());
			stack.push(stack[n - 3].clone());
		}
		OP_2ROT => {
			require(stack.len() >= 6)?;
			let n = stack.len();
			let drained: Vec<_> = stack.drain(n - 6..n).collect();
			stack.extend_from_slice(&drained[2..]);
			stack.extend_from_slice(&drained[..2]);
		}
		OP_2SWAP => {
			require(stack.len() >= 4)?;
			let n = stack.len();
			stack.swap(n - 4, n - 2);
			stack.swap(n - 3, n - 1);
		}
		OP_IFDUP => {
			let top = stack.last().cloned().ok_or_else(|| Error::from(ErrorKind::ScriptError("stack underflow".to_string())))?;
			if is_truthy(&top) {
				stack.push(top);
			}
		}
		OP_DEPTH => stack.push(encode_num(stack.len() as i64)),
		OP_DROP => {
			pop!();
		}
		OP_DUP => {
			let top = stack.last().cloned().ok_or_else(|| Error::from(ErrorKind::ScriptError("stack underflow".to_string())))?;
			stack.push(top);
		}
		OP_NIP => {
			require(stack.len() >= 2)?;
			let n = stack.len();
			stack.remove(n - 2);
		}
		OP_OVER => {
			require(stack.len() >= 2)?;
			let n = stack.len();
			stack.push(stack[n - 2].clone());
		}
		OP_PICK | OP_ROLL => {
			let n = pop_num!();
			require(n >= 0)?;
			let n = n as usize;
			require(stack.len() > n)?;
			let idx = stack.len() - 1 - n;
			if op == OP_PICK {
				let v = stack[idx].clone();
				stack.push(v);
			} else {
				let v = stack.remove(idx);
				stack.push(v);
			}
		}
		OP_ROT => {
			require(stack.len() >= 3)?;
			let n = stack.len();
			stack.swap(n - 3, n - 2);
			stack.swap(n - 2, n - 1);
		}
		OP_SWAP => {
			require(stack.len() >= 2)?;
			let n = stack.len();
			stack.swap(n - 2, n - 1);
		}
		OP_TUCK => {
			require(stack.len() >= 2)?;
			let top = stack[stack.len() - 1].clone();
			let n = stack.len();
			stack.insert(n - 2, top);
		}

		OP_SIZE => {
			let top = stack.last().ok_or_else(|| Error::from(ErrorKind::ScriptError("stack underflow".to_string())))?;
			stack.push(encode_num(top.len() as i64));
		}

		OP_EQUAL => {
			let b = pop!();
			let a = pop!();
			stack.push(encode_num((a == b) as i64));
		}
		OP_EQUALVERIFY => {
			let b = pop!();
			let a = pop!();
			if a != b {
				return Ok(false);
			}
		}

		OP_1ADD => {
			let n = pop_num!();
			stack.push(encode_num(n + 1));
		}
		OP_1SUB => {
			let n = pop_num!();
			stack.push(encode_num(n - 1));
		}
		OP_NEGATE => {
			let n = pop_num!();
			stack.push(encode_num(-n));
		}
		OP_ABS => {
			let n = pop_num!();
			stack.push(encode_num(n.abs()));
		}
		OP_NOT => {
			let n = pop_num!();
			stack.push(encode_num((n == 0) as i64));
		}
		OP_0NOTEQUAL => {
			let n = pop_num!();
			stack.push(encode_num((n != 0) as i64));
		}
		OP_ADD => {
			let b = pop_num!();
			let a = pop_num!();
			stack.push(encode_num(a + b));
		}
		OP_SUB => {
			let b = pop_num!();
			let a = pop_num!();
			stack.push(encode_num(a - b));
		}
		OP_BOOLAND => {
			let b = pop_num!();
			let a = pop_num!();
			stack.push(encode_num((a != 0 && b != 0) as i64));
		}
		OP_BOOLOR => {
			let b = pop_num!();
			let a = pop_num!();
			stack.push(encode_num((a != 0 || b != 0) as i64));
		}
		OP_NUMEQUAL => {
			let b = pop_num!();
			let a = pop_num!();
			stack.push(encode_num((a == b) as i64));
		}
		OP_NUMEQUALVERIFY => {
			let b = pop_num!();
			let a = pop_num!();
			if a != b {
				return Ok(false);
			}
		}
		OP_NUMNOTEQUAL => {
			let b = pop_num!();
			let a = pop_num!();
			stack.push(encode_num((a != b) as i64));
		}
		OP_LESSTHAN => {
			let b = pop_num!();
			let a = pop_num!();
			stack.push(encode_num((a < b) as i64));
		}
		OP_GREATERTHAN => {
			let b = pop_num!();
			let a = pop_num!();
			stack.push(encode_num((a > b) as i64));
		}
		OP_LESSTHANOREQUAL => {
			let b = pop_num!();
			let a = pop_num!();
			stack.push(encode_num((a <= b) as i64));
		}
		OP_GREATERTHANOREQUAL => {
			let b = pop_num!();
			let a = pop_num!();
			stack.push(encode_num((a >= b) as i64));
		}
		OP_MIN => {
			let b = pop_num!();
			let a = pop_num!();
			stack.push(encode_num(a.min(b)));
		}
		OP_MAX => {
			let b = pop_num!();
			let a = pop_num!();
			stack.push(encode_num(a.max(b)));
		}
		OP_WITHIN => {
			let max = pop_num!();
			let min = pop_num!();
			let x = pop_num!();
			stack.push(encode_num((x >= min && x < max) as i64));
		}

		OP_RIPEMD160 => {
			use ripemd::{Digest, Ripemd160};
			let data = pop!();
			stack.push(Ripemd160::digest(&data).to_vec());
		}
		OP_SHA1 => {
			use sha1::{Digest, Sha1};
			let data = pop!();
			stack.push(Sha1::digest(&data).to_vec());
		}
		OP_SHA256 => {
			use sha2::{Digest, Sha256};
			let data = pop!();
			stack.push(Sha256::digest(&data).to_vec());
		}
		OP_HASH160 => {
			let data = pop!();
			stack.push(hash160(&data).to_vec());
		}
		OP_HASH256 => {
			let data = pop!();
			stack.push(hash256(&data).to_vec());
		}
		OP_CODESEPARATOR => {}

		OP_CHECKSIG | OP_CHECKSIGVERIFY => {
			let pubkey_bytes = pop!();
			let sig_bytes = pop!();
			let ok = check_sig(&sig_bytes, &pubkey_bytes, &ctx.z)?;
			if op == OP_CHECKSIGVERIFY {
				if !ok {
					return Ok(false);
				}
			} else {
				stack.push(encode_num(ok as i64));
			}
		}
		OP_CHECKMULTISIG | OP_CHECKMULTISIGVERIFY => {
			let n = pop_num!();
			require(n >= 0)?;
			let n = n as usize;
			require(stack.len() >= n)?;
			let mut pubkeys = Vec::with_capacity(n);
			for _ in 0..n {
				pubkeys.push(pop!());
			}
			pubkeys.reverse();
			let m = pop_num!();
			require(m >= 0)?;
			let m = m as usize;
			require(stack.len() >= m)?;
			let mut sigs = Vec::with_capacity(m);
			for _ in 0..m {
				sigs.push(pop!());
			}
			sigs.reverse();
			// Off-by-one bug in the reference client consumes one extra
			// stack element; CHECKMULTISIG must pop it too.
			pop!();

			let mut pubkey_iter = pubkeys.into_iter();
			let mut all_ok = true;
			for sig in &sigs {
				let mut matched = false;
				for pubkey in pubkey_iter.by_ref() {
					if check_sig(sig, &pubkey, &ctx.z)? {
						matched = true;
						break;
					}
				}
				if !matched {
					all_ok = false;
					break;
				}
			}
			if op == OP_CHECKMULTISIGVERIFY {
				if !all_ok {
					return Ok(false);
				}
			} else {
				stack.push(encode_num(all_ok as i64));
			}
		}

		OP_NOP1 => {}
		OP_CHECKLOCKTIMEVERIFY => {
			let locktime = pop_num!();
			if locktime < 0 {
				return Err(ErrorKind::ScriptError("CHECKLOCKTIMEVERIFY: negative locktime".to_string()).into());
			}
			let locktime_threshold = 500_000_000i64;
			if (locktime < locktime_threshold) != ((ctx.locktime as i64) < locktime_threshold) {
				return Ok(false);
			}
			if locktime > ctx.locktime as i64 {
				return Ok(false);
			}
			if ctx.sequence == 0xffff_ffff {
				return Ok(false);
			}
			stack.push(encode_num(locktime));
		}
		OP_CHECKSEQUENCEVERIFY => {
			let sequence = pop_num!();
			if sequence < 0 {
				return Err(ErrorKind::ScriptError("CHECKSEQUENCEVERIFY: negative sequence".to_string()).into());
			}
			if ctx.version < 2 {
				return Ok(false);
			}
			if (ctx.sequence & (1 << 31)) != 0 {
				return Ok(false);
			}
			const SEQUENCE_LOCKTIME_TYPE_FLAG: u32 = 1 << 22;
			const SEQUENCE_LOCKTIME_MASK: u32 = 0x0000_ffff;
			let sequence = sequence as u32;
			if (sequence & (1 << 31)) != 0 {
				stack.push(encode_num(sequence as i64));
				return Ok(true);
			}
			let relevant_mask = SEQUENCE_LOCKTIME_TYPE_FLAG | SEQUENCE_LOCKTIME_MASK;
			if (sequence & relevant_mask) != (ctx.sequence & relevant_mask) && (sequence & SEQUENCE_LOCKTIME_TYPE_FLAG) != (ctx.sequence & SEQUENCE_LOCKTIME_TYPE_FLAG) {
				return Ok(false);
			}
			if (sequence & SEQUENCE_LOCKTIME_MASK) > (ctx.sequence & SEQUENCE_LOCKTIME_MASK) {
				return Ok(false);
			}
			stack.push(encode_num(sequence as i64));
		}

		_ => {
			log::debug!("unknown or unsupported opcode 0x{:02x}", op);
			return Err(ErrorKind::ScriptError(format!("unknown or unsupported opcode 0x{:02x}", op)).into());
		}
	}
	Ok(true)
}

fn require(condition: bool) -> Result<(), Error> {
	if condition {
		Ok(())
	} else {
		Err(ErrorKind::ScriptError("stack underflow".to_string()).into())
	}
}

/// Parses `sig_bytes` (DER, trailing SIGHASH byte stripped) and
/// `pubkey_bytes` (SEC) and runs ECDSA verify against `z`.
fn check_sig(sig_bytes: &[u8], pubkey_bytes: &[u8], z: &BigUint) -> Result<bool, Error> {
	if sig_bytes.is_empty() {
		return Ok(false);
	}
	let der = &sig_bytes[..sig_bytes.len() - 1];
	let sig = Signature::parse_der(der)?;
	let pubkey = Point::parse_sec(pubkey_bytes)?;
	ecdsa::verify(&pubkey, z, &sig)
}
