//! Opcode byte constants (§4.3), grounded on the numbering in
//! `pkg/bitcoin/script/opcodes/op.go` (itself standard Bitcoin Script
//! numbering).

pub const OP_0: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 76;
pub const OP_PUSHDATA2: u8 = 77;
pub const OP_PUSHDATA4: u8 = 78;
pub const OP_1NEGATE: u8 = 79;
pub const OP_1: u8 = 81;
pub const OP_16: u8 = 96;
pub const OP_NOP: u8 = 97;
pub const OP_IF: u8 = 99;
pub const OP_NOTIF: u8 = 100;
pub const OP_ELSE: u8 = 103;
pub const OP_ENDIF: u8 = 104;
pub const OP_VERIFY: u8 = 105;
pub const OP_RETURN: u8 = 106;
pub const OP_TOALTSTACK: u8 = 107;
pub const OP_FROMALTSTACK: u8 = 108;
pub const OP_2DROP: u8 = 109;
pub const OP_2DUP: u8 = 110;
pub const OP_3DUP: u8 = 111;
pub const OP_2OVER: u8 = 112;
pub const OP_2ROT: u8 = 113;
pub const OP_2SWAP: u8 = 114;
pub const OP_IFDUP: u8 = 115;
pub const OP_DEPTH: u8 = 116;
pub const OP_DROP: u8 = 117;
pub const OP_DUP: u8 = 118;
pub const OP_NIP: u8 = 119;
pub const OP_OVER: u8 = 120;
pub const OP_PICK: u8 = 121;
pub const OP_ROLL: u8 = 122;
pub const OP_ROT: u8 = 123;
pub const OP_SWAP: u8 = 124;
pub const OP_TUCK: u8 = 125;
pub const OP_SIZE: u8 = 130;
pub const OP_EQUAL: u8 = 135;
pub const OP_EQUALVERIFY: u8 = 136;
pub const OP_1ADD: u8 = 139;
pub const OP_1SUB: u8 = 140;
pub const OP_NEGATE: u8 = 143;
pub const OP_ABS: u8 = 144;
pub const OP_NOT: u8 = 145;
pub const OP_0NOTEQUAL: u8 = 146;
pub const OP_ADD: u8 = 147;
pub const OP_SUB: u8 = 148;
pub const OP_BOOLAND: u8 = 154;
pub const OP_BOOLOR: u8 = 155;
pub const OP_NUMEQUAL: u8 = 156;
pub const OP_NUMEQUALVERIFY: u8 = 157;
pub const OP_NUMNOTEQUAL: u8 = 158;
pub const OP_LESSTHAN: u8 = 159;
pub const OP_GREATERTHAN: u8 = 160;
pub const OP_LESSTHANOREQUAL: u8 = 161;
pub const OP_GREATERTHANOREQUAL: u8 = 162;
pub const OP_MIN: u8 = 163;
pub const OP_MAX: u8 = 164;
pub const OP_WITHIN: u8 = 165;
pub const OP_RIPEMD160: u8 = 166;
pub const OP_SHA1: u8 = 167;
pub const OP_SHA256: u8 = 168;
pub const OP_HASH160: u8 = 169;
pub const OP_HASH256: u8 = 170;
pub const OP_CODESEPARATOR: u8 = 171;
pub const OP_CHECKSIG: u8 = 172;
pub const OP_CHECKSIGVERIFY: u8 = 173;
pub const OP_CHECKMULTISIG: u8 = 174;
pub const OP_CHECKMULTISIGVERIFY: u8 = 175;
pub const OP_NOP1: u8 = 176;
pub const OP_CHECKLOCKTIMEVERIFY: u8 = 177;
pub const OP_CHECKSEQUENCEVERIFY: u8 = 178;

/// `true` for the `OP_1`..`OP_16` range of small-integer push opcodes.
pub fn is_op_n(op: u8) -> bool {
	(OP_1..=OP_16).contains(&op)
}

/// The integer a `OP_1`..`OP_16` opcode pushes.
pub fn op_n_value(op: u8) -> u8 {
	op - OP_1 + 1
}
