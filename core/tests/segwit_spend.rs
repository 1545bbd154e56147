//! A nested P2SH-P2WPKH spend, exercised end to end: build the previous
//! output, sign the BIP143 sighash, attach the witness, and verify.

use num_bigint::BigUint;

use btcspv_core::encoding::{hash160, Hash256};
use btcspv_core::script::{Command, Script};
use btcspv_core::secp::privkey::PrivateKey;
use btcspv_core::transaction::{MapResolver, Transaction, TxIn, TxOut, SIGHASH_ALL};

fn signed_witness(key: &PrivateKey, z: BigUint) -> Vec<Vec<u8>> {
	let sig = key.sign(&z);
	let mut der = sig.der();
	der.push(SIGHASH_ALL as u8);
	let sec = key.public_key().to_sec(true).unwrap();
	vec![der, sec]
}

#[test]
fn nested_p2sh_p2wpkh_spend_verifies_end_to_end() {
	let key = PrivateKey::from_secret(BigUint::from(424_242u64));
	let sec = key.public_key().to_sec(true).unwrap();
	let pubkey_hash = hash160(&sec);

	let redeem_script = Script::p2wpkh(&pubkey_hash);
	let redeem_bytes = redeem_script.raw_serialize();
	let script_hash = hash160(&redeem_bytes);

	let prev_tx = Transaction::new(
		1,
		vec![TxIn::new(Hash256::from_bytes(&[0x11; 32]), 0, Script::new(Vec::new()), 0xffff_ffff)],
		vec![TxOut::new(2_000_000, Script::p2sh(&script_hash))],
		0,
		false,
		true,
	);

	let mut spend = Transaction::new(
		1,
		vec![TxIn::new(prev_tx.txid().reversed(), 0, Script::new(vec![Command::Data(redeem_bytes)]), 0xffff_ffff)],
		vec![TxOut::new(1_900_000, Script::p2pkh(&pubkey_hash))],
		0,
		true,
		true,
	);

	let script_code = Script::p2pkh(&pubkey_hash);
	let z = spend.sighash_segwit(0, &script_code, 2_000_000, SIGHASH_ALL);
	spend.inputs[0].witness = signed_witness(&key, z);

	let mut resolver = MapResolver::new();
	resolver.insert(prev_tx);

	assert!(spend.verify(&resolver).unwrap());

	// A fresh clone must recompute its BIP143 caches rather than inherit
	// whatever was memoized on the original.
	let cloned = spend.clone();
	assert!(cloned.verify(&resolver).unwrap());
}

#[test]
fn nested_p2sh_p2wpkh_spend_rejects_a_mismatched_amount() {
	let key = PrivateKey::from_secret(BigUint::from(13_131_313u64));
	let sec = key.public_key().to_sec(true).unwrap();
	let pubkey_hash = hash160(&sec);

	let redeem_script = Script::p2wpkh(&pubkey_hash);
	let redeem_bytes = redeem_script.raw_serialize();
	let script_hash = hash160(&redeem_bytes);

	let prev_tx = Transaction::new(
		1,
		vec![TxIn::new(Hash256::from_bytes(&[0x22; 32]), 0, Script::new(Vec::new()), 0xffff_ffff)],
		vec![TxOut::new(500_000, Script::p2sh(&script_hash))],
		0,
		false,
		true,
	);

	let mut spend = Transaction::new(
		1,
		vec![TxIn::new(prev_tx.txid().reversed(), 0, Script::new(vec![Command::Data(redeem_bytes)]), 0xffff_ffff)],
		vec![TxOut::new(400_000, Script::p2pkh(&pubkey_hash))],
		0,
		true,
		true,
	);

	let script_code = Script::p2pkh(&pubkey_hash);
	// Signs against the wrong committed amount (BIP143 commits the amount,
	// unlike the legacy sighash).
	let wrong_z = spend.sighash_segwit(0, &script_code, 999_999, SIGHASH_ALL);
	spend.inputs[0].witness = signed_witness(&key, wrong_z);

	let mut resolver = MapResolver::new();
	resolver.insert(prev_tx);

	assert!(!spend.verify(&resolver).unwrap());
}
