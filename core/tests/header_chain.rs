//! Header sync building blocks: genesis headers, PoW checking, and the
//! 2016-block retarget, exercised together the way a header-only SPV sync
//! would use them.

use btcspv_core::block::{bits_to_target, retarget, target_to_bits, BlockHeader};
use btcspv_core::params::{get_mainnet_genesis_header, get_testnet_genesis_header, mainnet_genesis_hash, ChainParams, Network};

#[test]
fn mainnet_genesis_header_satisfies_its_own_proof_of_work() {
	let genesis = get_mainnet_genesis_header();
	assert!(genesis.check_pow(), "the real genesis header must beat its own target");
	assert_eq!(genesis.hash().reversed(), mainnet_genesis_hash());
}

#[test]
fn testnet_genesis_differs_from_mainnet_but_shares_max_bits() {
	let mainnet = get_mainnet_genesis_header();
	let testnet = get_testnet_genesis_header();
	assert_ne!(mainnet.hash(), testnet.hash());
	assert_eq!(mainnet.bits, testnet.bits);
}

#[test]
fn chain_params_round_trip_through_network_selection() {
	for network in [Network::Mainnet, Network::Testnet, Network::Signet] {
		let params = ChainParams::for_network(network);
		assert_eq!(params.network, network);
	}
	assert_eq!(ChainParams::for_network(Network::Mainnet).port, 8333);
}

#[test]
fn a_slow_period_eases_the_target_and_a_fast_one_tightens_it() {
	let genesis = get_mainnet_genesis_header();
	let bits = genesis.bits;

	// A period that took four times as long as the two-week target eases
	// (raises) the next target; a period that took a quarter as long
	// tightens (lowers) it. Both must still round-trip through bits.
	let eased = retarget(genesis.timestamp, genesis.timestamp + 4 * btcspv_core::block::TWO_WEEKS as u32, bits);
	let tightened = retarget(genesis.timestamp, genesis.timestamp + (btcspv_core::block::TWO_WEEKS / 4) as u32, bits);

	assert!(bits_to_target(eased) >= bits_to_target(bits));
	assert!(bits_to_target(tightened) <= bits_to_target(bits));
	assert_eq!(target_to_bits(&bits_to_target(eased)), eased);
}

#[test]
fn next_bits_matches_the_free_function_retarget() {
	let first = get_mainnet_genesis_header();
	let mut last = first.clone();
	last.timestamp += btcspv_core::block::TWO_WEEKS as u32;

	assert_eq!(last.next_bits(&first), retarget(first.timestamp, last.timestamp, last.bits));
}

#[test]
fn header_round_trips_through_hex() {
	let genesis = get_mainnet_genesis_header();
	let hex = btcspv_util::hex::to_hex(&genesis.to_bytes());
	let reparsed = BlockHeader::from_hex(&hex).unwrap();
	assert_eq!(reparsed, genesis);
}
