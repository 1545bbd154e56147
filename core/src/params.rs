//! Network-parameterized constants (§4.1/§4.8/§6), grouped into a
//! `ChainParams` value the way `core/src/global.rs` (obscura) centralizes
//! `ChainTypes`-dependent constants instead of scattering `if testnet {...}`
//! literals through the codebase.

use crate::block::header::BlockHeader;
use crate::encoding::Hash256;

/// Which Bitcoin network a piece of code is validating against.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Network {
	Mainnet,
	Testnet,
	Signet,
}

/// The constants that vary by network: wire magic, default port, address
/// version bytes and the genesis header.
#[derive(Clone, Copy, Debug)]
pub struct ChainParams {
	pub network: Network,
	pub magic: [u8; 4],
	pub port: u16,
	pub p2pkh_version: u8,
	pub p2sh_version: u8,
	pub wif_version: u8,
}

impl ChainParams {
	pub fn mainnet() -> ChainParams {
		ChainParams {
			network: Network::Mainnet,
			magic: [0xf9, 0xbe, 0xb4, 0xd9],
			port: 8333,
			p2pkh_version: 0x00,
			p2sh_version: 0x05,
			wif_version: 0x80,
		}
	}

	pub fn testnet() -> ChainParams {
		ChainParams {
			network: Network::Testnet,
			magic: [0x0b, 0x11, 0x09, 0x07],
			port: 18333,
			p2pkh_version: 0x6f,
			p2sh_version: 0xc4,
			wif_version: 0xef,
		}
	}

	pub fn signet() -> ChainParams {
		ChainParams {
			network: Network::Signet,
			// No dedicated wire magic is specified for signet by this
			// workspace; it reuses testnet's address versions and carries
			// only its own port.
			magic: [0x0a, 0x03, 0xcf, 0x40],
			port: 38333,
			p2pkh_version: 0x6f,
			p2sh_version: 0xc4,
			wif_version: 0xef,
		}
	}

	pub fn for_network(network: Network) -> ChainParams {
		match network {
			Network::Mainnet => ChainParams::mainnet(),
			Network::Testnet => ChainParams::testnet(),
			Network::Signet => ChainParams::signet(),
		}
	}
}

/// Mainnet genesis block header (block 0).
pub fn get_mainnet_genesis_header() -> BlockHeader {
	BlockHeader::from_hex(
		"0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c",
	)
	.expect("mainnet genesis header constant is well-formed")
}

/// Testnet3 genesis block header (block 0).
pub fn get_testnet_genesis_header() -> BlockHeader {
	BlockHeader::from_hex(
		"0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4adae5494dffff001d1aa4ae18",
	)
	.expect("testnet genesis header constant is well-formed")
}

/// The display-order (big-endian) hash of the mainnet genesis header, for
/// tests and sanity checks against well-known constants.
pub fn mainnet_genesis_hash() -> Hash256 {
	use crate::encoding::Hashed;
	get_mainnet_genesis_header().hash().reversed()
}
