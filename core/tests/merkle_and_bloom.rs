//! A watcher scenario: a bloom filter flags the transactions of interest,
//! and the peer's resulting `merkleblock` proof is checked against an
//! independently-built merkle tree.

use btcspv_core::bloom::BloomFilter;
use btcspv_core::block::BlockHeader;
use btcspv_core::encoding::{hash256, Hash256};
use btcspv_core::merkle::{merkle_parent, MerkleBlock};

fn header_with_root(root: Hash256) -> BlockHeader {
	BlockHeader {
		version: 1,
		prev_block: Hash256::from_bytes(&[0u8; 32]),
		merkle_root: root,
		timestamp: 1_231_006_505,
		bits: 0x1d00ffff,
		nonce: 0,
	}
}

#[test]
fn bloom_filter_flags_the_watched_txid_among_four() {
	let a = hash256(b"tx-a");
	let b = hash256(b"tx-b-watched");
	let c = hash256(b"tx-c");
	let d = hash256(b"tx-d");

	let mut filter = BloomFilter::new(32, 5, 0xdead_beef);
	filter.add(b.as_bytes());

	assert!(filter.might_contain(b.as_bytes()));
	assert!(!filter.might_contain(a.as_bytes()));
	assert!(!filter.might_contain(c.as_bytes()));
	assert!(!filter.might_contain(d.as_bytes()));

	// The filter round-trips through the `filterload` wire payload.
	let mut buf = Vec::new();
	filter.serialize(&mut buf).unwrap();
	let parsed = BloomFilter::parse(&mut &buf[..]).unwrap();
	assert!(parsed.might_contain(b.as_bytes()));
}

#[test]
fn merkleblock_proves_just_the_watched_leaf() {
	let a = hash256(b"tx-a");
	let b = hash256(b"tx-b-watched");
	let c = hash256(b"tx-c");
	let d = hash256(b"tx-d");

	let ab = merkle_parent(&a, &b);
	let cd = merkle_parent(&c, &d);
	let root = merkle_parent(&ab, &cd);

	// Depth-first preorder flags: root=1, ab=1, leaf-a=0, leaf-b=1, cd=0.
	let flags = vec![0b0000_1011];
	let hashes = vec![a, b, cd];

	let block = MerkleBlock {
		header: header_with_root(root),
		total_transactions: 4,
		hashes,
		flags,
	};

	let recomputed = block.populate_tree().unwrap();
	assert_eq!(recomputed, root);
}

#[test]
fn merkleblock_rejects_a_proof_for_the_wrong_header() {
	let a = hash256(b"tx-a");
	let b = hash256(b"tx-b-watched");
	let c = hash256(b"tx-c");
	let d = hash256(b"tx-d");

	let ab = merkle_parent(&a, &b);
	let cd = merkle_parent(&c, &d);

	let block = MerkleBlock {
		header: header_with_root(hash256(b"some other block's root")),
		total_transactions: 4,
		hashes: vec![a, b, cd],
		flags: vec![0b0000_1011],
	};

	assert!(block.populate_tree().is_err());
}
