//! BIP37 partial merkle tree (`merkleblock`): a depth-first walk that
//! reconstructs just enough of the tree to prove a subset of leaves (§4.6).
//!
//! Grounded on `pkg/bitcoin/block/merkleblock.go`'s `PopulateTree`, with
//! Open Question 1 resolved in favor of the canonical single-pop walk: the
//! source double-pops the flag/hash stacks at several call sites, which
//! this workspace treats as a bug rather than a behavior to preserve.

use std::io::{self, Read, Write};

use super::tree::{merkle_parent, MerkleTree};
use crate::block::header::BlockHeader;
use crate::encoding::bytes::{read_u32_le, write_u32_le};
use crate::encoding::hash::Hash256;
use crate::encoding::varint::{read_varint, write_varint};
use crate::error::{Error, ErrorKind};

/// A `merkleblock` message: a block header plus a partial merkle tree
/// proving a set of transactions are included in it.
#[derive(Clone, Debug)]
pub struct MerkleBlock {
	pub header: BlockHeader,
	pub total_transactions: u32,
	pub hashes: Vec<Hash256>,
	pub flags: Vec<u8>,
}

impl MerkleBlock {
	pub fn serialize<W: Write>(&self, w: &mut W) -> io::Result<()> {
		self.header.serialize(w)?;
		write_u32_le(w, self.total_transactions)?;
		write_varint(w, self.hashes.len() as u64)?;
		for h in &self.hashes {
			w.write_all(h.as_bytes())?;
		}
		write_varint(w, self.flags.len() as u64)?;
		w.write_all(&self.flags)
	}

	pub fn parse<R: Read>(r: &mut R) -> Result<MerkleBlock, Error> {
		let header = BlockHeader::parse(r)?;
		let total_transactions = read_u32_le(r)?;
		let hash_count = read_varint(r)?;
		let mut hashes = Vec::with_capacity(hash_count as usize);
		for _ in 0..hash_count {
			let mut buf = [0u8; 32];
			r.read_exact(&mut buf)?;
			hashes.push(Hash256::from_bytes(&buf));
		}
		let flag_byte_count = read_varint(r)?;
		let mut flags = vec![0u8; flag_byte_count as usize];
		r.read_exact(&mut flags)?;
		Ok(MerkleBlock {
			header,
			total_transactions,
			hashes,
			flags,
		})
	}

	/// Reads one flag bit, LSB-first within each byte, per BIP37.
	fn flag_bit(flags: &[u8], index: usize) -> u8 {
		(flags[index / 8] >> (index % 8)) & 1
	}

	/// Reconstructs the merkle root from `hashes`/`flags`, validating that
	/// every hash and every flag bit is consumed exactly once (single-pop:
	/// Open Question 1) and that the header's `merkle_root` matches.
	///
	/// Returns `MalformedProof` if the walk under- or over-consumes its
	/// inputs, or if the recomputed root disagrees with the header.
	pub fn populate_tree(&self) -> Result<Hash256, Error> {
		let total = self.total_transactions as usize;
		if total == 0 {
			return Err(ErrorKind::MalformedProof("merkle block claims zero transactions".to_string()).into());
		}
		let mut tree = MerkleTree::empty(total);
		let max_depth = tree.max_depth();

		let mut hash_pos = 0usize;
		let mut flag_pos = 0usize;

		let mut next_flag = |flag_pos: &mut usize| -> Result<u8, Error> {
			if *flag_pos >= self.flags.len() * 8 {
				return Err(ErrorKind::MalformedProof("ran out of flag bits".to_string()).into());
			}
			let bit = MerkleBlock::flag_bit(&self.flags, *flag_pos);
			*flag_pos += 1;
			Ok(bit)
		};
		let mut next_hash = |hash_pos: &mut usize| -> Result<Hash256, Error> {
			let h = *self
				.hashes
				.get(*hash_pos)
				.ok_or_else(|| ErrorKind::MalformedProof("ran out of hashes".to_string()))?;
			*hash_pos += 1;
			Ok(h)
		};

		fn walk(
			tree: &mut MerkleTree,
			max_depth: usize,
			depth: usize,
			index: usize,
			next_flag: &mut dyn FnMut(&mut usize) -> Result<u8, Error>,
			next_hash: &mut dyn FnMut(&mut usize) -> Result<Hash256, Error>,
			flag_pos: &mut usize,
			hash_pos: &mut usize,
		) -> Result<Hash256, Error> {
			let flag = next_flag(flag_pos)?;
			if depth == max_depth || flag == 0 {
				let h = next_hash(hash_pos)?;
				tree.set(depth, index, h);
				return Ok(h);
			}
			let left = walk(tree, max_depth, depth + 1, index * 2, next_flag, next_hash, flag_pos, hash_pos)?;
			let right = if index * 2 + 1 < tree.width(depth + 1) {
				walk(tree, max_depth, depth + 1, index * 2 + 1, next_flag, next_hash, flag_pos, hash_pos)?
			} else {
				left
			};
			let parent = merkle_parent(&left, &right);
			tree.set(depth, index, parent);
			Ok(parent)
		}

		let root = walk(&mut tree, max_depth, 0, 0, &mut next_flag, &mut next_hash, &mut flag_pos, &mut hash_pos)?;

		if hash_pos != self.hashes.len() {
			return Err(ErrorKind::MalformedProof("not all hashes were consumed".to_string()).into());
		}
		// Remaining flag bits beyond the last consumed one are padding to a
		// byte boundary, not an error, per BIP37.
		if flag_pos > self.flags.len() * 8 {
			return Err(ErrorKind::MalformedProof("not all flag bits were consumed".to_string()).into());
		}
		if root != self.header.merkle_root {
			return Err(ErrorKind::MalformedProof("recomputed root does not match header".to_string()).into());
		}
		Ok(root)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::encoding::hash256;

	fn header_with_root(root: Hash256) -> BlockHeader {
		BlockHeader {
			version: 1,
			prev_block: Hash256::from_bytes(&[0u8; 32]),
			merkle_root: root,
			timestamp: 0,
			bits: 0x1d00ffff,
			nonce: 0,
		}
	}

	#[test]
	fn two_leaf_block_with_both_matched() {
		let a = hash256(b"a");
		let b = hash256(b"b");
		let root = merkle_parent(&a, &b);
		let block = MerkleBlock {
			header: header_with_root(root),
			total_transactions: 2,
			hashes: vec![a, b],
			flags: vec![0b0000_0111],
		};
		assert_eq!(block.populate_tree().unwrap(), root);
	}

	#[test]
	fn root_only_proof_when_nothing_matched() {
		let a = hash256(b"a");
		let b = hash256(b"b");
		let root = merkle_parent(&a, &b);
		let block = MerkleBlock {
			header: header_with_root(root),
			total_transactions: 2,
			hashes: vec![root],
			flags: vec![0b0000_0000],
		};
		assert_eq!(block.populate_tree().unwrap(), root);
	}

	#[test]
	fn mismatched_root_is_malformed() {
		let a = hash256(b"a");
		let b = hash256(b"b");
		let wrong_root = hash256(b"not the root");
		let block = MerkleBlock {
			header: header_with_root(wrong_root),
			total_transactions: 2,
			hashes: vec![a, b],
			flags: vec![0b0000_0111],
		};
		assert!(block.populate_tree().is_err());
	}
}
