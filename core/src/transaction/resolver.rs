//! The injected dependency the transaction layer uses to fetch a previous
//! transaction by txid, kept free of any HTTP client per the spec's design
//! note (§4.4/§9).
//!
//! Grounded on `pkg/bitcoin/transaction/txfetcher/txfetcher.go`'s
//! `Fetcher` interface, narrowed to the one operation this crate's
//! `VerifyInput`/`SigHash` paths actually need.

use crate::encoding::Hash256;
use crate::error::Error;

use super::transaction::Transaction;

/// Supplies previously-confirmed transactions by id. Implementations may
/// cache; `fetch` must be idempotent for a given `(txid, testnet)` pair.
/// The core crate never depends on a concrete transport for this.
pub trait PrevTxResolver {
	fn fetch(&self, txid: &Hash256, testnet: bool) -> Result<Transaction, Error>;
}

/// A resolver backed by an in-memory map, useful for tests and for hosts
/// that pre-fetch the transactions a batch of verifications will need.
#[derive(Default)]
pub struct MapResolver {
	transactions: std::collections::HashMap<Hash256, Transaction>,
}

impl MapResolver {
	pub fn new() -> MapResolver {
		MapResolver::default()
	}

	pub fn insert(&mut self, tx: Transaction) {
		let txid = tx.txid();
		self.transactions.insert(txid, tx);
	}
}

impl PrevTxResolver for MapResolver {
	fn fetch(&self, txid: &Hash256, _testnet: bool) -> Result<Transaction, Error> {
		self.transactions
			.get(txid)
			.cloned()
			.ok_or_else(|| crate::error::ErrorKind::FetchError(format!("no cached transaction for txid {}", txid)).into())
	}
}
