//! The transaction layer: inputs, outputs, legacy/SegWit (de)serialization,
//! sighash computation and per-input verification (§3/§4.4).

pub mod resolver;
pub mod transaction;
pub mod txin;
pub mod txout;

pub use resolver::{MapResolver, PrevTxResolver};
pub use transaction::{Transaction, SIGHASH_ALL, SIGHASH_ANYONECANPAY, SIGHASH_NONE, SIGHASH_SINGLE};
pub use txin::TxIn;
pub use txout::TxOut;
