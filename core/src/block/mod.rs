//! Block header, proof-of-work and difficulty retargeting (§4.5).

pub mod header;
pub mod target;

pub use header::BlockHeader;
pub use target::{bits_to_target, retarget, target_to_bits, MAX_BITS, TWO_WEEKS};
