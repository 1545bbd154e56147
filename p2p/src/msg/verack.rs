//! The `verack` message: empty payload, acknowledges a peer's `version`.

pub const COMMAND: &str = "verack";

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct VerackMessage;

impl VerackMessage {
	pub fn to_bytes(&self) -> Vec<u8> {
		Vec::new()
	}
}
