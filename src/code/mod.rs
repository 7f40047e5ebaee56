use serde::{Serialize, Deserialize};

/// GPS L1 C/A Gold codes, the code a host injects into any channel
pub mod ca;

/// Galileo E1B memory codes, generated natively by capable channels
pub mod e1b;

/// Which code a channel correlates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeMode {
	Ca,
	E1b,
}

impl Default for CodeMode {
	fn default() -> Self { CodeMode::Ca }
}

impl CodeMode {

	pub fn period_chips(&self) -> usize {
		match self {
			CodeMode::Ca  => ca::CA_CODE_LENGTH,
			CodeMode::E1b => e1b::E1B_CODE_LENGTH,
		}
	}

}

/// Fixed at configuration time for each channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
	CaOnly,
	E1b,
}
