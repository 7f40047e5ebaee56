use serde::{Serialize, Deserialize};

use crate::serial::Selector;

pub use crate::channel::ChannelWrite;

pub const CHANNEL_INDEX_MASK:u8 = 0x1F;

/// Register writes.  Per-channel writes go to whichever channel the command register holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteOp {
	/// Only the low five bits are kept; there is no bounds check
	SetChannel(u8),
	/// Bit i set frees channel i, bit N is the host request source
	SetChannelMask(u64),
	SetPauseCount(u32),
	Channel(ChannelWrite),
	SamplerReset,
	RequestSampleBatch,
}

/// Everything the host can present on one core tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCmd {
	Idle,
	Write(WriteOp),
	Read(Selector),
	Continue,
	BulkNext,
}

impl Default for HostCmd {
	fn default() -> Self { HostCmd::Idle }
}

pub const READ_SNAPSHOT:HostCmd         = HostCmd::Read(Selector::SNAPSHOT);
pub const READ_SERVICE_REQUESTS:HostCmd = HostCmd::Read(Selector::SERVICE_REQUESTS);
pub const READ_CHANNEL_IQ:HostCmd       = HostCmd::Read(Selector::CHANNEL_IQ);

impl HostCmd {

	pub fn write_op(&self) -> Option<WriteOp> {
		match self {
			HostCmd::Write(op) => Some(*op),
			_ => None,
		}
	}

	pub fn channel_write(&self) -> Option<ChannelWrite> {
		match self {
			HostCmd::Write(WriteOp::Channel(w)) => Some(*w),
			_ => None,
		}
	}

	pub fn is_continue(&self) -> bool { *self == HostCmd::Continue }

	/// Register reads that capture a new frame on the tick they are issued.
	pub fn loads_snapshot(&self) -> bool {
		match self { HostCmd::Read(sel) => sel.snapshot, _ => false }
	}

	pub fn loads_service_requests(&self) -> bool {
		match self { HostCmd::Read(sel) => sel.service_requests, _ => false }
	}

}

/// The command register and selector latch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
	channel: u8,
	selector: Selector,
}

impl Session {

	pub fn channel(&self) -> u8 { self.channel }
	pub fn selector(&self) -> Selector { self.selector }

	/// The channel a per-channel write or I/Q read on this tick concerns.
	pub fn target(&self, num_channels:usize) -> Option<usize> {
		let ch = self.channel as usize;
		if ch < num_channels { Some(ch) } else { None }
	}

	pub fn next(&self, cmd:&HostCmd) -> Self {
		match cmd {
			HostCmd::Write(WriteOp::SetChannel(ch)) => Self{ channel: ch & CHANNEL_INDEX_MASK, ..*self },
			HostCmd::Read(sel) => Self{ selector: *sel, ..*self },
			_ => *self,
		}
	}

}
