use serde::{Serialize, Deserialize};

use crate::BasebandErr;
use crate::channel::REPLICA_BITS;
use crate::timebase::TIMEBASE_BITS;
use crate::utils::bools_to_int;

/// Channel state tied to one synchronized time base value.  The serialized frame is the time
/// base, then the pending bits of channels N-1 down to 0, then the replicas of channels N-1
/// down to 0, every field MSB first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
	pub ticks: u64,
	/// bit i = channel i has an epoch pending
	pub pending: u64,
	/// indexed by channel
	pub replicas: Vec<u16>,
}

impl Snapshot {

	pub fn frame_bits(num_channels:usize) -> usize {
		TIMEBASE_BITS as usize + num_channels + REPLICA_BITS * num_channels
	}

	pub fn num_channels(&self) -> usize { self.replicas.len() }

	pub fn is_pending(&self, channel:usize) -> bool {
		channel < 64 && (self.pending >> channel) & 1 == 1
	}

	pub fn to_bits(&self) -> Vec<bool> {
		let n = self.num_channels();
		let mut ans:Vec<bool> = Vec::with_capacity(Self::frame_bits(n));
		bools_to_int::append_u64(&mut ans, self.ticks, TIMEBASE_BITS as usize);
		bools_to_int::append_u64(&mut ans, self.pending, n);
		for r in self.replicas.iter().rev() {
			bools_to_int::append_u64(&mut ans, *r as u64, REPLICA_BITS);
		}
		ans
	}

	pub fn from_bits(bits:&[bool], num_channels:usize) -> Result<Self, BasebandErr> {
		if bits.len() != Self::frame_bits(num_channels) {
			return Err(BasebandErr::InvalidFrame("Snapshot frame length does not match the channel count"));
		}

		let (time_bits, rest) = bits.split_at(TIMEBASE_BITS as usize);
		let (pending_bits, replica_bits) = rest.split_at(num_channels);

		let ticks = bools_to_int::to_u64(time_bits)?;
		let pending = bools_to_int::to_u64(pending_bits)?;
		let mut replicas:Vec<u16> = replica_bits.chunks(REPLICA_BITS)
			.map(bools_to_int::to_u16)
			.collect::<Result<Vec<u16>, BasebandErr>>()?;
		replicas.reverse();

		Ok(Self{ ticks, pending, replicas })
	}

	/// Chip index part of a channel's replica.
	pub fn chip(&self, channel:usize) -> Option<u16> {
		self.replicas.get(channel).map(|r| r >> 4)
	}

}
