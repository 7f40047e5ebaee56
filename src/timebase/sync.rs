use serde::{Serialize, Deserialize};

use super::TIMEBASE_MASK;

/// How the 48-bit time base reaches the core domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
	/// Hold register plus a single toggling request bit, acknowledged from the core domain.
	Handshake,
	/// Every bit through its own two-flop synchronizer.  Can tear.
	PerBit,
}

impl Default for SyncPolicy {
	fn default() -> Self { SyncPolicy::Handshake }
}

/// Decides how a flop resolves when its input changes inside the sampling aperture.
pub trait Metastability {
	/// true if the flop settles to the new value, false if it keeps the old one
	fn settles_to_new(&mut self) -> bool;
}

/// Always resolves to the new value.
#[derive(Debug, Default, Clone, Copy)]
pub struct Settled;

impl Metastability for Settled {
	fn settles_to_new(&mut self) -> bool { true }
}

/// The value a bank of flops captures from a bus that moved from `before` to `after` around
/// the sampling edge.  Outside the aperture the new value is captured cleanly; inside it, every
/// bit that is changing resolves on its own.
pub fn sample_word(before:u64, after:u64, coincident:bool, m:&mut dyn Metastability) -> u64 {
	if !coincident { return after; }

	let changing:u64 = before ^ after;
	(0..64).filter(|i| (changing >> i) & 1 == 1).fold(after, |acc, i| {
		if m.settles_to_new() { acc } else { acc ^ (1u64 << i) }
	})
}

pub fn sample_bit(before:bool, after:bool, coincident:bool, m:&mut dyn Metastability) -> bool {
	if coincident && before != after && !m.settles_to_new() { before } else { after }
}

/// Two-flop synchronizer for a single level or toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitSync {
	ff: [bool; 2],
}

impl BitSync {

	pub fn next(&self, d:bool) -> Self { Self{ ff: [d, self.ff[0]] } }
	pub fn out(&self) -> bool { self.ff[1] }

}

/// Sample-domain half of the handshake: a hold register that only reloads once the previous
/// value has been acknowledged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeTx {
	hold: u64,
	req: bool,
	ack_sync: BitSync,
}

impl TimeTx {

	pub fn hold(&self) -> u64 { self.hold }
	pub fn req(&self) -> bool { self.req }

	/// `ticks` is the counter value committed on this edge and `ack` the core-domain
	/// acknowledge toggle as seen by this edge.
	pub fn next(&self, ticks:u64, ack:bool) -> Self {
		let ack_sync = self.ack_sync.next(ack);
		if self.ack_sync.out() == self.req {
			Self{ hold: ticks & TIMEBASE_MASK, req: !self.req, ack_sync }
		} else {
			Self{ ack_sync, ..*self }
		}
	}

}

/// Core-domain half of the crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRx {
	policy: SyncPolicy,
	stages: [u64; 2],
	req_sync: BitSync,
	ack: bool,
	value: u64,
}

impl TimeRx {

	pub fn new(policy:SyncPolicy, power_on_ticks:u64) -> Self {
		let v = power_on_ticks & TIMEBASE_MASK;
		Self{ policy, stages: [v, v], req_sync: BitSync::default(), ack: false, value: v }
	}

	pub fn policy(&self) -> SyncPolicy { self.policy }
	pub fn ack(&self) -> bool { self.ack }

	/// The synchronized time base as the core domain currently sees it.
	pub fn value(&self) -> u64 {
		match self.policy {
			SyncPolicy::Handshake => self.value,
			SyncPolicy::PerBit    => self.stages[1],
		}
	}

	/// `word` is the hold register (handshake) or the raw counter (per-bit) as captured on
	/// this core edge, `req` the request toggle as captured on this edge.
	pub fn next(&self, word:u64, req:bool) -> Self {
		match self.policy {
			SyncPolicy::PerBit => Self{ stages: [word & TIMEBASE_MASK, self.stages[0]], ..*self },
			SyncPolicy::Handshake => {
				let req_sync = self.req_sync.next(req);
				if self.req_sync.out() != self.ack {
					Self{ req_sync, ack: !self.ack, value: word & TIMEBASE_MASK, ..*self }
				} else {
					Self{ req_sync, ..*self }
				}
			}
		}
	}

}
