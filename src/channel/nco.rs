const PHASE_STEPS:f64 = 4294967296.0;

/// 32-bit phase accumulator.  The carry out of the accumulator is the strobe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Nco {
	phase: u32,
	fcw: u32,
}

impl Nco {

	pub fn new(fcw:u32) -> Self { Self{ phase: 0, fcw } }

	pub fn phase(&self) -> u32 { self.phase }
	pub fn fcw(&self) -> u32 { self.fcw }

	pub fn with_fcw(&self, fcw:u32) -> Self { Self{ fcw, ..*self } }
	pub fn reset(&self) -> Self { Self{ phase: 0, ..*self } }

	pub fn advanced(&self) -> (Self, bool) {
		let (phase, carry) = self.phase.overflowing_add(self.fcw);
		(Self{ phase, ..*self }, carry)
	}

	/// Sign bits of the cosine and sine replicas at the current phase, true meaning negative.
	pub fn carrier_signs(&self) -> (bool, bool) {
		let b31 = (self.phase >> 31) & 1 == 1;
		let b30 = (self.phase >> 30) & 1 == 1;
		(b31 != b30, b31)
	}

}

/// Frequency control word producing `freq_hz` from a `clock_hz` tick rate.  Negative
/// frequencies wrap to the equivalent positive word.
pub fn fcw_for(freq_hz:f64, clock_hz:f64) -> u32 {
	let cycles_per_tick = (freq_hz / clock_hz).rem_euclid(1.0);
	((cycles_per_tick * PHASE_STEPS).round() as u64 & 0xFFFF_FFFF) as u32
}

pub fn freq_for(fcw:u32, clock_hz:f64) -> f64 {
	((fcw as f64) / PHASE_STEPS) * clock_hz
}
