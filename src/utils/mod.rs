pub mod bools_to_int;

/// Converts a free-running tick count into seconds since the count's origin.
pub struct TickClock {
	rate_hz: f64,
	origin: u64,
	origin_set: bool,
}

impl TickClock {

	pub fn new(rate_hz:f64) -> Self {
		Self{ rate_hz, origin: 0, origin_set: false }
	}

	pub fn set_origin(&mut self, ticks:u64) {
		self.origin = ticks;
		self.origin_set = true;
	}

	pub fn has_origin(&self) -> bool { self.origin_set }

	/// Seconds elapsed since the origin, allowing for one wrap of a counter `width` bits wide.
	/// Widths of 64 and above are treated as a full 64-bit counter.
	pub fn seconds(&self, ticks:u64, width:u32) -> f64 {
		let mask:u64 = 1u64.checked_shl(width).map(|m| m - 1).unwrap_or(u64::max_value());
		let elapsed:u64 = ticks.wrapping_sub(self.origin) & mask;
		(elapsed as f64) / self.rate_hz
	}

}

#[test]
fn tick_clock_handles_wrap() {
	let mut clk = TickClock::new(1000.0);
	clk.set_origin((1u64 << 48) - 500);
	assert!(clk.has_origin());
	assert_eq!(clk.seconds(500, 48), 1.0);
	assert_eq!(clk.seconds((1u64 << 48) - 250, 48), 0.25);
}

#[test]
fn tick_clock_accepts_full_width_counters() {
	let mut clk = TickClock::new(1000.0);
	clk.set_origin(u64::max_value() - 499);
	assert_eq!(clk.seconds(500, 64), 1.0);
	assert_eq!(clk.seconds(500, 100), 1.0);
}
