/// Clock-domain crossing of the time base into the core domain
pub mod sync;

pub const TIMEBASE_BITS:u32 = 48;
pub const TIMEBASE_MASK:u64 = (1u64 << TIMEBASE_BITS) - 1;

/// Free-running 48-bit sample-clock counter.  It has no reset; elapsed time is only observable by
/// comparing two captured values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBase {
	ticks: u64,
}

impl TimeBase {

	/// Counter as it comes out of power-on.  Values wider than 48 bits are truncated.
	pub fn power_on(ticks:u64) -> Self { Self{ ticks: ticks & TIMEBASE_MASK } }

	pub fn ticks(&self) -> u64 { self.ticks }

	pub fn next(&self) -> Self { Self{ ticks: self.ticks.wrapping_add(1) & TIMEBASE_MASK } }

}

/// Number of ticks from `earlier` to `later`, assuming at most one wrap in between.
pub fn elapsed(earlier:u64, later:u64) -> u64 {
	later.wrapping_sub(earlier) & TIMEBASE_MASK
}
