/// Reloadable down-counter that holds code generation and releases it with a one-tick resume pulse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PauseCounter {
	count: u32,
	armed: bool,
}

impl PauseCounter {

	pub fn count(&self) -> u32 { self.count }
	pub fn armed(&self) -> bool { self.armed }

	/// Next state and whether this tick is the resume pulse.  A reload wins over everything
	/// else, so the pulse for a value V comes V + 1 ticks after the reload tick.
	pub fn next(&self, reload:Option<u32>) -> (Self, bool) {
		match reload {
			Some(v) => (Self{ count: v, armed: true }, false),
			None if self.armed && self.count == 0 => (Self{ count: 0, armed: false }, true),
			None if self.armed => (Self{ count: self.count - 1, armed: true }, false),
			None => (*self, false),
		}
	}

}
