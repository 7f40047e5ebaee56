use std::rc::Rc;

/// Which serial sources the last register-read command selected.  Exactly one bit is meant to
/// be set; with more than one the line carries the OR of the sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selector {
	pub snapshot: bool,
	pub service_requests: bool,
	pub channel_iq: bool,
}

impl Selector {

	pub const NONE:Selector             = Selector{ snapshot: false, service_requests: false, channel_iq: false };
	pub const SNAPSHOT:Selector         = Selector{ snapshot: true,  service_requests: false, channel_iq: false };
	pub const SERVICE_REQUESTS:Selector = Selector{ snapshot: false, service_requests: true,  channel_iq: false };
	pub const CHANNEL_IQ:Selector       = Selector{ snapshot: false, service_requests: false, channel_iq: true  };

	pub fn count(&self) -> usize {
		(self.snapshot as usize) + (self.service_requests as usize) + (self.channel_iq as usize)
	}

	/// The driven line: each source's bit gated by its selector bit, then OR'd.
	pub fn mux(&self, snapshot_bit:bool, srq_bit:bool, iq_bit:bool) -> bool {
		(self.snapshot & snapshot_bit) | (self.service_requests & srq_bit) | (self.channel_iq & iq_bit)
	}

}

/// A bit-serial source.  Loading captures a frame; every continuation read moves to the next
/// bit, wrapping back to the first, so the visible bit is always what a left-rotating shift
/// register would show in its most significant position.  The loaded bits are shared between
/// successive states; only `pos` changes while draining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialFrame {
	Idle,
	Draining{ bits: Rc<[bool]>, pos: usize },
}

impl Default for SerialFrame {
	fn default() -> Self { SerialFrame::Idle }
}

impl SerialFrame {

	pub fn load(bits:Vec<bool>) -> Self {
		if bits.is_empty() { SerialFrame::Idle } else { SerialFrame::Draining{ bits: bits.into(), pos: 0 } }
	}

	pub fn current_bit(&self) -> bool {
		match self {
			SerialFrame::Idle => false,
			SerialFrame::Draining{ bits, pos } => bits[*pos],
		}
	}

	pub fn advanced(&self) -> Self {
		match self {
			SerialFrame::Idle => SerialFrame::Idle,
			SerialFrame::Draining{ bits, pos } => SerialFrame::Draining{ bits: Rc::clone(bits), pos: (pos + 1) % bits.len() },
		}
	}

	pub fn len(&self) -> usize {
		match self {
			SerialFrame::Idle => 0,
			SerialFrame::Draining{ bits, .. } => bits.len(),
		}
	}

	/// The frame as loaded, independent of drain progress.
	pub fn frame(&self) -> Option<&[bool]> {
		match self {
			SerialFrame::Idle => None,
			SerialFrame::Draining{ bits, .. } => Some(&bits[..]),
		}
	}

}

#[cfg(test)]
mod tests {

	use super::*;

	#[test]
	fn drains_msb_first_and_rotates() {
		let mut f = SerialFrame::load(vec![true, false, false, true, true]);
		let mut seen = vec![];
		for _ in 0..10 {
			seen.push(f.current_bit());
			f = f.advanced();
		}
		assert_eq!(seen, vec![true, false, false, true, true, true, false, false, true, true]);
	}

	#[test]
	fn idle_source_drives_zero() {
		let f = SerialFrame::default();
		assert!(!f.current_bit());
		assert_eq!(f.advanced(), SerialFrame::Idle);
		assert_eq!(SerialFrame::load(vec![]), SerialFrame::Idle);
	}

	#[test]
	fn draining_shares_the_loaded_bits() {
		let f = SerialFrame::load(vec![true, false, true]);
		let g = f.advanced().advanced();
		match (&f, &g) {
			(SerialFrame::Draining{ bits: a, pos: 0 }, SerialFrame::Draining{ bits: b, pos: 2 }) => assert!(Rc::ptr_eq(a, b)),
			_ => panic!("Expected two draining frames"),
		}
		assert_eq!(g.frame(), Some(&[true, false, true][..]));
		assert!(g.current_bit());
	}

	#[test]
	fn mux_gates_each_source() {
		assert!( Selector::SNAPSHOT.mux(true, false, false));
		assert!(!Selector::SNAPSHOT.mux(false, true, true));
		assert!( Selector::SERVICE_REQUESTS.mux(false, true, false));
		assert!( Selector::CHANNEL_IQ.mux(false, false, true));
		assert!(!Selector::NONE.mux(true, true, true));

		// More than one selector is outside the contract; the line is simply the OR
		let both = Selector{ snapshot: true, service_requests: true, channel_iq: false };
		assert_eq!(both.count(), 2);
		assert!(both.mux(false, true, false));
	}

}
