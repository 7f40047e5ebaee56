use crate::serial::SerialFrame;
use crate::utils::bools_to_int;

/// Service-request aggregator.  Flags raised between two loads are remembered in `noted`; a
/// load hands the masked set to the serial shift register and starts noting afresh from the
/// flags present on the load tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequests {
	width: usize,
	noted: u64,
	shift: SerialFrame,
}

impl ServiceRequests {

	/// `width` is the number of sources, channels plus the host request bit.
	pub fn new(width:usize) -> Self {
		Self{ width, noted: 0, shift: SerialFrame::Idle }
	}

	pub fn width(&self) -> usize { self.width }
	pub fn noted(&self) -> u64 { self.noted }
	pub fn current_bit(&self) -> bool { self.shift.current_bit() }

	/// The frame captured by the last load, as a word (bit i = source i).
	pub fn loaded(&self) -> Option<u64> {
		self.shift.frame().and_then(|bits| bools_to_int::to_u64(bits).ok())
	}

	pub fn next(&self, flags:u64, mask:u64, load:bool, advance:bool) -> Self {
		let flags = flags & self.source_mask();
		if load {
			let captured = self.noted & mask & self.source_mask();
			Self{ width: self.width, noted: flags, shift: SerialFrame::load(bools_to_int::from_u64(captured, self.width)) }
		} else {
			let shift = if advance { self.shift.advanced() } else { self.shift.clone() };
			Self{ width: self.width, noted: self.noted | flags, shift }
		}
	}

	fn source_mask(&self) -> u64 {
		if self.width >= 64 { !0 } else { (1u64 << self.width) - 1 }
	}

}
