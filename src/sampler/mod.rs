use log::debug;

use crate::timebase::sync::BitSync;

pub const BULK_WORD_BITS:usize = 16;

/// Sample-domain batch capture.  A toggle of the core domain's request starts a batch of
/// `capacity` 16-bit words, packed earliest sample in the MSB; completion toggles `done`
/// back towards the core domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
	req_sync: BitSync,
	req_seen: bool,
	active: bool,
	pos: usize,
	words: Vec<u16>,
	done: bool,
}

impl Capture {

	pub fn new(capacity:usize) -> Self {
		Self{ req_sync: BitSync::default(), req_seen: false, active: false, pos: 0, words: vec![0; capacity], done: false }
	}

	pub fn capacity(&self) -> usize { self.words.len() }
	pub fn active(&self) -> bool { self.active }
	pub fn done(&self) -> bool { self.done }
	pub fn words(&self) -> &[u16] { &self.words }

	/// Word at a bulk address; addresses wrap around the buffer.
	pub fn word(&self, addr:usize) -> u16 {
		if self.words.is_empty() { 0 } else { self.words[addr % self.words.len()] }
	}

	/// `sample` is the line value on this edge and `req` the core-domain request toggle as
	/// this edge sees it.  Consumes the old state so the buffer moves instead of copying.
	pub fn next(self, sample:bool, req:bool) -> Self {
		let req_sync = self.req_sync.next(req);
		let total_bits = self.words.len() * BULK_WORD_BITS;

		if !self.active {
			let requested = self.req_sync.out();
			if requested != self.req_seen && total_bits > 0 {
				debug!("Sample batch of {} words started", self.words.len());
				return Self{ req_sync, req_seen: requested, active: true, pos: 0, words: vec![0; self.words.len()], done: self.done };
			}
			return Self{ req_sync, req_seen: requested, ..self };
		}

		let mut words = self.words;
		if sample {
			words[self.pos / BULK_WORD_BITS] |= 0x8000 >> (self.pos % BULK_WORD_BITS);
		}
		let pos = self.pos + 1;
		if pos == total_bits {
			debug!("Sample batch complete");
			Self{ req_sync, req_seen: self.req_seen, active: false, pos: 0, words, done: !self.done }
		} else {
			Self{ req_sync, req_seen: self.req_seen, active: true, pos, words, done: self.done }
		}
	}

}
