use serde::{Serialize, Deserialize};

use crate::code::{Capability, CodeMode};
use crate::code::ca::CaGenerator;
use crate::code::e1b::{E1bCodeBook, E1bGenerator};
use crate::serial::SerialFrame;

pub mod correlator;
pub mod nco;

use self::correlator::{Accumulators, IqFrame};
use self::nco::Nco;

pub const REPLICA_BITS:usize = 16;

/// Configuration writes routed to the channel named by the command register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelWrite {
	SetCodeNco(u32),
	SetCarrierNco(u32),
	/// G2 register start state; restarts the C/A code at chip 0
	SetCaCode(u16),
	SetE1bCode(u8),
	SetCodeMode(CodeMode),
}

/// What one core tick presents to a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelInputs {
	/// The sample registered on the previous tick
	pub sample: bool,
	/// Code generation permitted (no pause in progress)
	pub run: bool,
	/// Sampler reset while this channel is free
	pub reset: bool,
	pub write: Option<ChannelWrite>,
	/// Continuation read for the I/Q frame
	pub iq_advance: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
	index: usize,
	capability: Capability,
	mode: CodeMode,
	code_nco: Nco,
	carrier_nco: Nco,
	second_half: bool,
	epl: [bool; 3],
	ca: CaGenerator,
	e1b: E1bGenerator,
	acc: Accumulators,
	epoch: bool,
	iq: SerialFrame,
	last_iq: IqFrame,
}

impl Channel {

	pub fn new(index:usize, capability:Capability) -> Self {
		Self{ index, capability, mode: CodeMode::Ca,
			code_nco: Nco::default(), carrier_nco: Nco::default(),
			second_half: false, epl: [false; 3],
			ca: CaGenerator::new(0x3FF), e1b: E1bGenerator::default(),
			acc: Accumulators::default(), epoch: false,
			iq: SerialFrame::Idle, last_iq: IqFrame::default() }
	}

	// Read-only getters
	pub fn index(&self) -> usize { self.index }
	pub fn capability(&self) -> Capability { self.capability }
	pub fn mode(&self) -> CodeMode { self.mode }
	pub fn code_nco(&self) -> Nco { self.code_nco }
	pub fn carrier_nco(&self) -> Nco { self.carrier_nco }
	pub fn accumulators(&self) -> Accumulators { self.acc }
	pub fn epoch_flag(&self) -> bool { self.epoch }
	pub fn last_iq(&self) -> IqFrame { self.last_iq }
	pub fn iq_bit(&self) -> bool { self.iq.current_bit() }
	pub fn ca(&self) -> CaGenerator { self.ca }
	pub fn e1b(&self) -> E1bGenerator { self.e1b }

	/// Chip index of the code the channel is currently correlating against.
	pub fn code_phase(&self) -> u16 {
		match self.mode {
			CodeMode::Ca  => self.ca.chip(),
			CodeMode::E1b => self.e1b.chip(),
		}
	}

	/// Code phase as captured into a snapshot: chip index, half-chip and the top three bits
	/// of the code NCO.
	pub fn replica(&self) -> u16 {
		((self.code_phase() & 0x0FFF) << 4) | ((self.second_half as u16) << 3) | ((self.code_nco.phase() >> 29) as u16)
	}

	/// The code bit presented to the early stage of the correlator.  An E1B channel multiplies
	/// in the BOC(1,1) sub-carrier, i.e. inverts the second half of every chip.  Asking an
	/// incapable channel for E1B, or for a PRN the code book lacks, yields a constant zero code.
	pub fn code_out(&self, book:Option<&E1bCodeBook>) -> bool {
		match (self.mode, self.capability) {
			(CodeMode::Ca, _) => self.ca.code_bit(),
			(CodeMode::E1b, Capability::E1b) => self.e1b.code_bit(book).map(|b| b ^ self.second_half).unwrap_or(false),
			(CodeMode::E1b, Capability::CaOnly) => false,
		}
	}

	fn reset(&self) -> Self {
		Self{ code_nco: self.code_nco.reset(), carrier_nco: self.carrier_nco.reset(),
			second_half: false, epl: [false; 3],
			ca: self.ca.reset(), e1b: self.e1b.reset(),
			acc: Accumulators::default(), epoch: false,
			..self.clone() }
	}

	fn written(self, write:ChannelWrite) -> Self {
		match write {
			ChannelWrite::SetCodeNco(fcw)    => Self{ code_nco: self.code_nco.with_fcw(fcw), ..self },
			ChannelWrite::SetCarrierNco(fcw) => Self{ carrier_nco: self.carrier_nco.with_fcw(fcw), ..self },
			ChannelWrite::SetCaCode(init)    => Self{ ca: CaGenerator::new(init), ..self },
			ChannelWrite::SetE1bCode(prn)    => Self{ e1b: self.e1b.with_prn(prn), ..self },
			ChannelWrite::SetCodeMode(mode)  => Self{ mode, ..self },
		}
	}

	/// State after one core tick.  Only reads `self` and the inputs.
	pub fn next(&self, inp:&ChannelInputs, book:Option<&E1bCodeBook>) -> Self {
		let stepped = if inp.reset { self.reset() } else { self.stepped(inp, book) };
		match inp.write {
			Some(w) => stepped.written(w),
			None    => stepped,
		}
	}

	fn stepped(&self, inp:&ChannelInputs, book:Option<&E1bCodeBook>) -> Self {
		let mut acc = self.acc.accumulate(inp.sample, self.epl, self.carrier_nco.carrier_signs());
		let (carrier_nco, _) = self.carrier_nco.advanced();

		let (code_nco, half_chip) = if inp.run { self.code_nco.advanced() } else { (self.code_nco, false) };

		let mut epl = self.epl;
		let mut second_half = self.second_half;
		let mut ca = self.ca;
		let mut e1b = self.e1b;
		let mut epoch = false;

		if half_chip {
			epl = [self.code_out(book), self.epl[0], self.epl[1]];
			if self.second_half {
				second_half = false;
				epoch = match self.mode {
					CodeMode::Ca  => { let (n, wrapped) = self.ca.advanced();  ca  = n; wrapped },
					CodeMode::E1b => { let (n, wrapped) = self.e1b.advanced(); e1b = n; wrapped },
				};
			} else {
				second_half = true;
			}
		}

		let (iq, last_iq) = if epoch {
			let frame = acc.latch();
			acc = Accumulators::default();
			(SerialFrame::load(frame.to_bits()), frame)
		} else if inp.iq_advance {
			(self.iq.advanced(), self.last_iq)
		} else {
			(self.iq.clone(), self.last_iq)
		};

		Self{ index: self.index, capability: self.capability, mode: self.mode,
			code_nco, carrier_nco, second_half, epl, ca, e1b, acc, epoch, iq, last_iq }
	}

}
