use log::{debug, info};

use crate::BasebandErr;
use crate::channel::correlator::{IqFrame, IQ_FRAME_BITS};
use crate::code::e1b::E1bCodeBook;
use crate::config::{ChannelPlan, EngineConfig};
use crate::engine::{Engine, TickInputs, TickOutput};
use crate::host::{HostCmd, WriteOp, READ_CHANNEL_IQ, READ_SERVICE_REQUESTS, READ_SNAPSHOT};
use crate::sampler::{Capture, BULK_WORD_BITS};
use crate::snapshot::Snapshot;
use crate::timebase::TimeBase;
use crate::timebase::sync::{self, Metastability, Settled, SyncPolicy, TimeTx};
use crate::utils::bools_to_int;

/// The sampling clock domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleDomain {
	time: TimeBase,
	line: bool,
	tx: TimeTx,
	capture: Capture,
}

/// What the core domain can see of the sampling domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Boundary {
	line: bool,
	time_word: u64,
	time_req: bool,
	capture_done: bool,
}

impl SampleDomain {

	pub fn power_on(cfg:&EngineConfig) -> Self {
		Self{ time: TimeBase::power_on(cfg.power_on_ticks), line: false, tx: TimeTx::default(), capture: Capture::new(cfg.capture_words) }
	}

	pub fn ticks(&self) -> u64 { self.time.ticks() }
	pub fn capture(&self) -> &Capture { &self.capture }

	/// `ack` and `batch_req` are the core-domain toggles as this edge sees them.
	pub fn next(self, sample:bool, ack:bool, batch_req:bool) -> Self {
		let time = self.time.next();
		let tx = self.tx.next(time.ticks(), ack);
		Self{ time, line: sample, tx, capture: self.capture.next(sample, batch_req) }
	}

	fn boundary(&self, policy:SyncPolicy) -> Boundary {
		let time_word = match policy {
			SyncPolicy::Handshake => self.tx.hold(),
			SyncPolicy::PerBit    => self.time.ticks(),
		};
		Boundary{ line: self.line, time_word, time_req: self.tx.req(), capture_done: self.capture.done() }
	}

}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
	Sample{ coincident: bool },
	Core{ coincident: bool },
}

/// Interleaves the two clocks.  Time is counted in units of 1/(2 * sample_hz * core_hz)
/// seconds: core edges fall on even multiples of `sample_hz`, sample edges half a sample
/// period later than the rational grid so that equal rates never line up.  An edge within the
/// aperture after an edge of the other clock is coincident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clocking {
	sample_hz: u128,
	core_hz: u128,
	sample_edges: u128,
	core_edges: u128,
	last_sample: Option<u128>,
	last_core: Option<u128>,
	aperture: u128,
}

impl Clocking {

	pub fn new(sample_hz:u64, core_hz:u64) -> Self {
		let sample_hz = sample_hz as u128;
		let core_hz = core_hz as u128;
		let aperture = std::cmp::max(1, (2 * sample_hz) / 32);
		Self{ sample_hz, core_hz, sample_edges: 0, core_edges: 0, last_sample: None, last_core: None, aperture }
	}

	pub fn sample_edges(&self) -> u128 { self.sample_edges }
	pub fn core_edges(&self) -> u128 { self.core_edges }

	pub fn next_edge(&mut self) -> Edge {
		let t_sample = (2 * self.sample_edges + 1) * self.core_hz;
		let t_core   = 2 * self.core_edges * self.sample_hz;
		if t_sample <= t_core {
			self.sample_edges += 1;
			self.last_sample = Some(t_sample);
			let coincident = self.last_core.map(|t| t_sample - t < self.aperture).unwrap_or(false);
			Edge::Sample{ coincident }
		} else {
			self.core_edges += 1;
			self.last_core = Some(t_core);
			let coincident = self.last_sample.map(|t| t_core - t < self.aperture).unwrap_or(false);
			Edge::Core{ coincident }
		}
	}

}

/// Both clock domains driven from a sample source, plus the host-side transactions built
/// from single-tick commands.
pub struct Receiver<S: Iterator<Item=bool>> {
	source: S,
	exhausted: bool,
	policy: SyncPolicy,
	clocking: Clocking,
	resolver: Box<dyn Metastability>,
	before: Boundary,
	// Core-domain toggles (ack, batch_req) as they were before the last core edge
	core_before: (bool, bool),
	sample_domain: Option<SampleDomain>,
	engine: Engine,
}

impl<S: Iterator<Item=bool>> Receiver<S> {

	pub fn new(cfg:&EngineConfig, book:Option<E1bCodeBook>, source:S) -> Result<Self, BasebandErr> {
		Ok(Self::with_engine(cfg, Engine::new(cfg, book)?, source))
	}

	/// Loads the code book the configuration names, if any.
	pub fn from_config(cfg:&EngineConfig, source:S) -> Result<Self, BasebandErr> {
		Ok(Self::with_engine(cfg, Engine::from_config(cfg)?, source))
	}

	fn with_engine(cfg:&EngineConfig, engine:Engine, source:S) -> Self {
		let sample_domain = SampleDomain::power_on(cfg);
		let before = sample_domain.boundary(cfg.time_sync);
		Self{ source, exhausted: false, policy: cfg.time_sync,
			clocking: Clocking::new(cfg.sample_rate_hz, cfg.core_rate_hz),
			resolver: Box::new(Settled), before, core_before: (engine.time_ack(), engine.batch_req()),
			sample_domain: Some(sample_domain), engine }
	}

	pub fn with_resolver(self, resolver:Box<dyn Metastability>) -> Self {
		Self{ resolver, ..self }
	}

	pub fn engine(&self) -> &Engine { &self.engine }
	pub fn sample_domain(&self) -> Option<&SampleDomain> { self.sample_domain.as_ref() }
	pub fn exhausted(&self) -> bool { self.exhausted }
	pub fn clocking(&self) -> &Clocking { &self.clocking }

	/// Raw time base, for consumers clocked by the sample clock.
	pub fn absolute_ticks(&self) -> u64 {
		self.sample_domain.as_ref().map(|sd| sd.ticks()).unwrap_or(0)
	}

	pub fn serial_out(&self) -> bool { self.engine.serial_out() }

	/// The 16-bit bulk path: the captured word at the current bulk address.
	pub fn bulk_word(&self) -> u16 {
		self.sample_domain.as_ref().map(|sd| sd.capture().word(self.engine.bulk_addr())).unwrap_or(0)
	}

	/// Runs sample edges up to and including the next core edge, which carries `cmd`.  Once the
	/// source runs dry the sample clock keeps running with the line low.
	pub fn step(&mut self, cmd:HostCmd) -> TickOutput {
		loop {
			match self.clocking.next_edge() {
				Edge::Sample{ coincident } => self.sample_edge(coincident),
				Edge::Core{ coincident } => return self.core_edge(cmd, coincident),
			}
		}
	}

	fn sample_edge(&mut self, coincident:bool) {
		let sample = match self.source.next() {
			Some(s) => s,
			None => {
				if !self.exhausted { info!("Sample source exhausted after {} samples", self.clocking.sample_edges()); }
				self.exhausted = true;
				false
			},
		};
		let m = self.resolver.as_mut();
		let (ack_before, req_before) = self.core_before;
		let ack = sync::sample_bit(ack_before, self.engine.time_ack(), coincident, m);
		let batch_req = sync::sample_bit(req_before, self.engine.batch_req(), coincident, m);
		if let Some(sd) = self.sample_domain.take() {
			self.before = sd.boundary(self.policy);
			self.sample_domain = Some(sd.next(sample, ack, batch_req));
		}
	}

	fn core_edge(&mut self, cmd:HostCmd, coincident:bool) -> TickOutput {
		let after = match &self.sample_domain {
			Some(sd) => sd.boundary(self.policy),
			None => self.before,
		};
		let m = self.resolver.as_mut();
		let inputs = TickInputs{
			sample: sync::sample_bit(self.before.line, after.line, coincident, m),
			cmd,
			time_word: sync::sample_word(self.before.time_word, after.time_word, coincident, m),
			time_req: sync::sample_bit(self.before.time_req, after.time_req, coincident, m),
			capture_done: sync::sample_bit(self.before.capture_done, after.capture_done, coincident, m),
		};
		self.core_before = (self.engine.time_ack(), self.engine.batch_req());
		self.engine.tick(&inputs)
	}

	pub fn idle(&mut self, ticks:usize) {
		for _ in 0..ticks { self.step(HostCmd::Idle); }
	}

	pub fn write(&mut self, op:WriteOp) -> TickOutput {
		self.step(HostCmd::Write(op))
	}

	/// Issues the register writes of a channel plan.
	pub fn program(&mut self, plan:&ChannelPlan, cfg:&EngineConfig) {
		debug!("Programming channel {} for PRN {} ({:?})", plan.channel, plan.prn, plan.mode);
		self.write(WriteOp::SetChannel(plan.channel));
		for w in plan.writes(cfg) {
			self.write(WriteOp::Channel(w));
		}
	}

	fn drain(&mut self, bits:usize) -> Vec<bool> {
		(0..bits).map(|_| {
			let b = self.serial_out();
			self.step(HostCmd::Continue);
			b
		}).collect()
	}

	/// Pending sources, bit i = channel i and bit N = host request, as masked by the channel mask.
	pub fn read_service_requests(&mut self) -> Result<u64, BasebandErr> {
		self.step(READ_SERVICE_REQUESTS);
		let bits = self.drain(self.engine.num_channels() + 1);
		bools_to_int::to_u64(&bits)
	}

	pub fn read_snapshot(&mut self) -> Result<Snapshot, BasebandErr> {
		self.step(READ_SNAPSHOT);
		let n = self.engine.num_channels();
		let bits = self.drain(Snapshot::frame_bits(n));
		Snapshot::from_bits(&bits, n)
	}

	/// The I/Q frame latched at the channel's most recent epoch.  Leaves the command register
	/// pointing at `channel`.
	pub fn read_channel_iq(&mut self, channel:u8) -> Result<IqFrame, BasebandErr> {
		self.write(WriteOp::SetChannel(channel));
		self.step(READ_CHANNEL_IQ);
		let bits = self.drain(IQ_FRAME_BITS);
		IqFrame::from_bits(&bits)
	}

	/// Requests a sample batch, waits for the host request pulse that reports its completion
	/// and reads the words back over the bulk path.
	pub fn read_sample_batch(&mut self) -> Result<Vec<u16>, BasebandErr> {
		let words = self.sample_domain.as_ref().map(|sd| sd.capture().capacity()).unwrap_or(0);
		if words == 0 {
			return Err(BasebandErr::InvalidConfig("Sample capture has no buffer"));
		}

		self.write(WriteOp::RequestSampleBatch);

		// Capture time in core ticks plus the synchronizer round trip
		let ratio = (self.clocking.core_hz + self.clocking.sample_hz - 1) / self.clocking.sample_hz;
		let limit = 2 * ((words * BULK_WORD_BITS + 16) as u128) * ratio + 64;
		let mut waited:u128 = 0;
		while !self.engine.host_request() {
			if waited > limit {
				return Err(BasebandErr::Timeout("Sample batch never completed"));
			}
			self.step(HostCmd::Idle);
			waited += 1;
		}

		Ok((0..words).map(|_| {
			let w = self.bulk_word();
			self.step(HostCmd::BulkNext);
			w
		}).collect())
	}

}

#[cfg(test)]
mod tests;
