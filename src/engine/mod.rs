use log::{debug, trace};

use crate::BasebandErr;
use crate::channel::{Channel, ChannelInputs};
use crate::code::e1b::E1bCodeBook;
use crate::config::EngineConfig;
use crate::host::{HostCmd, Session, WriteOp};
use crate::pause::PauseCounter;
use crate::serial::SerialFrame;
use crate::snapshot::Snapshot;
use crate::srq::ServiceRequests;
use crate::timebase::sync::{BitSync, TimeRx};

/// Everything the core domain sees on one of its clock edges.  Values coming from the sampling
/// domain are as captured by this edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInputs {
	pub sample: bool,
	pub cmd: HostCmd,
	/// Hold register (handshake) or raw counter (per-bit)
	pub time_word: u64,
	pub time_req: bool,
	/// Capture completion toggle
	pub capture_done: bool,
}

impl TickInputs {

	pub fn idle() -> Self { Self::default() }

	pub fn with_cmd(cmd:HostCmd) -> Self { Self{ cmd, ..Self::default() } }

}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutput {
	/// The pause counter's resume pulse
	pub resume: bool,
	/// Bit i = channel i completed an epoch on this tick
	pub epochs: u64,
}

/// Committed state of the core domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineState {
	session: Session,
	mask: u64,
	pause: PauseCounter,
	channels: Vec<Channel>,
	srq: ServiceRequests,
	snapshot: SerialFrame,
	time: TimeRx,
	sample_d: bool,
	batch_req: bool,
	done_sync: BitSync,
	done_seen: bool,
	host_request: bool,
	bulk_addr: usize,
}

impl EngineState {

	pub fn power_on(cfg:&EngineConfig) -> Self {
		let channels:Vec<Channel> = (0..cfg.num_channels).map(|i| Channel::new(i, cfg.capability(i))).collect();
		Self{ session: Session::default(), mask: 0, pause: PauseCounter::default(), channels,
			srq: ServiceRequests::new(cfg.srq_width()), snapshot: SerialFrame::Idle,
			time: TimeRx::new(cfg.time_sync, cfg.power_on_ticks), sample_d: false,
			batch_req: false, done_sync: BitSync::default(), done_seen: false, host_request: false,
			bulk_addr: 0 }
	}

	fn num_channels(&self) -> usize { self.channels.len() }

	fn source_mask(&self) -> u64 { (1u64 << (self.num_channels() + 1)) - 1 }

	fn epoch_flags(&self) -> u64 {
		self.channels.iter().enumerate().fold(0, |acc, (i, c)| acc | ((c.epoch_flag() as u64) << i))
	}

	/// Service-request sources as presented on this tick.
	fn request_flags(&self) -> u64 {
		self.epoch_flags() | ((self.host_request as u64) << self.num_channels())
	}

	fn snapshot_now(&self) -> Snapshot {
		let channel_bits = self.source_mask() >> 1;
		Snapshot{ ticks: self.time.value(), pending: (self.epoch_flags() | self.srq.noted()) & channel_bits,
			replicas: self.channels.iter().map(|c| c.replica()).collect() }
	}

	fn serial_out(&self) -> bool {
		let iq_bit = self.session.target(self.num_channels()).map(|i| self.channels[i].iq_bit()).unwrap_or(false);
		self.session.selector().mux(self.snapshot.current_bit(), self.srq.current_bit(), iq_bit)
	}

	fn next(&self, inp:&TickInputs, book:Option<&E1bCodeBook>) -> (Self, TickOutput) {
		let cmd = inp.cmd;
		let op = cmd.write_op();
		let selector = self.session.selector();
		let advance = cmd.is_continue();
		let target = self.session.target(self.num_channels());

		let reload = match op { Some(WriteOp::SetPauseCount(v)) => Some(v), _ => None };
		let (pause, resume) = self.pause.next(reload);

		let sampler_reset = op == Some(WriteOp::SamplerReset);
		let run = !self.pause.armed();
		let channel_write = cmd.channel_write();

		let channels:Vec<Channel> = self.channels.iter().enumerate().map(|(i, c)| {
			let inputs = ChannelInputs{
				sample: self.sample_d,
				run,
				reset: sampler_reset && (self.mask >> i) & 1 == 1,
				write: if target == Some(i) { channel_write } else { None },
				iq_advance: advance && selector.channel_iq && target == Some(i),
			};
			c.next(&inputs, book)
		}).collect();

		let srq = self.srq.next(self.request_flags(), self.mask, cmd.loads_service_requests(), advance && selector.service_requests);

		let snapshot = if cmd.loads_snapshot() {
			SerialFrame::load(self.snapshot_now().to_bits())
		} else if advance && selector.snapshot {
			self.snapshot.advanced()
		} else {
			self.snapshot.clone()
		};

		let mask = match op { Some(WriteOp::SetChannelMask(m)) => m & self.source_mask(), _ => self.mask };

		let (batch_req, bulk_addr) = match cmd {
			HostCmd::Write(WriteOp::RequestSampleBatch) => (!self.batch_req, 0),
			HostCmd::BulkNext => (self.batch_req, self.bulk_addr + 1),
			_ => (self.batch_req, self.bulk_addr),
		};

		let host_request = self.done_sync.out() != self.done_seen;

		let next = Self{ session: self.session.next(&cmd), mask, pause, channels, srq, snapshot,
			time: self.time.next(inp.time_word, inp.time_req), sample_d: inp.sample,
			batch_req, done_sync: self.done_sync.next(inp.capture_done), done_seen: self.done_sync.out(),
			host_request, bulk_addr };

		let out = TickOutput{ resume, epochs: next.epoch_flags() };
		(next, out)
	}

}

/// The core domain: committed state plus the read-only E1B code memory.
#[derive(Debug, Clone)]
pub struct Engine {
	book: Option<E1bCodeBook>,
	state: EngineState,
}

impl Engine {

	pub fn new(cfg:&EngineConfig, book:Option<E1bCodeBook>) -> Result<Self, BasebandErr> {
		cfg.validate()?;
		debug!("Engine with {} channels ({} E1B capable), {:?} time sync", cfg.num_channels, cfg.e1b_channels, cfg.time_sync);
		Ok(Self{ book, state: EngineState::power_on(cfg) })
	}

	/// Builds the engine and loads the code book named in the configuration, if any.
	pub fn from_config(cfg:&EngineConfig) -> Result<Self, BasebandErr> {
		let book = match &cfg.code_book {
			Some(path) => Some(E1bCodeBook::from_file(std::path::Path::new(path))?),
			None => None,
		};
		Self::new(cfg, book)
	}

	pub fn tick(&mut self, inp:&TickInputs) -> TickOutput {
		log_cmd(&inp.cmd);
		let (next, out) = self.state.next(inp, self.book.as_ref());
		if out.resume { debug!("Pause counter released code generation"); }
		if next.host_request { debug!("Host request raised by a finished sample batch"); }
		self.state = next;
		out
	}

	pub fn state(&self) -> &EngineState { &self.state }
	pub fn code_book(&self) -> Option<&E1bCodeBook> { self.book.as_ref() }

	pub fn num_channels(&self) -> usize { self.state.num_channels() }
	pub fn channel(&self, idx:usize) -> Option<&Channel> { self.state.channels.get(idx) }
	pub fn channels(&self) -> &[Channel] { &self.state.channels }
	pub fn session(&self) -> Session { self.state.session }
	pub fn mask(&self) -> u64 { self.state.mask }
	pub fn running(&self) -> bool { !self.state.pause.armed() }
	pub fn noted(&self) -> u64 { self.state.srq.noted() }
	pub fn host_request(&self) -> bool { self.state.host_request }
	pub fn synced_ticks(&self) -> u64 { self.state.time.value() }
	pub fn time_ack(&self) -> bool { self.state.time.ack() }
	pub fn batch_req(&self) -> bool { self.state.batch_req }
	pub fn bulk_addr(&self) -> usize { self.state.bulk_addr }

	/// The single serial output line.
	pub fn serial_out(&self) -> bool { self.state.serial_out() }

	/// The snapshot a load on the current tick would capture.
	pub fn snapshot_now(&self) -> Snapshot { self.state.snapshot_now() }

}

fn log_cmd(cmd:&HostCmd) {
	match cmd {
		HostCmd::Idle | HostCmd::Continue | HostCmd::BulkNext => {},
		HostCmd::Read(sel) => trace!("Register read {:?}", sel),
		HostCmd::Write(WriteOp::SamplerReset) => debug!("Sampler reset"),
		HostCmd::Write(op) => debug!("Register write {:?}", op),
	}
}

#[cfg(test)]
mod tests;
