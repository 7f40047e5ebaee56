use std::fs::File;
use std::path::Path;

use log::info;
use serde::{Serialize, Deserialize};

use crate::BasebandErr;
use crate::channel::{nco, ChannelWrite};
use crate::code::{ca, Capability, CodeMode};
use crate::code::e1b::E1B_MAX_PRN;

pub const MAX_CHANNELS:usize = 32;
pub const L1_HZ:f64 = 1575.42e6;

fn default_num_channels() -> usize { 12 }
fn default_e1b_channels() -> usize { 4 }
fn default_rate_hz() -> u64 { 16_368_000 }
fn default_capture_words() -> usize { 1024 }
fn default_if_hz() -> f64 { 4.092e6 }

/// Static shape of the core plus the simulator's channel programming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
	#[serde(default = "default_num_channels")]
	pub num_channels: usize,
	/// Channels 0 up to this count carry an E1B generator
	#[serde(default = "default_e1b_channels")]
	pub e1b_channels: usize,
	#[serde(default)]
	pub time_sync: crate::timebase::sync::SyncPolicy,
	#[serde(default = "default_rate_hz")]
	pub sample_rate_hz: u64,
	#[serde(default = "default_rate_hz")]
	pub core_rate_hz: u64,
	/// Length of a requested sample batch in 16-bit words
	#[serde(default = "default_capture_words")]
	pub capture_words: usize,
	#[serde(default)]
	pub power_on_ticks: u64,
	/// Hex file of E1B primary codes
	#[serde(default)]
	pub code_book: Option<String>,
	/// Front-end intermediate frequency the carrier NCOs are programmed around
	#[serde(default = "default_if_hz")]
	pub if_hz: f64,
	#[serde(default)]
	pub channels: Vec<ChannelPlan>,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self{ num_channels: default_num_channels(), e1b_channels: default_e1b_channels(),
			time_sync: Default::default(),
			sample_rate_hz: default_rate_hz(), core_rate_hz: default_rate_hz(),
			capture_words: default_capture_words(), power_on_ticks: 0,
			code_book: None, if_hz: default_if_hz(), channels: vec![] }
	}
}

impl EngineConfig {

	pub fn from_json(text:&str) -> Result<Self, BasebandErr> {
		let cfg:Self = serde_json::from_str(text).map_err(|_| BasebandErr::InvalidConfig("Unable to parse configuration JSON"))?;
		cfg.validate()?;
		Ok(cfg)
	}

	pub fn from_file(path:&Path) -> Result<Self, BasebandErr> {
		let file = File::open(path).map_err(|_| BasebandErr::Io("Unable to open configuration file"))?;
		let cfg:Self = serde_json::from_reader(file).map_err(|_| BasebandErr::InvalidConfig("Unable to parse configuration JSON"))?;
		cfg.validate()?;
		info!("Loaded configuration from {}", path.display());
		Ok(cfg)
	}

	pub fn validate(&self) -> Result<(), BasebandErr> {
		if self.num_channels == 0 || self.num_channels > MAX_CHANNELS {
			return Err(BasebandErr::InvalidConfig("num_channels must be in 1..=32"));
		}
		if self.e1b_channels > self.num_channels {
			return Err(BasebandErr::InvalidConfig("e1b_channels exceeds num_channels"));
		}
		if self.sample_rate_hz == 0 || self.core_rate_hz == 0 {
			return Err(BasebandErr::InvalidConfig("Clock rates must be non-zero"));
		}
		for plan in &self.channels {
			plan.validate(self)?;
		}
		Ok(())
	}

	pub fn capability(&self, channel:usize) -> Capability {
		if channel < self.e1b_channels { Capability::E1b } else { Capability::CaOnly }
	}

	/// Width of the service-request frame and of the channel mask.
	pub fn srq_width(&self) -> usize { self.num_channels + 1 }

	/// Mask value that frees every channel and the host request source.
	pub fn all_free_mask(&self) -> u64 { (1u64 << self.srq_width()) - 1 }

}

/// How the simulator programs one channel before running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelPlan {
	pub channel: u8,
	pub prn: u8,
	#[serde(default)]
	pub mode: CodeMode,
	#[serde(default)]
	pub doppler_hz: f64,
}

impl ChannelPlan {

	pub fn validate(&self, cfg:&EngineConfig) -> Result<(), BasebandErr> {
		if self.channel as usize >= cfg.num_channels {
			return Err(BasebandErr::InvalidConfig("Channel plan names a channel that does not exist"));
		}
		match self.mode {
			CodeMode::Ca if ca::g2_init(self.prn as usize).is_none() =>
				Err(BasebandErr::InvalidConfig("C/A PRN must be in 1..=32")),
			CodeMode::E1b if self.prn == 0 || self.prn > E1B_MAX_PRN =>
				Err(BasebandErr::InvalidConfig("E1B PRN must be in 1..=50")),
			CodeMode::E1b if cfg.capability(self.channel as usize) != Capability::E1b =>
				Err(BasebandErr::InvalidConfig("E1B plan on a channel without an E1B generator")),
			_ => Ok(()),
		}
	}

	/// Register writes that set the channel up, in issue order.  The code NCO overflows once
	/// per half chip, scaled by the code Doppler.
	pub fn writes(&self, cfg:&EngineConfig) -> Vec<ChannelWrite> {
		let core_hz = cfg.core_rate_hz as f64;
		let half_chip_hz = 2.0 * ca::CA_CHIP_RATE_HZ * (1.0 + self.doppler_hz / L1_HZ);
		let code_write = match self.mode {
			CodeMode::Ca  => ChannelWrite::SetCaCode(ca::g2_init(self.prn as usize).unwrap_or(0x3FF)),
			CodeMode::E1b => ChannelWrite::SetE1bCode(self.prn),
		};
		vec![
			ChannelWrite::SetCodeMode(self.mode),
			code_write,
			ChannelWrite::SetCodeNco(nco::fcw_for(half_chip_hz, core_hz)),
			ChannelWrite::SetCarrierNco(nco::fcw_for(cfg.if_hz + self.doppler_hz, core_hz)),
		]
	}

}
