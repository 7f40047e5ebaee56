extern crate clap;
extern crate colored;
extern crate dirs;
extern crate env_logger;
extern crate num_complex;
extern crate rust_baseband;
extern crate serde;
extern crate serde_json;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::{Arg, App};
use colored::*;
use num_complex::Complex;
use serde::Serialize;
use rust_baseband::BasebandErr;
use rust_baseband::channel::correlator::IqFrame;
use rust_baseband::config::EngineConfig;
use rust_baseband::host::WriteOp;
use rust_baseband::io;
use rust_baseband::receiver::Receiver;
use rust_baseband::snapshot::Snapshot;
use rust_baseband::timebase::TIMEBASE_BITS;
use rust_baseband::utils::TickClock;

#[derive(Debug, Serialize)]
struct EpochRecord {
	channel: usize,
	prn: Option<u8>,
	absolute_ticks: u64,
	seconds: f64,
	iq: IqFrame,
	prompt: Complex<f64>,
	code_discriminator: f64,
	carrier_discriminator: f64,
}

#[derive(Debug, Serialize)]
struct SnapshotRecord {
	absolute_ticks: u64,
	snapshot: Snapshot,
}

fn default_config_path() -> Option<PathBuf> {
	dirs::config_dir().map(|d| d.join("rust_baseband").join("config.json"))
}

fn load_config(opt:Option<&str>) -> Result<EngineConfig, BasebandErr> {
	match opt {
		Some(path) => EngineConfig::from_file(Path::new(path)),
		None => match default_config_path() {
			Some(path) if path.exists() => EngineConfig::from_file(&path),
			_ => {
				eprintln!("{}", "No configuration given, using built-in defaults".yellow());
				Ok(EngineConfig::default())
			},
		},
	}
}

fn parse_or<T: std::str::FromStr>(opt:Option<&str>, default:T) -> Result<T, BasebandErr> {
	match opt {
		Some(s) => s.parse().map_err(|_| BasebandErr::InvalidConfig("Unable to parse a numeric argument")),
		None => Ok(default),
	}
}

fn run() -> Result<(), BasebandErr> {

	let matches = App::new("Baseband Core Simulator")
		.version("0.1.0")
		.author("John Stanford (johnwstanford@gmail.com)")
		.about("Runs 1-bit samples through the correlator core and prints per-epoch I/Q results as JSON lines")
		.arg(Arg::with_name("filename")
			.short("f").long("filename")
			.help("Packed 1-bit sample file, most significant bit first")
			.required(true).takes_value(true))
		.arg(Arg::with_name("config")
			.short("c").long("config")
			.help("JSON engine configuration; defaults to <config dir>/rust_baseband/config.json")
			.takes_value(true))
		.arg(Arg::with_name("poll_ticks")
			.long("poll_ticks")
			.help("Core ticks between service request reads, default 1000")
			.takes_value(true))
		.arg(Arg::with_name("snapshot_every")
			.long("snapshot_every")
			.help("Take a snapshot every N service request reads")
			.takes_value(true))
		.arg(Arg::with_name("capture")
			.long("capture")
			.help("Request one sample batch at start and write it to this file as big-endian words")
			.takes_value(true))
		.get_matches();

	env_logger::init();

	let cfg = load_config(matches.value_of("config"))?;
	let poll_ticks:usize = parse_or(matches.value_of("poll_ticks"), 1000)?;
	let snapshot_every:Option<usize> = match matches.value_of("snapshot_every") {
		Some(s) => Some(parse_or(Some(s), 0)?),
		None => None,
	};

	let fname = matches.value_of("filename").unwrap_or_default();
	eprintln!("Simulating {} channels over {} at {} [samples/sec], core at {} [Hz]",
		cfg.num_channels, fname, cfg.sample_rate_hz, cfg.core_rate_hz);

	let mut rx = Receiver::from_config(&cfg, io::file_source_bits(Path::new(fname))?)?;

	for plan in &cfg.channels {
		rx.program(plan, &cfg);
		eprintln!("{}", format!("Channel {}: PRN {} ({:?}) at {:.1} [Hz] doppler", plan.channel, plan.prn, plan.mode, plan.doppler_hz).green());
	}
	rx.write(WriteOp::SetChannelMask(cfg.all_free_mask()));
	rx.read_service_requests()?;

	if let Some(out_name) = matches.value_of("capture") {
		let words = rx.read_sample_batch()?;
		let mut out = BufWriter::new(File::create(out_name).map_err(|_| BasebandErr::Io("Unable to create capture file"))?);
		io::write_words(&mut out, &words)?;
		eprintln!("{}", format!("Wrote {} captured words to {}", words.len(), out_name).cyan());
	}

	let mut clock = TickClock::new(cfg.sample_rate_hz as f64);
	clock.set_origin(rx.absolute_ticks());

	let prn_of = |ch:usize| cfg.channels.iter().rev().find(|p| p.channel as usize == ch).map(|p| p.prn);
	let mut polls:usize = 0;

	while !rx.exhausted() {
		rx.idle(poll_ticks);
		let pending = rx.read_service_requests()?;
		polls += 1;

		for ch in (0..cfg.num_channels).filter(|ch| (pending >> ch) & 1 == 1) {
			let iq = rx.read_channel_iq(ch as u8)?;
			let record = EpochRecord{ channel: ch, prn: prn_of(ch), absolute_ticks: rx.absolute_ticks(),
				seconds: clock.seconds(rx.absolute_ticks(), TIMEBASE_BITS), iq,
				prompt: iq.prompt(), code_discriminator: iq.code_discriminator(), carrier_discriminator: iq.carrier_discriminator() };
			println!("{}", serde_json::to_string(&record).map_err(|_| BasebandErr::Io("Unable to serialize record"))?);
		}
		if (pending >> cfg.num_channels) & 1 == 1 {
			eprintln!("{}", "Host request pending".yellow());
		}

		if let Some(n) = snapshot_every {
			if n > 0 && polls % n == 0 {
				let record = SnapshotRecord{ absolute_ticks: rx.absolute_ticks(), snapshot: rx.read_snapshot()? };
				println!("{}", serde_json::to_string(&record).map_err(|_| BasebandErr::Io("Unable to serialize snapshot"))?);
			}
		}
	}

	eprintln!("{}", format!("Done after {} core ticks", rx.clocking().core_edges()).green().bold());
	Ok(())
}

fn main() {
	if let Err(e) = run() {
		eprintln!("{}", format!("Error: {:?}", e).red());
		std::process::exit(1);
	}
}
