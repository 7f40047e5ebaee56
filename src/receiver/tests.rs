extern crate rand;

use std::iter;

use self::rand::{Rng, SeedableRng};
use self::rand::rngs::StdRng;

use super::*;
use crate::channel::ChannelWrite;
use crate::code::ca;
use crate::timebase::elapsed;

struct Coin { rng: StdRng }

impl Metastability for Coin {
	fn settles_to_new(&mut self) -> bool { self.rng.gen() }
}

fn config(num_channels:usize, sample_rate_hz:u64, core_rate_hz:u64) -> EngineConfig {
	EngineConfig{ num_channels, e1b_channels: 0, sample_rate_hz, core_rate_hz, capture_words: 4, ..Default::default() }
}

fn silent(cfg:&EngineConfig) -> Receiver<iter::Repeat<bool>> {
	Receiver::new(cfg, None, iter::repeat(false)).unwrap()
}

#[test]
fn equal_rates_alternate_and_never_coincide() {
	let mut c = Clocking::new(1000, 1000);
	let edges:Vec<Edge> = (0..8).map(|_| c.next_edge()).collect();
	assert_eq!(edges[0], Edge::Core{ coincident: false });
	for pair in edges[1..7].chunks(2) {
		assert_eq!(pair, &[Edge::Sample{ coincident: false }, Edge::Core{ coincident: false }]);
	}
}

#[test]
fn faster_sample_clock_gets_more_edges() {
	let mut c = Clocking::new(4000, 1000);
	let mut samples_per_core = vec![];
	let mut count = 0;
	while samples_per_core.len() < 10 {
		match c.next_edge() {
			Edge::Sample{ .. } => count += 1,
			Edge::Core{ .. } => { samples_per_core.push(count); count = 0; },
		}
	}
	assert_eq!(samples_per_core[0], 0);
	assert!(samples_per_core[1..].iter().all(|n| *n == 4));
}

#[test]
fn close_rates_drift_through_the_aperture() {
	let mut c = Clocking::new(1001, 1000);
	let edges:Vec<Edge> = (0..200_000).map(|_| c.next_edge()).collect();
	let core = edges.iter().filter(|e| **e == Edge::Core{ coincident: true }).count();
	let sample = edges.iter().filter(|e| **e == Edge::Sample{ coincident: true }).count();
	assert!(core > 0 && core < 10_000);
	assert!(sample > 0 && sample < 10_000);
}

#[test]
fn snapshot_transaction_returns_the_load_instant() {
	let cfg = config(3, 16_368_000, 16_368_000);
	let mut rx = silent(&cfg);
	rx.write(WriteOp::SetChannel(1));
	rx.write(WriteOp::Channel(ChannelWrite::SetCodeNco(0x8000_0000)));
	rx.idle(300);

	let expected = rx.engine().snapshot_now();
	let snap = rx.read_snapshot().unwrap();
	assert_eq!(snap, expected);
	assert!(snap.chip(1).unwrap() > 0);
	assert_eq!(snap.chip(0), Some(0));
}

#[test]
fn synchronized_time_trails_the_counter_closely() {
	for policy in [SyncPolicy::Handshake, SyncPolicy::PerBit].iter() {
		let cfg = EngineConfig{ time_sync: *policy, power_on_ticks: 1_000_000, ..config(2, 16_368_000, 16_368_000) };
		let mut rx = silent(&cfg);
		rx.idle(100);
		let snap = rx.read_snapshot().unwrap();
		let absolute = rx.absolute_ticks();
		assert!(snap.ticks > 1_000_000);
		// The frame took 48 + 2 + 32 core ticks to drain after the load
		let lag = elapsed(snap.ticks, absolute);
		assert!(lag >= 82 && lag < 100, "{:?} lag {}", policy, lag);
	}
}

#[test]
fn handshake_survives_a_random_resolver() {
	let cfg = config(1, 1001, 1000);
	let mut rx = silent(&cfg).with_resolver(Box::new(Coin{ rng: StdRng::seed_from_u64(3) }));
	let mut last = rx.engine().synced_ticks();
	for _ in 0..50_000 {
		rx.step(HostCmd::Idle);
		let v = rx.engine().synced_ticks();
		assert!(elapsed(last, v) < 16, "went from {} to {}", last, v);
		assert!(elapsed(v, rx.absolute_ticks()) < 16);
		last = v;
	}
	assert!(last > 40_000);
}

#[test]
fn sample_batch_reads_back_and_raises_the_host_request() {
	let cfg = config(2, 16_368_000, 16_368_000);
	let mut rx = Receiver::new(&cfg, None, [true, false].iter().cloned().cycle()).unwrap();
	rx.write(WriteOp::SetChannelMask(0b100));

	let words = rx.read_sample_batch().unwrap();
	assert_eq!(words.len(), 4);
	assert!(words[0] == 0xAAAA || words[0] == 0x5555);
	assert!(words.iter().all(|w| *w == words[0]));

	assert_eq!(rx.read_service_requests().unwrap(), 0b100);
	assert_eq!(rx.read_service_requests().unwrap(), 0);
}

#[test]
fn sample_batch_survives_a_random_resolver() {
	let cfg = config(1, 1001, 1000);
	let mut rx = Receiver::new(&cfg, None, iter::repeat(true)).unwrap()
		.with_resolver(Box::new(Coin{ rng: StdRng::seed_from_u64(11) }));
	rx.write(WriteOp::SetChannelMask(0b10));
	for _ in 0..3 {
		let words = rx.read_sample_batch().unwrap();
		assert_eq!(words, vec![0xFFFF; 4]);
		assert_eq!(rx.read_service_requests().unwrap(), 0b10);
	}
}

#[test]
fn sample_batch_with_no_buffer_is_an_error() {
	let cfg = EngineConfig{ capture_words: 0, ..config(1, 1000, 1000) };
	assert!(silent(&cfg).read_sample_batch().is_err());
}

#[test]
fn exhausted_source_keeps_the_clock_running() {
	let cfg = config(1, 1000, 1000);
	let mut rx = Receiver::new(&cfg, None, vec![true; 10].into_iter()).unwrap();
	rx.idle(20);
	assert!(rx.exhausted());
	assert!(rx.absolute_ticks() >= 19);
}

#[test]
fn channel_iq_transaction_matches_the_latched_frame() {
	let cfg = EngineConfig{ if_hz: 0.0, ..config(2, 4_092_000, 4_092_000) };
	let code = ca::prn_code(5).unwrap();
	// Four samples per chip, carrier at zero frequency
	let signal = (0..).map(move |i:usize| code[(i / 4) % ca::CA_CODE_LENGTH]);
	let mut rx = Receiver::new(&cfg, None, signal).unwrap();
	rx.program(&ChannelPlan{ channel: 1, prn: 5, mode: crate::code::CodeMode::Ca, doppler_hz: 0.0 }, &cfg);
	rx.idle(2 * 4 * ca::CA_CODE_LENGTH + 100);

	let expected = rx.engine().channel(1).unwrap().last_iq();
	let frame = rx.read_channel_iq(1).unwrap();
	assert_eq!(frame, expected);
	assert_eq!(rx.engine().session().channel(), 1);
	assert_eq!(rx.read_channel_iq(1).unwrap(), expected);
}
