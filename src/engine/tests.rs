extern crate rand;

use self::rand::{Rng, SeedableRng};
use self::rand::rngs::StdRng;

use super::*;
use crate::channel::ChannelWrite;
use crate::channel::correlator::{Accumulators, IQ_FRAME_BITS};
use crate::code::ca;
use crate::host::{READ_CHANNEL_IQ, READ_SERVICE_REQUESTS, READ_SNAPSHOT};

// Four ticks per chip: the code NCO overflows every second tick
const HALF_CHIP_FCW:u32 = 0x8000_0000;
const TICKS_PER_CA_PERIOD:usize = 4 * ca::CA_CODE_LENGTH;

fn engine(num_channels:usize) -> Engine {
	let cfg = EngineConfig{ num_channels, e1b_channels: 0, ..Default::default() };
	Engine::new(&cfg, None).unwrap()
}

fn write(e:&mut Engine, op:WriteOp) -> TickOutput {
	e.tick(&TickInputs::with_cmd(HostCmd::Write(op)))
}

fn idle(e:&mut Engine, ticks:usize) {
	for _ in 0..ticks { e.tick(&TickInputs::idle()); }
}

/// Every channel tracking a C/A code at four ticks per chip, each with its own start offset.
fn running_engine(num_channels:usize) -> Engine {
	let mut e = engine(num_channels);
	for i in 0..num_channels {
		write(&mut e, WriteOp::SetChannel(i as u8));
		write(&mut e, WriteOp::Channel(ChannelWrite::SetCaCode(ca::g2_init(i + 1).unwrap())));
		write(&mut e, WriteOp::Channel(ChannelWrite::SetCodeNco(HALF_CHIP_FCW)));
		write(&mut e, WriteOp::Channel(ChannelWrite::SetCarrierNco(0x0100_0000 * (i as u32 + 1))));
	}
	idle(&mut e, 500);
	e
}

fn drain(e:&mut Engine, bits:usize) -> Vec<bool> {
	(0..bits).map(|_| { let b = e.serial_out(); e.tick(&TickInputs::with_cmd(HostCmd::Continue)); b }).collect()
}

#[test]
fn sampler_reset_spares_the_reserved_channel() {
	let mut e = running_engine(4);
	write(&mut e, WriteOp::SetChannelMask(0b1_1011));

	let mut reference = e.clone();
	write(&mut e, WriteOp::SamplerReset);
	reference.tick(&TickInputs::idle());

	for i in [0usize, 1, 3].iter() {
		let c = e.channel(*i).unwrap();
		assert_eq!(c.code_phase(), 0, "channel {}", i);
		assert_eq!(c.replica(), 0);
		assert_eq!(c.carrier_nco().phase(), 0);
		// Registers survive
		assert_eq!(c.code_nco().fcw(), HALF_CHIP_FCW);
		assert_eq!(c.ca().g2_init(), ca::g2_init(i + 1).unwrap());
	}
	assert!(reference.channel(2).unwrap().code_phase() > 0);
	assert_eq!(e.channel(2), reference.channel(2));
}

#[test]
fn sampler_reset_follows_any_mask() {
	let mut rng = StdRng::seed_from_u64(0x5eed);
	let base = running_engine(8);
	for _ in 0..20 {
		let mask:u64 = rng.gen::<u64>() & 0x1FF;
		let mut e = base.clone();
		write(&mut e, WriteOp::SetChannelMask(mask));
		let mut reference = e.clone();
		write(&mut e, WriteOp::SamplerReset);
		reference.tick(&TickInputs::idle());

		for i in 0..8 {
			let c = e.channel(i).unwrap();
			if (mask >> i) & 1 == 1 {
				assert_eq!(c.replica(), 0);
				assert_eq!(c.accumulators(), Accumulators::default());
			} else {
				assert_eq!(Some(c), reference.channel(i));
			}
		}
	}
}

#[test]
fn power_on_mask_reserves_everything() {
	let mut e = running_engine(3);
	let before:Vec<u16> = e.channels().iter().map(|c| c.code_phase()).collect();
	write(&mut e, WriteOp::SamplerReset);
	assert_eq!(e.mask(), 0);
	assert!(e.channels().iter().zip(before.iter()).all(|(c, b)| c.code_phase() >= *b));
	assert!(e.channels().iter().all(|c| c.code_phase() > 0));
}

#[test]
fn pause_nine_resumes_on_the_tenth_tick() {
	let mut e = running_engine(2);
	assert!(!write(&mut e, WriteOp::SetPauseCount(9)).resume);
	let held = e.channel(0).unwrap().replica();

	let mut pulses = vec![];
	for t in 1..=40 {
		if e.tick(&TickInputs::idle()).resume { pulses.push(t); }
		if t < 10 { assert!(!e.running()); }
		if t <= 10 {
			assert_eq!(e.channel(0).unwrap().replica(), held, "code moved on tick {}", t);
		}
	}
	assert_eq!(pulses, vec![10]);
	assert!(e.running());
	assert_ne!(e.channel(0).unwrap().replica(), held);
}

#[test]
fn set_channel_takes_five_bits_and_writes_before_it_hit_channel_zero() {
	let mut e = engine(4);
	write(&mut e, WriteOp::Channel(ChannelWrite::SetCarrierNco(77)));
	assert_eq!(e.channel(0).unwrap().carrier_nco().fcw(), 77);

	write(&mut e, WriteOp::SetChannel(0x22));
	assert_eq!(e.session().channel(), 2);
	write(&mut e, WriteOp::Channel(ChannelWrite::SetCarrierNco(99)));
	assert_eq!(e.channel(2).unwrap().carrier_nco().fcw(), 99);

	// Out of range: the write lands nowhere and the I/Q line reads zero
	write(&mut e, WriteOp::SetChannel(9));
	let before:Vec<Channel> = e.channels().to_vec();
	write(&mut e, WriteOp::Channel(ChannelWrite::SetCarrierNco(1234)));
	assert!(e.channels().iter().zip(before.iter()).all(|(a, b)| a.carrier_nco().fcw() == b.carrier_nco().fcw()));
	e.tick(&TickInputs::with_cmd(READ_CHANNEL_IQ));
	assert!(drain(&mut e, 16).iter().all(|b| !b));
}

#[test]
fn service_requests_report_free_epochs_host_bit_first() {
	let mut e = running_engine(3);
	write(&mut e, WriteOp::SetChannelMask(0b0101));
	// Clear whatever was noted before the mask was set
	e.tick(&TickInputs::with_cmd(READ_SERVICE_REQUESTS));
	idle(&mut e, TICKS_PER_CA_PERIOD + 10);

	e.tick(&TickInputs::with_cmd(READ_SERVICE_REQUESTS));
	// Every channel wrapped once; channel 1 and the host bit are masked out
	assert_eq!(drain(&mut e, 4), vec![false, true, false, true]);
	// Rotation brings the frame back around
	assert_eq!(drain(&mut e, 4), vec![false, true, false, true]);

	// Nothing happened since the last load
	e.tick(&TickInputs::with_cmd(READ_SERVICE_REQUESTS));
	assert_eq!(drain(&mut e, 4), vec![false; 4]);
}

#[test]
fn service_request_noted_while_a_frame_is_pending_is_kept() {
	let mut e = running_engine(2);
	write(&mut e, WriteOp::SetChannelMask(0b111));
	e.tick(&TickInputs::with_cmd(READ_SERVICE_REQUESTS));

	// Wait for channel 0's next epoch without draining the frame
	let mut seen = false;
	for _ in 0..TICKS_PER_CA_PERIOD + 10 {
		let out = e.tick(&TickInputs::idle());
		seen |= out.epochs & 1 == 1;
	}
	assert!(seen);
	assert_eq!(e.noted() & 0b11, 0b11);

	e.tick(&TickInputs::with_cmd(READ_SERVICE_REQUESTS));
	assert_eq!(drain(&mut e, 3), vec![false, true, true]);
}

#[test]
fn snapshot_drains_the_state_at_the_load_tick() {
	let mut e = running_engine(3);
	write(&mut e, WriteOp::SetChannelMask(0b1111));
	idle(&mut e, 1000);

	let expected = e.snapshot_now();
	e.tick(&TickInputs::with_cmd(READ_SNAPSHOT));
	let bits = drain(&mut e, Snapshot::frame_bits(3));
	assert_eq!(Snapshot::from_bits(&bits, 3).unwrap(), expected);

	// The channels kept moving while the frame drained
	assert_ne!(e.snapshot_now().replicas, expected.replicas);

	// A new load starts over at the most significant bit
	e.tick(&TickInputs::with_cmd(READ_SNAPSHOT));
	drain(&mut e, 5);
	let restarted = e.snapshot_now();
	e.tick(&TickInputs::with_cmd(READ_SNAPSHOT));
	let bits = drain(&mut e, Snapshot::frame_bits(3));
	assert_eq!(Snapshot::from_bits(&bits, 3).unwrap(), restarted);
}

#[test]
fn snapshot_pending_bits_cover_noted_epochs() {
	let mut e = running_engine(2);
	write(&mut e, WriteOp::SetChannelMask(0b111));
	e.tick(&TickInputs::with_cmd(READ_SERVICE_REQUESTS));
	idle(&mut e, TICKS_PER_CA_PERIOD + 10);

	e.tick(&TickInputs::with_cmd(READ_SNAPSHOT));
	let snap = Snapshot::from_bits(&drain(&mut e, Snapshot::frame_bits(2)), 2).unwrap();
	assert!(snap.is_pending(0));
	assert!(snap.is_pending(1));
}

#[test]
fn channel_iq_reads_the_latched_frame() {
	let mut e = running_engine(2);
	write(&mut e, WriteOp::SetChannel(1));
	idle(&mut e, TICKS_PER_CA_PERIOD);

	let expected = e.channel(1).unwrap().last_iq();
	e.tick(&TickInputs::with_cmd(READ_CHANNEL_IQ));
	let bits = drain(&mut e, IQ_FRAME_BITS);
	// Nothing in this window reaches the next epoch
	assert_eq!(e.channel(1).unwrap().last_iq(), expected);
	assert_eq!(bits, expected.to_bits());
}

#[test]
fn capture_done_raises_a_one_tick_host_request() {
	let mut e = engine(2);
	write(&mut e, WriteOp::SetChannelMask(0b100));
	write(&mut e, WriteOp::RequestSampleBatch);
	assert!(e.batch_req());

	let mut raised = vec![];
	for t in 0..10 {
		e.tick(&TickInputs{ capture_done: true, ..TickInputs::idle() });
		if e.host_request() { raised.push(t); }
	}
	assert_eq!(raised.len(), 1);

	e.tick(&TickInputs::with_cmd(READ_SERVICE_REQUESTS));
	assert_eq!(drain(&mut e, 3), vec![true, false, false]);
}

#[test]
fn bulk_address_restarts_with_each_batch() {
	let mut e = engine(1);
	for _ in 0..5 { e.tick(&TickInputs::with_cmd(HostCmd::BulkNext)); }
	assert_eq!(e.bulk_addr(), 5);
	write(&mut e, WriteOp::RequestSampleBatch);
	assert_eq!(e.bulk_addr(), 0);
	assert!(e.batch_req());
	write(&mut e, WriteOp::RequestSampleBatch);
	assert!(!e.batch_req());
}
