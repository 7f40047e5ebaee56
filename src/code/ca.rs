pub const CA_CODE_LENGTH:usize = 1023;
pub const CA_CHIP_RATE_HZ:f64 = 1.023e6;

// G2 delays in chips for PRN 1 through 32, IS-GPS-200 Table 3-Ia
pub const G2_DELAY:[usize; 32] = [
	  5,   6,   7,   8,  17,  18, 139, 140, 141, 251, 252, 254, 255, 256, 257, 258,
	469, 470, 471, 472, 473, 474, 509, 512, 513, 514, 515, 516, 859, 860, 861, 862 ];

fn g1_shift(r:[bool; 10]) -> [bool; 10] {
	let feedback = r[2] ^ r[9];
	[feedback, r[0], r[1], r[2], r[3], r[4], r[5], r[6], r[7], r[8]]
}

fn g2_shift(r:[bool; 10]) -> [bool; 10] {
	let feedback = r[1] ^ r[2] ^ r[5] ^ r[7] ^ r[8] ^ r[9];
	[feedback, r[0], r[1], r[2], r[3], r[4], r[5], r[6], r[7], r[8]]
}

// Stage 1 is bit 9 of the register word, stage 10 is bit 0
fn to_stages(word:u16) -> [bool; 10] {
	let mut r = [false; 10];
	for (i, stage) in r.iter_mut().enumerate() { *stage = (word >> (9 - i)) & 1 == 1; }
	r
}

fn to_word(r:[bool; 10]) -> u16 {
	r.iter().fold(0u16, |acc, b| (acc << 1) | (*b as u16))
}

/// G2 register contents that make the generator emit the code of `prn` from chip 0.
pub fn g2_init(prn:usize) -> Option<u16> {
	if prn >= 1 && prn <= 32 {
		let mut r = [true; 10];
		for _ in 0..((CA_CODE_LENGTH - G2_DELAY[prn-1]) % CA_CODE_LENGTH) { r = g2_shift(r); }
		Some(to_word(r))
	} else { None }
}

/// One full period of the code for `prn`, true meaning a logic one chip.
pub fn prn_code(prn:usize) -> Option<Vec<bool>> {
	g2_init(prn).map(|init| {
		let mut gen = CaGenerator::new(init);
		(0..CA_CODE_LENGTH).map(|_| {
			let bit = gen.code_bit();
			gen = gen.advanced().0;
			bit
		}).collect()
	})
}

/// Chip-at-a-time C/A generator whose G2 start state is written by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaGenerator {
	g1: [bool; 10],
	g2: [bool; 10],
	g2_init: u16,
	chip: u16,
}

impl CaGenerator {

	pub fn new(g2_init:u16) -> Self {
		let g2_init = g2_init & 0x3FF;
		Self{ g1: [true; 10], g2: to_stages(g2_init), g2_init, chip: 0 }
	}

	pub fn chip(&self) -> u16 { self.chip }
	pub fn g2_init(&self) -> u16 { self.g2_init }
	pub fn code_bit(&self) -> bool { self.g1[9] ^ self.g2[9] }

	/// The generator one chip later and whether that step wrapped back to chip 0.
	pub fn advanced(&self) -> (Self, bool) {
		if (self.chip as usize) + 1 >= CA_CODE_LENGTH {
			(Self::new(self.g2_init), true)
		} else {
			(Self{ g1: g1_shift(self.g1), g2: g2_shift(self.g2), chip: self.chip + 1, ..*self }, false)
		}
	}

	pub fn reset(&self) -> Self { Self::new(self.g2_init) }

}
