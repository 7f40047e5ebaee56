extern crate num_complex;

use self::num_complex::Complex;
use serde::{Serialize, Deserialize};

use crate::BasebandErr;
use crate::utils::bools_to_int;

pub const IQ_FIELDS:usize = 6;
pub const IQ_FIELD_BITS:usize = 16;
pub const IQ_FRAME_BITS:usize = IQ_FIELDS * IQ_FIELD_BITS;

/// Running early/prompt/late sums for the current epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accumulators {
	pub ie: i32, pub qe: i32,
	pub ip: i32, pub qp: i32,
	pub il: i32, pub ql: i32,
}

// Every input is a sign bit (true = -1), so a product is an XOR
fn product(sample:bool, code:bool, carrier:bool) -> i32 {
	if sample ^ code ^ carrier { -1 } else { 1 }
}

impl Accumulators {

	/// `epl` holds the early, prompt and late code bits, `carrier` the cosine and sine signs.
	pub fn accumulate(&self, sample:bool, epl:[bool; 3], carrier:(bool, bool)) -> Self {
		let (cos, sin) = carrier;
		Self {
			ie: self.ie.saturating_add(product(sample, epl[0], cos)), qe: self.qe.saturating_add(product(sample, epl[0], sin)),
			ip: self.ip.saturating_add(product(sample, epl[1], cos)), qp: self.qp.saturating_add(product(sample, epl[1], sin)),
			il: self.il.saturating_add(product(sample, epl[2], cos)), ql: self.ql.saturating_add(product(sample, epl[2], sin)),
		}
	}

	pub fn latch(&self) -> IqFrame {
		let sat = |x:i32| x.max(i16::min_value() as i32).min(i16::max_value() as i32) as i16;
		IqFrame{ ip: sat(self.ip), qp: sat(self.qp), ie: sat(self.ie), qe: sat(self.qe), il: sat(self.il), ql: sat(self.ql) }
	}

}

/// One epoch of correlation results as the host reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IqFrame {
	pub ip: i16, pub qp: i16,
	pub ie: i16, pub qe: i16,
	pub il: i16, pub ql: i16,
}

impl IqFrame {

	fn fields(&self) -> [i16; IQ_FIELDS] { [self.ip, self.qp, self.ie, self.qe, self.il, self.ql] }

	/// Serial order: IP, QP, IE, QE, IL, QL, each 16 bits MSB first.
	pub fn to_bits(&self) -> Vec<bool> {
		let mut bits = Vec::with_capacity(IQ_FRAME_BITS);
		for f in self.fields().iter() { bools_to_int::append_u64(&mut bits, (*f as u16) as u64, IQ_FIELD_BITS); }
		bits
	}

	pub fn from_bits(bits:&[bool]) -> Result<Self, BasebandErr> {
		if bits.len() != IQ_FRAME_BITS {
			return Err(BasebandErr::InvalidFrame("I/Q frame must be 96 bits"));
		}
		let mut f = [0i16; IQ_FIELDS];
		for (i, chunk) in bits.chunks(IQ_FIELD_BITS).enumerate() { f[i] = bools_to_int::to_i16(chunk)?; }
		Ok(Self{ ip: f[0], qp: f[1], ie: f[2], qe: f[3], il: f[4], ql: f[5] })
	}

	pub fn prompt(&self) -> Complex<f64> { Complex{ re: self.ip as f64, im: self.qp as f64 } }
	pub fn early(&self)  -> Complex<f64> { Complex{ re: self.ie as f64, im: self.qe as f64 } }
	pub fn late(&self)   -> Complex<f64> { Complex{ re: self.il as f64, im: self.ql as f64 } }

	/// Normalized early-minus-late envelope, positive when the local code is early
	pub fn code_discriminator(&self) -> f64 {
		let e = self.early().norm();
		let l = self.late().norm();
		if l + e == 0.0 { 0.0 } else { 0.5 * (l - e) / (l + e) }
	}

	/// Costas arctangent discriminator in radians
	pub fn carrier_discriminator(&self) -> f64 {
		let p = self.prompt();
		if p.re == 0.0 { 0.0 } else { (p.im / p.re).atan() }
	}

}
