use crate::BasebandErr;

// All conversions are MSB first: bits[0] is the most significant bit, which is also
// the first bit a host sees on the serial line.

pub fn to_u64(bits:&[bool]) -> Result<u64, BasebandErr> {
	if bits.len() <= 64 {
		Ok(bits.iter().fold(0u64, |acc, b| (acc << 1) | (*b as u64)))
	} else {
		Err(BasebandErr::InvalidFrame("bits.len() > 64 in bools_to_int::to_u64"))
	}
}

pub fn to_u16(bits:&[bool]) -> Result<u16, BasebandErr> {
	if bits.len() <= 16 { Ok(to_u64(bits)? as u16) }
	else { Err(BasebandErr::InvalidFrame("bits.len() > 16 in bools_to_int::to_u16")) }
}

/// Two's complement interpretation of exactly 16 bits.
pub fn to_i16(bits:&[bool]) -> Result<i16, BasebandErr> {
	if bits.len() == 16 { Ok(to_u16(bits)? as i16) }
	else { Err(BasebandErr::InvalidFrame("bits.len() != 16 in bools_to_int::to_i16")) }
}

/// The low `width` bits of `value`, MSB first.
pub fn from_u64(value:u64, width:usize) -> Vec<bool> {
	(0..width).rev().map(|i| i < 64 && (value >> i) & 1 == 1).collect()
}

pub fn append_u64(dest:&mut Vec<bool>, value:u64, width:usize) {
	dest.extend((0..width).rev().map(|i| i < 64 && (value >> i) & 1 == 1));
}

#[cfg(test)]
mod tests {

	use super::*;

	#[test]
	fn msb_first_ordering() {
		assert_eq!(from_u64(0b1011, 4), vec![true, false, true, true]);
		assert_eq!(to_u64(&[true, false, true, true]).unwrap(), 0b1011);
		assert_eq!(from_u64(0b1, 3), vec![false, false, true]);
	}

	#[test]
	fn signed_fields() {
		assert_eq!(to_i16(&from_u64(0xFFFF, 16)).unwrap(), -1);
		assert_eq!(to_i16(&from_u64(0x8000, 16)).unwrap(), i16::min_value());
		assert!(to_i16(&[true; 15]).is_err());
	}

	#[test]
	fn oversized_input_is_rejected() {
		assert!(to_u64(&[false; 65]).is_err());
		assert!(to_u16(&[false; 17]).is_err());
	}

}
