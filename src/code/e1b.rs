use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use regex::Regex;

use crate::BasebandErr;

pub const E1B_CODE_LENGTH:usize = 4092;
pub const E1B_HEX_DIGITS:usize = E1B_CODE_LENGTH / 4;
pub const E1B_MAX_PRN:u8 = 50;

/// Shared code memory for every E1B-capable channel, keyed by PRN.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct E1bCodeBook {
	codes: BTreeMap<u8, Vec<bool>>,
}

impl E1bCodeBook {

	pub fn new() -> Self { Self::default() }

	pub fn len(&self) -> usize { self.codes.len() }
	pub fn is_empty(&self) -> bool { self.codes.is_empty() }
	pub fn prns(&self) -> Vec<u8> { self.codes.keys().cloned().collect() }

	pub fn insert(&mut self, prn:u8, code:Vec<bool>) -> Result<(), BasebandErr> {
		if prn < 1 || prn > E1B_MAX_PRN {
			Err(BasebandErr::InvalidCodeBook("PRN outside 1..=50"))
		} else if code.len() != E1B_CODE_LENGTH {
			Err(BasebandErr::InvalidCodeBook("E1B code must be 4092 chips long"))
		} else {
			self.codes.insert(prn, code);
			Ok(())
		}
	}

	pub fn chip(&self, prn:u8, idx:usize) -> Option<bool> {
		self.codes.get(&prn).and_then(|c| c.get(idx).cloned())
	}

	/// Parses one code per line as `<prn> <1023 hex digits>`, optionally separated by a comma or
	/// colon.  Blank lines and lines starting with `#` are skipped.
	pub fn parse(text:&str) -> Result<Self, BasebandErr> {
		let line_re = Regex::new(r"^\s*(\d{1,2})\s*[,:]?\s*([0-9A-Fa-f]+)\s*$").map_err(|_| BasebandErr::InvalidCodeBook("Bad line pattern"))?;
		let mut book = Self::new();

		for line in text.lines() {
			let trimmed = line.trim();
			if trimmed.is_empty() || trimmed.starts_with('#') { continue; }

			let caps = line_re.captures(trimmed).ok_or(BasebandErr::InvalidCodeBook("Line is not '<prn> <hex>'"))?;
			let prn:u8 = caps[1].parse().map_err(|_| BasebandErr::InvalidCodeBook("Unable to parse PRN"))?;
			if book.codes.contains_key(&prn) {
				return Err(BasebandErr::InvalidCodeBook("PRN appears twice"));
			}
			book.insert(prn, hex_to_bits(&caps[2])?)?;
		}

		debug!("Loaded {} E1B codes", book.len());
		Ok(book)
	}

	pub fn from_file(path:&Path) -> Result<Self, BasebandErr> {
		let text = fs::read_to_string(path).map_err(|_| BasebandErr::Io("Unable to read E1B code book"))?;
		Self::parse(&text)
	}

}

/// Expands an ICD hex string, most significant bit of the first digit being chip 0.
pub fn hex_to_bits(hex:&str) -> Result<Vec<bool>, BasebandErr> {
	if hex.len() != E1B_HEX_DIGITS {
		return Err(BasebandErr::InvalidCodeBook("E1B code must be 1023 hex digits"));
	}

	let mut bits:Vec<bool> = Vec::with_capacity(E1B_CODE_LENGTH);
	for c in hex.chars() {
		let nibble = c.to_digit(16).ok_or(BasebandErr::InvalidCodeBook("Non-hex digit in code"))?;
		for shift in (0..4).rev() { bits.push((nibble >> shift) & 1 == 1); }
	}
	Ok(bits)
}

/// Chip counter into the code memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct E1bGenerator {
	prn: u8,
	chip: u16,
}

impl E1bGenerator {

	pub fn new(prn:u8) -> Self { Self{ prn, chip: 0 } }

	pub fn prn(&self) -> u8 { self.prn }
	pub fn chip(&self) -> u16 { self.chip }

	/// Selecting a different code keeps the chip count.
	pub fn with_prn(&self, prn:u8) -> Self { Self{ prn, ..*self } }

	/// None when there is no code memory entry for the selected PRN.
	pub fn code_bit(&self, book:Option<&E1bCodeBook>) -> Option<bool> {
		book.and_then(|b| b.chip(self.prn, self.chip as usize))
	}

	pub fn advanced(&self) -> (Self, bool) {
		if (self.chip as usize) + 1 >= E1B_CODE_LENGTH {
			(Self{ chip: 0, ..*self }, true)
		} else {
			(Self{ chip: self.chip + 1, ..*self }, false)
		}
	}

	pub fn reset(&self) -> Self { Self{ chip: 0, ..*self } }

}
