use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::BasebandErr;

pub const BUFFER_SIZE:usize = 2048;

/// Packed single-bit samples from any reader, most significant bit of each byte first.
pub struct BufferedBitSource<S: Read> {
	src: S,
	idx: usize,
	buffer: [u8; BUFFER_SIZE],
	buffer_idx: usize,
	buffer_valid_len: usize,
	bit: u8,
}

impl<S: Read> BufferedBitSource<S> {

	pub fn new(src:S) -> Self {
		Self{ src, idx: 0, buffer: [0; BUFFER_SIZE], buffer_idx: 0, buffer_valid_len: 0, bit: 0 }
	}

	/// Samples handed out so far.
	pub fn samples_read(&self) -> usize { self.idx }

	fn buffer_samples(&mut self) -> Result<(), BasebandErr> {
		self.buffer_valid_len = self.src.read(&mut self.buffer).map_err(|_| BasebandErr::Io("Unable to read from file"))?;
		self.buffer_idx = 0;
		Ok(())
	}

}

impl<S: Read> Iterator for BufferedBitSource<S> {
	type Item = bool;

	fn next(&mut self) -> Option<bool> {
		if self.buffer_idx >= self.buffer_valid_len {
			// A read error or a zero-length read both end the stream
			match self.buffer_samples() {
				Ok(()) if self.buffer_valid_len > 0 => {},
				_ => return None,
			}
		}

		let ans = (self.buffer[self.buffer_idx] >> (7 - self.bit)) & 1 == 1;
		self.idx += 1;
		self.bit += 1;
		if self.bit == 8 {
			self.bit = 0;
			self.buffer_idx += 1;
		}
		Some(ans)
	}
}

pub fn file_source_bits(path:&Path) -> Result<BufferedBitSource<File>, BasebandErr> {
	let file = File::open(path).map_err(|_| BasebandErr::Io("Unable to open sample file"))?;
	Ok(BufferedBitSource::new(file))
}

/// Captured sample batches are stored as big-endian 16-bit words.
pub fn write_words<W: Write>(dest:&mut W, words:&[u16]) -> Result<(), BasebandErr> {
	for w in words {
		dest.write_u16::<BigEndian>(*w).map_err(|_| BasebandErr::Io("Unable to write sample words"))?;
	}
	Ok(())
}

pub fn read_words<R: Read>(src:&mut R) -> Vec<u16> {
	let mut ans:Vec<u16> = vec![];
	while let Ok(w) = src.read_u16::<BigEndian>() {
		ans.push(w);
	}
	ans
}

/// Unpacks words in the order the bulk path delivers them back into samples.
pub fn words_to_bits(words:&[u16]) -> Vec<bool> {
	words.iter().flat_map(|w| (0..16).rev().map(move |i| (w >> i) & 1 == 1)).collect()
}
