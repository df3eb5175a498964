//! Byte cursor over a script image.
//!
//! Operand reads are sequential; the walker owns one reader per pass. Peek
//! helpers save and restore the cursor for the lookahead the display-text
//! handler needs.

use crate::file::{FileType, SgsFileError};

/// Sequential reader with little-endian primitives and peeking.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
	data: &'a [u8],
	pos: usize,
}

impl<'a> ByteReader<'a> {
	/// Creates a reader over the full buffer.
	pub fn new(data: &'a [u8]) -> Self {
		Self {
			data,
			pos: 0,
		}
	}

	/// Current byte offset.
	pub fn position(&self) -> usize {
		self.pos
	}

	/// Bytes left to read.
	pub fn remaining(&self) -> usize {
		self.data.len() - self.pos
	}

	/// True once the cursor reaches the end of the buffer.
	pub fn is_eof(&self) -> bool {
		self.pos >= self.data.len()
	}

	fn truncated(&self, wanted: usize) -> SgsFileError {
		SgsFileError::insufficient_data(FileType::Script, self.pos + wanted, self.data.len())
	}

	/// Reads one byte.
	pub fn read_u8(&mut self) -> Result<u8, SgsFileError> {
		let Some(&byte) = self.data.get(self.pos) else {
			return Err(self.truncated(1));
		};
		self.pos += 1;
		Ok(byte)
	}

	/// Reads a little-endian u16.
	pub fn read_u16_le(&mut self) -> Result<u16, SgsFileError> {
		let Some(bytes) = self.data.get(self.pos..self.pos + 2) else {
			return Err(self.truncated(2));
		};
		self.pos += 2;
		Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
	}

	/// Reads a little-endian s16.
	pub fn read_i16_le(&mut self) -> Result<i16, SgsFileError> {
		Ok(self.read_u16_le()? as i16)
	}

	/// Reads a little-endian u32.
	pub fn read_u32_le(&mut self) -> Result<u32, SgsFileError> {
		let Some(bytes) = self.data.get(self.pos..self.pos + 4) else {
			return Err(self.truncated(4));
		};
		self.pos += 4;
		Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
	}

	/// Returns the next byte without advancing.
	pub fn peek_u8(&self) -> Option<u8> {
		self.data.get(self.pos).copied()
	}

	/// Returns the next little-endian u16 without advancing.
	pub fn peek_u16_le(&self) -> Option<u16> {
		let bytes = self.data.get(self.pos..self.pos + 2)?;
		Some(u16::from_le_bytes([bytes[0], bytes[1]]))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_sequential_reads() {
		let data = [0x01, 0x34, 0x12, 0xFF, 0xFF, 0x78, 0x56, 0x34, 0x12];
		let mut reader = ByteReader::new(&data);

		assert_eq!(reader.read_u8().unwrap(), 0x01);
		assert_eq!(reader.read_u16_le().unwrap(), 0x1234);
		assert_eq!(reader.read_i16_le().unwrap(), -1);
		assert_eq!(reader.read_u32_le().unwrap(), 0x1234_5678);
		assert!(reader.is_eof());
	}

	#[test]
	fn test_peek_does_not_advance() {
		let data = [0xAB, 0xCD];
		let reader = ByteReader::new(&data);

		assert_eq!(reader.peek_u8(), Some(0xAB));
		assert_eq!(reader.peek_u16_le(), Some(0xCDAB));
		assert_eq!(reader.position(), 0);
	}

	#[test]
	fn test_truncation_errors() {
		let mut reader = ByteReader::new(&[0x01]);
		assert!(reader.read_u16_le().unwrap_err().is_insufficient_data());
		// A failed read leaves the cursor in place
		assert_eq!(reader.read_u8().unwrap(), 0x01);
		assert!(reader.read_u8().is_err());
		assert_eq!(reader.peek_u8(), None);
	}
}
