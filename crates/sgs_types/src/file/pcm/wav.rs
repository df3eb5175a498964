//! WAV header recognition and emission.
//!
//! A buffer is treated as WAV when it is at least 44 bytes long and carries
//! the four chunk tags at their canonical positions: `RIFF`/`RIFX` at 0,
//! `WAVE` at 8, `fmt ` at 12, `data` at 36. `RIFX` files store their header
//! fields big-endian and their 16-bit sample data byte-swapped.

use crate::file::{FileType, SgsFileError};

/// Size of the canonical header
pub const HEADER_SIZE: usize = 44;

/// Byte order of a recognized WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
	/// `RIFF`: little-endian fields and samples
	Little,
	/// `RIFX`: big-endian fields, byte-swapped 16-bit samples
	Big,
}

/// Fields parsed out of a WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
	/// Channel count as stored (may be zero)
	pub channels: u16,
	/// Sample rate in Hz, masked to 31 bits
	pub sample_rate: u32,
	/// Bits per sample as stored
	pub bits_per_sample: u16,
	/// Size of the data chunk, masked to 31 bits
	pub data_size: u32,
	/// Header byte order
	pub endian: Endian,
}

/// Detects a WAV header, returning its byte order.
pub fn detect(data: &[u8]) -> Option<Endian> {
	if data.len() < HEADER_SIZE {
		return None;
	}

	let endian = match &data[0..4] {
		b"RIFF" => Endian::Little,
		b"RIFX" => Endian::Big,
		_ => return None,
	};

	if &data[8..12] == b"WAVE" && &data[12..16] == b"fmt " && &data[36..40] == b"data" {
		Some(endian)
	} else {
		None
	}
}

/// Parses the fixed-offset header fields.
pub fn parse(data: &[u8]) -> Result<Header, SgsFileError> {
	let Some(endian) = detect(data) else {
		return Err(SgsFileError::invalid_magic(
			FileType::Pcm,
			b"RIFF",
			&data[..data.len().min(4)],
		));
	};

	let read_u16 = |offset: usize| -> u16 {
		let bytes = [data[offset], data[offset + 1]];
		match endian {
			Endian::Little => u16::from_le_bytes(bytes),
			Endian::Big => u16::from_be_bytes(bytes),
		}
	};
	let read_u32 = |offset: usize| -> u32 {
		let bytes = [data[offset], data[offset + 1], data[offset + 2], data[offset + 3]];
		match endian {
			Endian::Little => u32::from_le_bytes(bytes),
			Endian::Big => u32::from_be_bytes(bytes),
		}
	};

	Ok(Header {
		channels: read_u16(22),
		sample_rate: read_u32(24) & 0x7FFF_FFFF,
		bits_per_sample: read_u16(34),
		data_size: read_u32(40) & 0x7FFF_FFFF,
		endian,
	})
}

/// Writes the canonical 44-byte header for the given output parameters.
pub fn write_header(channels: u16, sample_rate: u32, bits_per_sample: u16, data_size: u32) -> [u8; HEADER_SIZE] {
	let byte_rate = sample_rate * u32::from(channels) * u32::from(bits_per_sample) / 8;
	let block_align = channels * bits_per_sample / 8;

	let mut header = [0u8; HEADER_SIZE];
	header[0..4].copy_from_slice(b"RIFF");
	header[4..8].copy_from_slice(&(data_size + HEADER_SIZE as u32 - 8).to_le_bytes());
	header[8..12].copy_from_slice(b"WAVE");
	header[12..16].copy_from_slice(b"fmt ");
	header[16..20].copy_from_slice(&16u32.to_le_bytes());
	header[20..22].copy_from_slice(&1u16.to_le_bytes());
	header[22..24].copy_from_slice(&channels.to_le_bytes());
	header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
	header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
	header[32..34].copy_from_slice(&block_align.to_le_bytes());
	header[34..36].copy_from_slice(&bits_per_sample.to_le_bytes());
	header[36..40].copy_from_slice(b"data");
	header[40..44].copy_from_slice(&data_size.to_le_bytes());
	header
}

/// Patches the RIFF and data chunk sizes in a finished file whose emitted
/// size differs from the precomputed one.
pub fn patch_sizes(file: &mut [u8]) {
	let total = file.len() as u32;
	file[4..8].copy_from_slice(&(total - 8).to_le_bytes());
	file[40..44].copy_from_slice(&(total - HEADER_SIZE as u32).to_le_bytes());
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_detect_riff_and_rifx() {
		let header = write_header(1, 22050, 8, 100);
		assert_eq!(detect(&header), Some(Endian::Little));

		let mut rifx = header;
		rifx[0..4].copy_from_slice(b"RIFX");
		assert_eq!(detect(&rifx), Some(Endian::Big));

		assert_eq!(detect(&header[..40]), None);
		assert_eq!(detect(b"not a wav file, but long enough to check tags..."), None);
	}

	#[test]
	fn test_parse_masks_rate_and_size() {
		let mut header = write_header(2, 44100, 16, 0);
		header[24..28].copy_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
		header[40..44].copy_from_slice(&0x8000_0010u32.to_le_bytes());

		let parsed = parse(&header).unwrap();
		assert_eq!(parsed.sample_rate, 0x7FFF_FFFF);
		assert_eq!(parsed.data_size, 0x10);
		assert_eq!(parsed.channels, 2);
		assert_eq!(parsed.bits_per_sample, 16);
	}

	#[test]
	fn test_parse_big_endian_fields() {
		let mut header = write_header(1, 22050, 16, 8);
		header[0..4].copy_from_slice(b"RIFX");
		header[22..24].copy_from_slice(&1u16.to_be_bytes());
		header[24..28].copy_from_slice(&22050u32.to_be_bytes());
		header[34..36].copy_from_slice(&16u16.to_be_bytes());
		header[40..44].copy_from_slice(&8u32.to_be_bytes());

		let parsed = parse(&header).unwrap();
		assert_eq!(parsed.endian, Endian::Big);
		assert_eq!(parsed.channels, 1);
		assert_eq!(parsed.sample_rate, 22050);
		assert_eq!(parsed.data_size, 8);
	}

	#[test]
	fn test_patch_sizes() {
		let mut file = write_header(1, 22050, 8, 0).to_vec();
		file.extend_from_slice(&[0u8; 10]);
		patch_sizes(&mut file);

		assert_eq!(u32::from_le_bytes(file[4..8].try_into().unwrap()), 46);
		assert_eq!(u32::from_le_bytes(file[40..44].try_into().unwrap()), 10);
	}
}
