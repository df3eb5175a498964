//! 8-bit indexed BMP emission and parsing.
//!
//! Frames are exported as classic BITMAPINFOHEADER bitmaps: 54-byte header,
//! 1024-byte BGRA palette, bottom-up rows padded to 4-byte boundaries. Only
//! 8 bits per pixel is supported; anything else is the wrong input for the
//! re-encoder and is rejected.

use crate::file::{FileType, SgsFileError};

use super::{constants, frame::Frame, palette::Palette};

/// Offset of the pixel data in emitted files
const DATA_OFFSET: usize = 14 + 40 + constants::BMP_PALETTE_SIZE;

fn padded_row_len(width: usize) -> usize {
	width.div_ceil(4) * 4
}

/// Renders a frame as an 8-bit indexed BMP with the given palette.
pub fn write(frame: &Frame, palette: &Palette) -> Vec<u8> {
	let width = frame.width as usize;
	let height = frame.height as usize;
	let row_len = padded_row_len(width);
	let image_size = row_len * height;
	let file_size = DATA_OFFSET + image_size;

	let mut bytes = Vec::with_capacity(file_size);

	// BITMAPFILEHEADER
	bytes.extend_from_slice(b"BM");
	bytes.extend_from_slice(&(file_size as u32).to_le_bytes());
	bytes.extend_from_slice(&[0; 4]);
	bytes.extend_from_slice(&(DATA_OFFSET as u32).to_le_bytes());

	// BITMAPINFOHEADER
	bytes.extend_from_slice(&40u32.to_le_bytes());
	bytes.extend_from_slice(&(width as i32).to_le_bytes());
	bytes.extend_from_slice(&(height as i32).to_le_bytes());
	bytes.extend_from_slice(&1u16.to_le_bytes());
	bytes.extend_from_slice(&8u16.to_le_bytes());
	bytes.extend_from_slice(&0u32.to_le_bytes());
	bytes.extend_from_slice(&(image_size as u32).to_le_bytes());
	bytes.extend_from_slice(&0u32.to_le_bytes());
	bytes.extend_from_slice(&0u32.to_le_bytes());
	bytes.extend_from_slice(&256u32.to_le_bytes());
	bytes.extend_from_slice(&0u32.to_le_bytes());

	bytes.extend_from_slice(&palette.to_bmp_bytes());

	// Bottom-up rows with 4-byte alignment padding
	for row in (0..height).rev() {
		let start = row * width;
		bytes.extend_from_slice(&frame.data[start..start + width]);
		bytes.resize(bytes.len() + (row_len - width), 0);
	}

	bytes
}

/// Parsed 8-bit bitmap: dimensions, palette indices, and the embedded
/// palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
	/// Image width in pixels
	pub width: u16,
	/// Image height in pixels
	pub height: u16,
	/// Palette indices, row-major top-down
	pub data: Vec<u8>,
	/// Embedded BGRA palette
	pub palette: Palette,
}

/// Parses an 8-bit indexed BMP.
pub fn parse(bytes: &[u8]) -> Result<Bitmap, SgsFileError> {
	if bytes.len() < 54 {
		return Err(SgsFileError::insufficient_data(FileType::Anm, 54, bytes.len()));
	}
	if &bytes[0..2] != b"BM" {
		return Err(SgsFileError::invalid_magic(FileType::Anm, b"BM", &bytes[0..2]));
	}

	let data_offset = u32::from_le_bytes(bytes[10..14].try_into()?) as usize;
	let width = i32::from_le_bytes(bytes[18..22].try_into()?);
	let height = i32::from_le_bytes(bytes[22..26].try_into()?);
	let bits_per_pixel = u16::from_le_bytes(bytes[28..30].try_into()?);

	if bits_per_pixel != 8 {
		return Err(SgsFileError::unsupported_format(
			FileType::Anm,
			format!("bitmap has {bits_per_pixel} bits per pixel, expected 8"),
		));
	}
	if width <= 0 || height <= 0 {
		return Err(SgsFileError::unsupported_format(
			FileType::Anm,
			format!("bitmap dimensions {width}x{height} out of range"),
		));
	}

	let palette = Palette::from_bmp_bytes(&bytes[54..])?;

	let width = width as usize;
	let height = height as usize;
	let row_len = padded_row_len(width);
	let needed = data_offset + row_len * height;
	if bytes.len() < needed {
		return Err(SgsFileError::insufficient_data(FileType::Anm, needed, bytes.len()));
	}

	let mut data = vec![0u8; width * height];
	for row in 0..height {
		let src = data_offset + (height - 1 - row) * row_len;
		let dst = row * width;
		data[dst..dst + width].copy_from_slice(&bytes[src..src + width]);
	}

	Ok(Bitmap {
		width: width as u16,
		height: height as u16,
		data,
		palette,
	})
}
