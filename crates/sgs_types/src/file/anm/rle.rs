//! Column-strip run-length codec for animation frames.
//!
//! Pixels are processed in strips of four adjacent columns. Within a strip
//! the stream is a sequence of 4-byte blocks, one row each. Two equal
//! consecutive blocks signal a run: a length value follows (one byte 1..255,
//! or a zero byte plus one more byte encoding 256..511) and the trigger
//! block is written that many rows in total, after which the
//! previous-block state is cleared. The state is also cleared at every strip
//! boundary, so runs never cross strips.
//!
//! Frame widths must be a multiple of four in compressed mode; encoders pad
//! narrower frames before calling in here.

use crate::file::{FileType, SgsFileError};

use super::constants::STRIP_WIDTH;

/// Longest run representable by one length value
const MAX_RUN: usize = 511;

/// Decodes a compressed frame payload into a width×height index buffer.
pub fn decode(payload: &[u8], width: usize, height: usize) -> Result<Vec<u8>, SgsFileError> {
	let mut output = vec![0u8; width * height];
	let mut pos = 0;

	let mut read_block = |pos: &mut usize| -> Result<[u8; 4], SgsFileError> {
		let Some(bytes) = payload.get(*pos..*pos + 4) else {
			return Err(SgsFileError::insufficient_data(FileType::Anm, *pos + 4, payload.len()));
		};
		*pos += 4;
		Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
	};

	let mut col = 0;
	while col < width {
		let mut write_pos = col;
		let mut rows = 0;
		let mut previous: Option<[u8; 4]> = None;

		while rows < height {
			let block = read_block(&mut pos)?;

			if previous == Some(block) {
				let run = read_run_length(payload, &mut pos)?;
				for _ in 0..run {
					if rows >= height {
						break;
					}
					output[write_pos..write_pos + 4].copy_from_slice(&block);
					write_pos += width;
					rows += 1;
				}
				previous = None;
			} else {
				output[write_pos..write_pos + 4].copy_from_slice(&block);
				write_pos += width;
				rows += 1;
				previous = Some(block);
			}
		}

		col += STRIP_WIDTH;
	}

	Ok(output)
}

fn read_run_length(payload: &[u8], pos: &mut usize) -> Result<usize, SgsFileError> {
	let Some(&byte) = payload.get(*pos) else {
		return Err(SgsFileError::insufficient_data(FileType::Anm, *pos + 1, payload.len()));
	};
	*pos += 1;

	if byte != 0 {
		return Ok(byte as usize);
	}

	let Some(&ext) = payload.get(*pos) else {
		return Err(SgsFileError::insufficient_data(FileType::Anm, *pos + 1, payload.len()));
	};
	*pos += 1;
	Ok(256 + ext as usize)
}

/// Encodes a width×height index buffer as a compressed frame payload.
///
/// `width` must already be a multiple of the strip width.
pub fn encode(data: &[u8], width: usize, height: usize) -> Vec<u8> {
	debug_assert_eq!(width % STRIP_WIDTH, 0);
	debug_assert_eq!(data.len(), width * height);

	let mut payload = Vec::new();

	let mut col = 0;
	while col < width {
		let mut row = 0;
		while row < height {
			let offset = row * width + col;
			let block = &data[offset..offset + 4];

			// Count equal consecutive rows, capped at one run construct
			let mut run = 1;
			while row + run < height && run < MAX_RUN + 1 {
				let next = (row + run) * width + col;
				if &data[next..next + 4] != block {
					break;
				}
				run += 1;
			}

			payload.extend_from_slice(block);
			if run >= 2 {
				payload.extend_from_slice(block);
				write_run_length(&mut payload, run - 1);
			}
			row += run;
		}
		col += STRIP_WIDTH;
	}

	payload
}

fn write_run_length(payload: &mut Vec<u8>, run: usize) {
	debug_assert!((1..=MAX_RUN).contains(&run));
	if run < 256 {
		payload.push(run as u8);
	} else {
		payload.push(0);
		payload.push((run - 256) as u8);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_single_block_frame() {
		// A 4x1 frame is one block with no run byte
		let data = vec![1, 2, 3, 4];
		let payload = encode(&data, 4, 1);
		assert_eq!(payload, data);
		assert_eq!(decode(&payload, 4, 1).unwrap(), data);
	}

	#[test]
	fn test_two_row_run() {
		let data = vec![9, 9, 9, 9, 9, 9, 9, 9];
		let payload = encode(&data, 4, 2);
		// block, trigger block, run value 1
		assert_eq!(payload, vec![9, 9, 9, 9, 9, 9, 9, 9, 1]);
		assert_eq!(decode(&payload, 4, 2).unwrap(), data);
	}

	#[test]
	fn test_long_run_uses_extension_byte() {
		let height = 400;
		let data = vec![5u8; 4 * height];
		let payload = encode(&data, 4, height);
		// block, trigger, 0-extension, 399 - 256
		assert_eq!(payload, vec![5, 5, 5, 5, 5, 5, 5, 5, 0, (399 - 256) as u8]);
		assert_eq!(decode(&payload, 4, height).unwrap(), data);
	}

	#[test]
	fn test_run_longer_than_extension_restarts() {
		let height = 600;
		let data = vec![7u8; 4 * height];
		let payload = encode(&data, 4, height);
		assert_eq!(decode(&payload, 4, height).unwrap(), data);
	}

	#[test]
	fn test_runs_do_not_cross_strips() {
		// Two strips of identical blocks: each strip restarts its state
		let width = 8;
		let height = 2;
		let data = vec![3u8; width * height];
		let payload = encode(&data, width, height);
		assert_eq!(decode(&payload, width, height).unwrap(), data);
		// Each strip encodes independently: 2 blocks + run value each
		assert_eq!(payload.len(), 2 * (4 + 4 + 1));
	}

	#[test]
	fn test_mixed_rows_roundtrip() {
		let width = 8;
		let height = 16;
		let mut data = Vec::with_capacity(width * height);
		for row in 0..height {
			for col in 0..width {
				// Alternating bands produce both literal blocks and runs
				data.push(((row / 3) * 16 + col) as u8);
			}
		}
		let payload = encode(&data, width, height);
		assert_eq!(decode(&payload, width, height).unwrap(), data);
	}

	#[test]
	fn test_truncated_payload_is_an_error() {
		let err = decode(&[1, 2], 4, 1).unwrap_err();
		assert!(err.is_insufficient_data());
	}
}
