//! ANM file structure and I/O operations.
//!
//! An ANM file consists of:
//! - **Palette** (0x000..0x300): 256 BGR triples
//! - **Frame count** (0x300, u16 LE)
//! - **Flags** (0x302, u16 LE): bit 0x8000 set means uncompressed frames
//! - **Offset table** (0x304, frame count × u32 LE): offsets relative to the
//!   end of the table
//! - **Frames**: 8-byte header (left, top, width, height) followed by the
//!   payload, which runs to the next frame's start in offset order or EOF

use std::io::Read;
use std::path::Path;

use crate::file::{FileType, SgsFileError};

use super::{constants, frame::Frame, palette::Palette, rle, sidecar};

/// ANM animation file: palette plus a list of indexed-color frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
	palette: Palette,
	flags: u16,
	frames: Vec<Frame>,
}

impl File {
	/// Creates an ANM file from parts.
	///
	/// With `compressed` set the frame stream is RLE-encoded on
	/// serialization; otherwise the uncompressed flag bit is stored.
	pub fn new(palette: Palette, frames: Vec<Frame>, compressed: bool) -> Self {
		let flags = if compressed {
			0
		} else {
			constants::FLAG_UNCOMPRESSED
		};
		Self {
			palette,
			flags,
			frames,
		}
	}

	/// Opens an ANM file from the specified path.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, SgsFileError> {
		let data = std::fs::read(path)?;
		Self::from_bytes(&data)
	}

	/// Parses an ANM file from a reader.
	pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, SgsFileError> {
		let mut data = Vec::new();
		reader.read_to_end(&mut data)?;
		Self::from_bytes(&data)
	}

	/// Parses an ANM file from bytes.
	pub fn from_bytes(data: &[u8]) -> Result<Self, SgsFileError> {
		if data.len() < constants::OFFSET_TABLE_OFFSET {
			return Err(SgsFileError::insufficient_data(
				FileType::Anm,
				constants::OFFSET_TABLE_OFFSET,
				data.len(),
			));
		}

		let palette = Palette::from_bytes(data)?;
		let frame_count = u16::from_le_bytes(
			data[constants::FRAME_COUNT_OFFSET..constants::FRAME_COUNT_OFFSET + 2].try_into()?,
		) as usize;
		let flags =
			u16::from_le_bytes(data[constants::FLAGS_OFFSET..constants::FLAGS_OFFSET + 2].try_into()?);
		let compressed = flags & constants::FLAG_UNCOMPRESSED == 0;

		let base = constants::OFFSET_TABLE_OFFSET + 4 * frame_count;
		if data.len() < base {
			return Err(SgsFileError::insufficient_data(FileType::Anm, base, data.len()));
		}

		let mut starts = Vec::with_capacity(frame_count);
		for i in 0..frame_count {
			let offset = constants::OFFSET_TABLE_OFFSET + i * 4;
			let relative = u32::from_le_bytes(data[offset..offset + 4].try_into()?) as usize;
			starts.push(base + relative);
		}

		// Each payload runs to the next frame's start in offset order, or EOF
		let mut sorted_starts = starts.clone();
		sorted_starts.sort_unstable();

		let mut frames = Vec::with_capacity(frame_count);
		for &start in &starts {
			let end = sorted_starts
				.iter()
				.copied()
				.find(|&s| s > start)
				.unwrap_or(data.len())
				.min(data.len());

			if start + constants::FRAME_HEADER_SIZE > data.len() {
				return Err(SgsFileError::insufficient_data(
					FileType::Anm,
					start + constants::FRAME_HEADER_SIZE,
					data.len(),
				));
			}

			let left = u16::from_le_bytes(data[start..start + 2].try_into()?);
			let top = u16::from_le_bytes(data[start + 2..start + 4].try_into()?);
			let width = u16::from_le_bytes(data[start + 4..start + 6].try_into()?);
			let height = u16::from_le_bytes(data[start + 6..start + 8].try_into()?);
			let payload = &data[start + constants::FRAME_HEADER_SIZE..end];

			let pixels = if compressed {
				if width as usize % constants::STRIP_WIDTH != 0 {
					return Err(SgsFileError::unsupported_format(
						FileType::Anm,
						format!("compressed frame width {width} is not a multiple of 4"),
					));
				}
				rle::decode(payload, width as usize, height as usize)?
			} else {
				let expected = width as usize * height as usize;
				if payload.len() < expected {
					return Err(SgsFileError::insufficient_data(
						FileType::Anm,
						expected,
						payload.len(),
					));
				}
				payload[..expected].to_vec()
			};

			frames.push(Frame::new(left, top, width, height, pixels)?);
		}

		Ok(Self {
			palette,
			flags,
			frames,
		})
	}

	/// Returns the palette.
	pub fn palette(&self) -> &Palette {
		&self.palette
	}

	/// Returns the frames.
	pub fn frames(&self) -> &[Frame] {
		&self.frames
	}

	/// Returns true when the frame stream is RLE-compressed.
	pub fn is_compressed(&self) -> bool {
		self.flags & constants::FLAG_UNCOMPRESSED == 0
	}

	/// Serializes the ANM file.
	///
	/// In compressed mode frames are padded to the four-column strip width
	/// before encoding; the padded width is what gets stored.
	pub fn to_bytes(&self) -> Vec<u8> {
		let compressed = self.is_compressed();

		let mut frame_blobs = Vec::with_capacity(self.frames.len());
		for frame in &self.frames {
			let (frame, payload) = if compressed {
				let padded = frame.padded_to_strips();
				let payload =
					rle::encode(&padded.data, padded.width as usize, padded.height as usize);
				(padded, payload)
			} else {
				(frame.clone(), frame.data.clone())
			};

			let mut blob = Vec::with_capacity(constants::FRAME_HEADER_SIZE + payload.len());
			blob.extend_from_slice(&frame.header_bytes());
			blob.extend_from_slice(&payload);
			frame_blobs.push(blob);
		}

		let table_len = 4 * self.frames.len();
		let total: usize = constants::OFFSET_TABLE_OFFSET
			+ table_len
			+ frame_blobs.iter().map(Vec::len).sum::<usize>();

		let mut bytes = Vec::with_capacity(total);
		bytes.extend_from_slice(&self.palette.to_bytes());
		bytes.extend_from_slice(&(self.frames.len() as u16).to_le_bytes());
		bytes.extend_from_slice(&self.flags.to_le_bytes());

		let mut relative = 0u32;
		for blob in &frame_blobs {
			bytes.extend_from_slice(&relative.to_le_bytes());
			relative += blob.len() as u32;
		}
		for blob in &frame_blobs {
			bytes.extend_from_slice(blob);
		}

		bytes
	}

	/// Writes the ANM file to the specified path.
	pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SgsFileError> {
		std::fs::write(path, self.to_bytes())?;
		Ok(())
	}

	/// Decodes the file into a directory: `palette.txt`, `metadata.txt`, and
	/// one `frame_NNNN.bmp` per frame.
	pub fn decode_to_dir(&self, out_dir: impl AsRef<Path>) -> Result<(), SgsFileError> {
		let out_dir = out_dir.as_ref();
		std::fs::create_dir_all(out_dir)?;

		std::fs::write(out_dir.join("palette.txt"), self.palette.to_text())?;
		std::fs::write(out_dir.join("metadata.txt"), sidecar::metadata_to_text(&self.frames))?;

		for (i, frame) in self.frames.iter().enumerate() {
			let bmp = super::bmp::write(frame, &self.palette);
			std::fs::write(out_dir.join(format!("frame_{i:04}.bmp")), bmp)?;
		}

		Ok(())
	}

	/// Rebuilds an ANM file from a directory produced by [`Self::decode_to_dir`].
	///
	/// `palette.txt` supplies the palette; `metadata.txt`, when present,
	/// supplies each frame's placement (missing entries default to (0, 0)).
	pub fn from_dir(in_dir: impl AsRef<Path>, compressed: bool) -> Result<Self, SgsFileError> {
		let in_dir = in_dir.as_ref();

		let palette = Palette::from_text(&std::fs::read_to_string(in_dir.join("palette.txt"))?)?;

		let metadata = match std::fs::read_to_string(in_dir.join("metadata.txt")) {
			Ok(text) => sidecar::metadata_from_text(&text)?,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => Default::default(),
			Err(err) => return Err(err.into()),
		};

		let mut indexed: Vec<(usize, std::path::PathBuf)> = Vec::new();
		for entry in std::fs::read_dir(in_dir)? {
			let entry = entry?;
			let name = entry.file_name();
			let name = name.to_string_lossy();
			if let Some(index) = name
				.strip_prefix("frame_")
				.and_then(|rest| rest.strip_suffix(".bmp"))
				.and_then(|digits| digits.parse::<usize>().ok())
			{
				indexed.push((index, entry.path()));
			}
		}
		indexed.sort_by_key(|(index, _)| *index);

		let mut frames = Vec::with_capacity(indexed.len());
		for (index, path) in indexed {
			let bitmap = super::bmp::parse(&std::fs::read(path)?)?;
			let (left, top) = metadata
				.get(&index)
				.map(|meta| (meta.left, meta.top))
				.unwrap_or((0, 0));
			frames.push(Frame::new(left, top, bitmap.width, bitmap.height, bitmap.data)?);
		}

		Ok(Self::new(palette, frames, compressed))
	}
}

impl std::fmt::Display for File {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"ANM File ({} frames, {})",
			self.frames.len(),
			if self.is_compressed() {
				"compressed"
			} else {
				"uncompressed"
			}
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn two_frame_file(compressed: bool) -> File {
		let frames = vec![
			Frame::new(0, 0, 4, 1, vec![1, 2, 3, 4]).unwrap(),
			Frame::new(5, 6, 4, 1, vec![1, 2, 3, 4]).unwrap(),
		];
		File::new(Palette::grayscale(), frames, compressed)
	}

	#[test]
	fn test_header_layout() {
		let bytes = two_frame_file(false).to_bytes();

		assert_eq!(u16::from_le_bytes(bytes[0x300..0x302].try_into().unwrap()), 2);
		assert_eq!(
			u16::from_le_bytes(bytes[0x302..0x304].try_into().unwrap()),
			constants::FLAG_UNCOMPRESSED
		);
		// First frame directly after the two-entry offset table
		assert_eq!(u32::from_le_bytes(bytes[0x304..0x308].try_into().unwrap()), 0);
		assert_eq!(u32::from_le_bytes(bytes[0x308..0x30C].try_into().unwrap()), 12);
	}

	#[test]
	fn test_compressed_identical_frames_payload() {
		// Two 4x1 frames of one block each: 4-byte payloads, no run bytes
		let bytes = two_frame_file(true).to_bytes();
		let base = 0x304 + 8;
		assert_eq!(&bytes[base + 8..base + 12], &[1, 2, 3, 4]);
		assert_eq!(bytes.len(), base + 2 * 12);
	}

	#[test]
	fn test_uncompressed_roundtrip_is_byte_identical() {
		let bytes = two_frame_file(false).to_bytes();
		let parsed = File::from_bytes(&bytes).unwrap();
		assert_eq!(parsed.to_bytes(), bytes);
	}

	#[test]
	fn test_compressed_roundtrip() {
		let original = two_frame_file(true);
		let bytes = original.to_bytes();
		let parsed = File::from_bytes(&bytes).unwrap();

		assert!(parsed.is_compressed());
		assert_eq!(parsed.frames(), original.frames());
		// Decode/encode/decode stability
		assert_eq!(parsed.to_bytes(), bytes);
	}

	#[test]
	fn test_encode_pads_width_to_strips() {
		let frames = vec![Frame::new(0, 0, 3, 1, vec![1, 2, 3]).unwrap()];
		let anm = File::new(Palette::grayscale(), frames, true);
		let parsed = File::from_bytes(&anm.to_bytes()).unwrap();

		assert_eq!(parsed.frames()[0].width, 4);
		assert_eq!(parsed.frames()[0].data, vec![1, 2, 3, 0]);
	}

	#[test]
	fn test_placement_preserved() {
		let parsed = File::from_bytes(&two_frame_file(false).to_bytes()).unwrap();
		assert_eq!(parsed.frames()[1].left, 5);
		assert_eq!(parsed.frames()[1].top, 6);
	}

	#[test]
	fn test_truncated_file_is_an_error() {
		let err = File::from_bytes(&[0u8; 0x200]).unwrap_err();
		assert!(err.is_insufficient_data());
	}
}
