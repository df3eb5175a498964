//! PCM / WAV sound support.
//!
//! The engine stores voice and effect data either as headerless PCM blobs or
//! as plain 44-byte-header WAV files. This module recognizes both, normalizes
//! their parameters, and converts between them through the pipeline in
//! [`convert`]: Bresenham resampler, averaging channel mixer, byte-shift
//! depth converter, and the XOR-0x80 center-shift toggle.
//!
//! Raw blobs carry no parameters of their own; the defaults depend on the
//! engine [`Version`] gate. Only its ordering matters: releases at or above
//! [`Version::Gtb`] use 16-bit signed raw PCM, older ones 8-bit.

pub mod convert;
pub mod wav;

use std::io::Read;
use std::str::FromStr;

use crate::file::{FileType, SgsFileError};

/// Engine release gate selecting raw-PCM defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Version {
	/// Trial and early builds
	#[default]
	Unrestricted,
	/// Releases before GTB
	PreGtb,
	/// The GTB release
	Gtb,
	/// Releases after GTB
	PostGtb,
}

impl Version {
	/// Bits per sample for raw PCM under this gate.
	pub fn raw_bits_per_sample(&self) -> u16 {
		if *self >= Version::Gtb {
			16
		} else {
			8
		}
	}
}

impl FromStr for Version {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"unrestricted" => Ok(Version::Unrestricted),
			"pregtb" => Ok(Version::PreGtb),
			"gtb" => Ok(Version::Gtb),
			"postgtb" => Ok(Version::PostGtb),
			_ => Err(format!("unknown version '{s}'")),
		}
	}
}

impl std::fmt::Display for Version {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Version::Unrestricted => write!(f, "Unrestricted"),
			Version::PreGtb => write!(f, "PreGTB"),
			Version::Gtb => write!(f, "GTB"),
			Version::PostGtb => write!(f, "PostGTB"),
		}
	}
}

/// Container format of a sound buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTag {
	/// Headerless PCM blob
	Raw,
	/// RIFF/RIFX WAV file
	Wave,
}

impl std::fmt::Display for FormatTag {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			FormatTag::Raw => write!(f, "RAW"),
			FormatTag::Wave => write!(f, "WAVE"),
		}
	}
}

/// Normalized sample parameters.
///
/// `center_shifted` marks formats whose most significant byte is offset by
/// 0x80 relative to the engine's native signed representation; conversion
/// toggles the offset only when source and target disagree. (8-bit WAV is
/// center-128, which is why it carries the flag.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SampleSpec {
	/// Channel count (>= 1)
	pub channels: u16,
	/// Sample rate in Hz
	pub sample_rate: u32,
	/// Bits per sample, 8 or 16
	pub bits_per_sample: u16,
	/// Whether the most significant byte is XOR-0x80 shifted
	pub center_shifted: bool,
}

impl SampleSpec {
	/// Bytes per single-channel sample.
	pub fn bytes_per_sample(&self) -> usize {
		usize::from(self.bits_per_sample) / 8
	}

	/// Bytes per frame across all channels.
	pub fn frame_size(&self) -> usize {
		self.bytes_per_sample() * usize::from(self.channels.max(1))
	}

	/// The raw-PCM target format: always mono 22050 Hz, depth by version.
	pub fn raw_target(version: Version) -> Self {
		let bits = version.raw_bits_per_sample();
		Self {
			channels: 1,
			sample_rate: 22050,
			bits_per_sample: bits,
			center_shifted: bits == 16,
		}
	}
}

/// A parsed sound: format tag, normalized parameters, and sample payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sound {
	format: FormatTag,
	spec: SampleSpec,
	samples: Vec<u8>,
}

impl Sound {
	/// Parses a sound buffer.
	///
	/// Buffers with a recognized WAV header are parsed from it (channel
	/// count 0 normalizes to 1, bit depths clamp to 8 or 16, RIFX 16-bit
	/// data is byte-swapped); anything else is a raw blob with defaults
	/// taken from the version gate.
	pub fn parse(data: &[u8], version: Version) -> Result<Self, SgsFileError> {
		match wav::detect(data) {
			Some(endian) => {
				let header = wav::parse(data)?;

				let channels = header.channels.max(1);
				let bits_per_sample = header.bits_per_sample.clamp(8, 16);
				let bits_per_sample = if bits_per_sample > 8 {
					16
				} else {
					8
				};

				let available = data.len() - wav::HEADER_SIZE;
				let size = (header.data_size as usize).min(available);
				let mut samples = data[wav::HEADER_SIZE..wav::HEADER_SIZE + size].to_vec();

				if endian == wav::Endian::Big && bits_per_sample == 16 {
					for pair in samples.chunks_exact_mut(2) {
						pair.swap(0, 1);
					}
				}

				Ok(Self {
					format: FormatTag::Wave,
					spec: SampleSpec {
						channels,
						sample_rate: header.sample_rate,
						bits_per_sample,
						center_shifted: true,
					},
					samples,
				})
			}
			None => {
				let bits = version.raw_bits_per_sample();
				Ok(Self {
					format: FormatTag::Raw,
					spec: SampleSpec {
						channels: 1,
						sample_rate: 22050,
						bits_per_sample: bits,
						center_shifted: bits == 16,
					},
					samples: data.to_vec(),
				})
			}
		}
	}

	/// Loads a sound from any reader.
	pub fn from_reader<R: Read>(reader: &mut R, version: Version) -> Result<Self, SgsFileError> {
		let mut data = Vec::new();
		reader.read_to_end(&mut data)?;
		Self::parse(&data, version)
	}

	/// Opens a sound file from the specified path.
	pub fn open(path: impl AsRef<std::path::Path>, version: Version) -> Result<Self, SgsFileError> {
		let data = std::fs::read(path)?;
		Self::parse(&data, version)
	}

	/// Returns the container format tag.
	pub fn format(&self) -> FormatTag {
		self.format
	}

	/// Returns the normalized sample parameters.
	pub fn spec(&self) -> &SampleSpec {
		&self.spec
	}

	/// Returns the sample payload (header stripped, RIFX already swapped).
	pub fn samples(&self) -> &[u8] {
		&self.samples
	}

	/// Number of sample frames in the payload.
	pub fn frame_count(&self) -> usize {
		self.samples.len() / self.spec.frame_size()
	}

	/// Duration in milliseconds.
	pub fn duration_ms(&self) -> u32 {
		if self.spec.sample_rate == 0 {
			return 0;
		}
		(self.frame_count() as u64 * 1000 / u64::from(self.spec.sample_rate)) as u32
	}

	/// Returns a human-readable parameter summary for the `info` command.
	pub fn info_string(&self) -> String {
		format!(
			"{} sound: {} ch, {} Hz, {} bit, {} frames ({} ms)",
			self.format,
			self.spec.channels,
			self.spec.sample_rate,
			self.spec.bits_per_sample,
			self.frame_count(),
			self.duration_ms()
		)
	}

	/// Converts to a WAV file, preserving channels, rate, and depth.
	///
	/// The canonical header is written with the precomputed output size and
	/// the chunk sizes are patched afterwards if the emitted size differs.
	pub fn to_wav(&self) -> Vec<u8> {
		let target = SampleSpec {
			center_shifted: true,
			..self.spec
		};

		let expected_frames =
			convert::resampled_frames(self.frame_count(), self.spec.sample_rate, target.sample_rate);
		let expected_size = (expected_frames * target.frame_size()) as u32;

		let mut file = wav::write_header(
			target.channels,
			target.sample_rate,
			target.bits_per_sample,
			expected_size,
		)
		.to_vec();
		file.extend_from_slice(&convert::convert(&self.samples, &self.spec, &target));

		if file.len() - wav::HEADER_SIZE != expected_size as usize {
			wav::patch_sizes(&mut file);
		}

		file
	}

	/// Converts to a raw PCM blob: mono 22050 Hz, depth by version gate.
	pub fn to_raw(&self, version: Version) -> Vec<u8> {
		let target = SampleSpec::raw_target(version);
		convert::convert(&self.samples, &self.spec, &target)
	}
}

impl std::fmt::Display for Sound {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.info_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn raw_8bit(len: usize) -> Vec<u8> {
		(0..len).map(|i| (i % 251) as u8).collect()
	}

	#[test]
	fn test_version_ordering() {
		assert!(Version::Unrestricted < Version::PreGtb);
		assert!(Version::PreGtb < Version::Gtb);
		assert!(Version::Gtb < Version::PostGtb);
		assert_eq!(Version::PreGtb.raw_bits_per_sample(), 8);
		assert_eq!(Version::PostGtb.raw_bits_per_sample(), 16);
	}

	#[test]
	fn test_version_from_str() {
		assert_eq!("gtb".parse::<Version>().unwrap(), Version::Gtb);
		assert_eq!("PostGTB".parse::<Version>().unwrap(), Version::PostGtb);
		assert!("whatever".parse::<Version>().is_err());
	}

	#[test]
	fn test_raw_defaults() {
		let sound = Sound::parse(&raw_8bit(100), Version::Unrestricted).unwrap();
		assert_eq!(sound.format(), FormatTag::Raw);
		assert_eq!(sound.spec().channels, 1);
		assert_eq!(sound.spec().sample_rate, 22050);
		assert_eq!(sound.spec().bits_per_sample, 8);
		assert!(!sound.spec().center_shifted);

		let sound = Sound::parse(&raw_8bit(100), Version::Gtb).unwrap();
		assert_eq!(sound.spec().bits_per_sample, 16);
		assert!(sound.spec().center_shifted);
	}

	#[test]
	fn test_wav_header_normalization() {
		let mut file = wav::write_header(0, 22050, 4, 4).to_vec();
		file.extend_from_slice(&[1, 2, 3, 4]);
		// Channel count 0 normalizes to 1, bit depth below 8 clamps to 8
		let sound = Sound::parse(&file, Version::Unrestricted).unwrap();
		assert_eq!(sound.format(), FormatTag::Wave);
		assert_eq!(sound.spec().channels, 1);
		assert_eq!(sound.spec().bits_per_sample, 8);
		assert!(sound.spec().center_shifted);

		let mut file = wav::write_header(1, 22050, 24, 4).to_vec();
		file.extend_from_slice(&[1, 2, 3, 4]);
		let sound = Sound::parse(&file, Version::Unrestricted).unwrap();
		assert_eq!(sound.spec().bits_per_sample, 16);
	}

	#[test]
	fn test_rifx_sample_swap() {
		let mut file = wav::write_header(1, 22050, 16, 4).to_vec();
		file[0..4].copy_from_slice(b"RIFX");
		file[22..24].copy_from_slice(&1u16.to_be_bytes());
		file[24..28].copy_from_slice(&22050u32.to_be_bytes());
		file[34..36].copy_from_slice(&16u16.to_be_bytes());
		file[40..44].copy_from_slice(&4u32.to_be_bytes());
		file.extend_from_slice(&[0x12, 0x34, 0x56, 0x78]);

		let sound = Sound::parse(&file, Version::Unrestricted).unwrap();
		assert_eq!(sound.samples(), &[0x34, 0x12, 0x78, 0x56]);
	}

	#[test]
	fn test_info_string() {
		let sound = Sound::parse(&raw_8bit(22050), Version::Unrestricted).unwrap();
		let info = sound.info_string();
		assert_eq!(info, "RAW sound: 1 ch, 22050 Hz, 8 bit, 22050 frames (1000 ms)");
		// Display delegates to the same summary
		assert_eq!(format!("{sound}"), info);
	}

	#[test]
	fn test_raw_to_wav_sizes() {
		// 4410 bytes of 8-bit mono 22050 Hz raw PCM
		let sound = Sound::parse(&raw_8bit(4410), Version::Unrestricted).unwrap();
		let file = sound.to_wav();

		assert_eq!(file.len(), 4454);
		assert_eq!(&file[0..4], b"RIFF");
		assert_eq!(&file[8..12], b"WAVE");
		assert_eq!(&file[36..40], b"data");
		assert_eq!(u32::from_le_bytes(file[4..8].try_into().unwrap()), 4446);
		assert_eq!(u32::from_le_bytes(file[40..44].try_into().unwrap()), 4410);
	}

	#[test]
	fn test_wav_output_parses_under_hound() {
		let sound = Sound::parse(&raw_8bit(2205), Version::Unrestricted).unwrap();
		let file = sound.to_wav();

		let reader = hound::WavReader::new(std::io::Cursor::new(file)).unwrap();
		let spec = reader.spec();
		assert_eq!(spec.channels, 1);
		assert_eq!(spec.sample_rate, 22050);
		assert_eq!(spec.bits_per_sample, 8);
		assert_eq!(reader.len(), 2205);
	}

	#[test]
	fn test_wav_identity_roundtrip() {
		// A WAV converted to WAV with identical parameters keeps its payload
		let mut file = wav::write_header(1, 22050, 8, 5).to_vec();
		file.extend_from_slice(&[0, 64, 128, 192, 255]);

		let sound = Sound::parse(&file, Version::Unrestricted).unwrap();
		assert_eq!(sound.to_wav(), file);
	}

	#[test]
	fn test_wav8_to_raw8_recenters() {
		let mut file = wav::write_header(1, 22050, 8, 3).to_vec();
		file.extend_from_slice(&[0x80, 0x00, 0xFF]);

		let sound = Sound::parse(&file, Version::Unrestricted).unwrap();
		// Center-128 WAV samples become engine-signed bytes
		assert_eq!(sound.to_raw(Version::Unrestricted), vec![0x00, 0x80, 0x7F]);
	}

	#[test]
	fn test_raw_target_forces_mono_22050() {
		let mut file = wav::write_header(2, 44100, 16, 8).to_vec();
		file.extend_from_slice(&[0; 8]);

		let sound = Sound::parse(&file, Version::PostGtb).unwrap();
		let raw = sound.to_raw(Version::PostGtb);
		// 2 stereo frames at 44100 Hz resample to 1 mono frame at 22050 Hz
		assert_eq!(raw.len(), 2);
	}
}
