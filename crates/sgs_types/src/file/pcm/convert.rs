//! Sample conversion pipeline: resampling, channel mixing, bit-depth and
//! center-shift conversion.
//!
//! The resampler is an integer Bresenham accumulator producing the classic
//! unfiltered nearest-neighbor result: output frames =
//! `floor(source_frames * sr_out / sr_in)` with the remainder carried.
//!
//! The depth converter reproduces the original engine bit-exactly: narrowing
//! right-shifts by whole bytes; widening left-shifts and, when bit 8 of the
//! shifted value is set, ORs 0xFF into the low byte. Center-shift conversion
//! XORs 0x80 into the most significant byte only when source and target
//! disagree.

use super::SampleSpec;

fn read_sample(data: &[u8], offset: usize, bytes_per_sample: usize) -> i32 {
	if bytes_per_sample == 2 {
		i32::from(i16::from_le_bytes([data[offset], data[offset + 1]]))
	} else {
		i32::from(data[offset])
	}
}

fn convert_sample(mut value: i32, from: &SampleSpec, to: &SampleSpec) -> i32 {
	let bytes_in = from.bytes_per_sample();
	let bytes_out = to.bytes_per_sample();

	if bytes_out < bytes_in {
		value >>= 8 * (bytes_in - bytes_out);
	} else if bytes_out > bytes_in {
		value <<= 8 * (bytes_out - bytes_in);
		if value & 0x100 != 0 {
			value |= 0xFF;
		}
	}

	if from.center_shifted != to.center_shifted {
		value ^= 0x80 << (8 * (bytes_out - 1));
	}

	value
}

fn write_sample(output: &mut Vec<u8>, value: i32, bytes_per_sample: usize) {
	if bytes_per_sample == 2 {
		output.extend_from_slice(&(value as u16).to_le_bytes());
	} else {
		output.push(value as u8);
	}
}

/// Converts `samples` from one format to another, returning the raw payload.
pub fn convert(samples: &[u8], from: &SampleSpec, to: &SampleSpec) -> Vec<u8> {
	let bytes_in = from.bytes_per_sample();
	let bytes_out = to.bytes_per_sample();
	let ch_in = from.channels.max(1) as usize;
	let ch_out = to.channels.max(1) as usize;
	let frame_in = bytes_in * ch_in;

	let sr_in = from.sample_rate.max(1);
	let frames = samples.len() / frame_in;
	let estimated = (frames as u64 * u64::from(to.sample_rate) / u64::from(sr_in)) as usize;
	let mut output = Vec::with_capacity(estimated * bytes_out * ch_out);

	let mut acc: u32 = 0;
	for frame in 0..frames {
		acc += to.sample_rate;
		while acc >= sr_in {
			acc -= sr_in;
			emit_frame(samples, frame * frame_in, from, to, ch_in, ch_out, &mut output);
		}
	}

	output
}

fn emit_frame(
	samples: &[u8],
	offset: usize,
	from: &SampleSpec,
	to: &SampleSpec,
	ch_in: usize,
	ch_out: usize,
	output: &mut Vec<u8>,
) {
	let bytes_in = from.bytes_per_sample();
	let bytes_out = to.bytes_per_sample();

	if ch_in == ch_out {
		for ch in 0..ch_in {
			let value = read_sample(samples, offset + ch * bytes_in, bytes_in);
			write_sample(output, convert_sample(value, from, to), bytes_out);
		}
	} else {
		// Average across every source channel, divided by the target count
		let mut sum = 0i32;
		for ch in 0..ch_in {
			sum += read_sample(samples, offset + ch * bytes_in, bytes_in);
		}
		let value = convert_sample(sum / ch_out as i32, from, to);
		for _ in 0..ch_out {
			write_sample(output, value, bytes_out);
		}
	}
}

/// Output frame count for a Bresenham resample.
pub fn resampled_frames(frames: usize, sr_in: u32, sr_out: u32) -> usize {
	(frames as u64 * u64::from(sr_out) / u64::from(sr_in.max(1))) as usize
}

#[cfg(test)]
mod tests {
	use super::*;

	fn spec(channels: u16, sample_rate: u32, bits: u16, center_shifted: bool) -> SampleSpec {
		SampleSpec {
			channels,
			sample_rate,
			bits_per_sample: bits,
			center_shifted,
		}
	}

	#[test]
	fn test_identity() {
		let fmt = spec(1, 22050, 8, false);
		let samples = vec![0, 1, 2, 128, 255];
		assert_eq!(convert(&samples, &fmt, &fmt), samples);
	}

	#[test]
	fn test_identity_stereo_16() {
		let fmt = spec(2, 44100, 16, false);
		let samples: Vec<u8> = (0..32).collect();
		assert_eq!(convert(&samples, &fmt, &fmt), samples);
	}

	#[test]
	fn test_upsample_doubles_frames() {
		let from = spec(1, 11025, 8, false);
		let to = spec(1, 22050, 8, false);
		let samples = vec![10, 20, 30];
		assert_eq!(convert(&samples, &from, &to), vec![10, 10, 20, 20, 30, 30]);
	}

	#[test]
	fn test_downsample_halves_frames() {
		let from = spec(1, 22050, 8, false);
		let to = spec(1, 11025, 8, false);
		// The accumulator crosses the threshold on the second and fourth frames
		let samples = vec![10, 20, 30, 40];
		assert_eq!(convert(&samples, &from, &to), vec![20, 40]);
	}

	#[test]
	fn test_resampled_frame_count_floor() {
		assert_eq!(resampled_frames(3, 22050, 44100), 6);
		assert_eq!(resampled_frames(5, 44100, 22050), 2);
		let from = spec(1, 44100, 8, false);
		let to = spec(1, 22050, 8, false);
		assert_eq!(convert(&[1, 2, 3, 4, 5], &from, &to).len(), 2);
	}

	#[test]
	fn test_stereo_to_mono_averages_with_target_divisor() {
		let from = spec(2, 22050, 8, false);
		let to = spec(1, 22050, 8, false);
		// (40 + 60) / 1 = 100: divisor is the target channel count
		assert_eq!(convert(&[40, 60], &from, &to), vec![100]);
	}

	#[test]
	fn test_mono_to_stereo_duplicates_half() {
		let from = spec(1, 22050, 8, false);
		let to = spec(2, 22050, 8, false);
		// 80 / 2 = 40 duplicated to both channels
		assert_eq!(convert(&[80], &from, &to), vec![40, 40]);
	}

	#[test]
	fn test_narrowing_shifts_out_low_byte() {
		let from = spec(1, 22050, 16, false);
		let to = spec(1, 22050, 8, false);
		let samples = 0x1234i16.to_le_bytes().to_vec();
		assert_eq!(convert(&samples, &from, &to), vec![0x12]);
	}

	#[test]
	fn test_widening_sign_heuristic() {
		let from = spec(1, 22050, 8, false);
		let to = spec(1, 22050, 16, false);

		// 0x01 << 8 = 0x0100: bit 8 set, low byte ORed to 0xFF
		assert_eq!(convert(&[0x01], &from, &to), 0x01FFi16.to_le_bytes().to_vec());
		// 0x02 << 8 = 0x0200: bit 8 clear, low byte stays zero
		assert_eq!(convert(&[0x02], &from, &to), 0x0200i16.to_le_bytes().to_vec());
	}

	#[test]
	fn test_center_shift_toggles_msb_only() {
		let from = spec(1, 22050, 8, true);
		let to = spec(1, 22050, 8, false);
		assert_eq!(convert(&[0x80, 0x00, 0xFF], &from, &to), vec![0x00, 0x80, 0x7F]);

		let from16 = spec(1, 22050, 16, true);
		let to16 = spec(1, 22050, 16, false);
		let samples = 0x8000u16.to_le_bytes().to_vec();
		assert_eq!(convert(&samples, &from16, &to16), 0x0000u16.to_le_bytes().to_vec());
	}
}
