//! Translation importer.
//!
//! Rewrites a script image so that replacement strings of different length
//! keep every intra-file branch target valid:
//!
//! 1. Walk the script to rebuild the jump-reference and string indexes.
//! 2. Build the change set: translations that differ from the original text,
//!    auto-line-broken and re-encoded. Strings without a translation are
//!    kept as-is with a warning.
//! 3. Patch every jump word in place on a working copy: each target grows by
//!    the summed deltas of changed addresses strictly below it.
//! 4. Rebuild the image segment by segment, splicing the new strings in.
//!
//! Encoding failures and jump-target overflows abort before anything is
//! written; the working copy is discarded and the caller's buffer stays
//! untouched.

use encoding_rs::Encoding;
use log::warn;

use super::export::{LINE_BREAK, Translation};
use super::walker;
use crate::file::{FileType, SgsFileError};

struct Change {
	address: u32,
	old_len: usize,
	new_bytes: Vec<u8>,
	delta: i64,
}

/// Splits overlong segments at the last space before `max_line_length`
/// characters (or hard at the limit when a segment has no space), keeping
/// existing break markers.
pub fn auto_line_break(text: &str, max_line_length: usize) -> String {
	if max_line_length == 0 {
		return text.to_string();
	}

	let mut pieces = Vec::new();
	for segment in text.split(LINE_BREAK) {
		let chars: Vec<char> = segment.chars().collect();
		let mut start = 0;

		while chars.len() - start > max_line_length {
			let window = &chars[start..start + max_line_length];
			match window.iter().rposition(|&c| c == ' ') {
				Some(space) => {
					pieces.push(chars[start..start + space].iter().collect::<String>());
					start += space + 1;
				}
				None => {
					pieces.push(window.iter().collect::<String>());
					start += max_line_length;
				}
			}
		}
		pieces.push(chars[start..].iter().collect::<String>());
	}

	pieces.join(&LINE_BREAK.to_string())
}

/// Applies a translation set to a script image.
///
/// Returns the rebuilt image. Addresses in `translations` refer to the
/// original image; the walk is rerun here so the caller does not need to
/// pass any index along.
pub fn import(
	script: &[u8],
	translations: &[Translation],
	encoding: &'static Encoding,
	max_line_length: usize,
) -> Result<Vec<u8>, SgsFileError> {
	let disasm = walker::walk(script, encoding);

	let lookup: std::collections::BTreeMap<u32, &str> =
		translations.iter().map(|t| (t.address, t.text.as_str())).collect();

	// Change set, in ascending address order
	let mut changes: Vec<Change> = Vec::new();
	for entry in &disasm.strings {
		let Some(&replacement) = lookup.get(&entry.address) else {
			warn!("no translation for string at {:08X}, keeping original", entry.address);
			continue;
		};
		if replacement == entry.text {
			continue;
		}

		let broken = auto_line_break(replacement, max_line_length);
		let (encoded, _, had_errors) = encoding.encode(&broken);
		if had_errors {
			return Err(SgsFileError::EncodingFailure {
				file_type: FileType::Script,
				address: entry.address,
				codec: encoding.name(),
			});
		}

		let new_bytes = encoded.into_owned();
		let delta = (new_bytes.len() as i64 + 1) - (entry.byte_len as i64 + 1);
		changes.push(Change {
			address: entry.address,
			old_len: entry.byte_len,
			new_bytes,
			delta,
		});
	}

	if changes.is_empty() {
		return Ok(script.to_vec());
	}

	// Patch jump words in place before the segmented copy
	let mut patched = script.to_vec();
	for jump in &disasm.jumps {
		let shift: i64 = changes
			.iter()
			.filter(|change| change.address < u32::from(jump.target))
			.map(|change| change.delta)
			.sum();
		if shift == 0 {
			continue;
		}

		let target = i64::from(jump.target) + shift;
		if !(0..=0xFFFF).contains(&target) {
			return Err(SgsFileError::JumpTargetOverflow {
				file_type: FileType::Script,
				operand_address: jump.operand_address,
				target,
			});
		}

		let at = jump.operand_address as usize;
		patched[at..at + 2].copy_from_slice(&(target as u16).to_le_bytes());
	}

	// Segmented rebuild: copy unchanged spans, splice replacements
	let total_delta: i64 = changes.iter().map(|change| change.delta).sum();
	let new_size = (script.len() as i64 + total_delta) as usize;

	let mut output = Vec::with_capacity(new_size);
	let mut src = 0usize;
	for change in &changes {
		let address = change.address as usize;
		if address < src || address + change.old_len + 1 > patched.len() {
			warn!(
				"inconsistent change at {:08X} during rebuild, restoring original image",
				change.address
			);
			return Ok(script.to_vec());
		}

		output.extend_from_slice(&patched[src..address]);
		output.extend_from_slice(&change.new_bytes);
		output.push(0);
		src = address + change.old_len + 1;
	}
	output.extend_from_slice(&patched[src..]);

	debug_assert_eq!(output.len(), new_size);
	Ok(output)
}

/// Writes a file atomically: the content goes to a sibling temporary path
/// which then replaces the destination.
pub fn write_atomic(path: impl AsRef<std::path::Path>, bytes: &[u8]) -> std::io::Result<()> {
	let path = path.as_ref();
	let mut tmp = path.as_os_str().to_owned();
	tmp.push(".tmp");
	let tmp = std::path::PathBuf::from(tmp);

	std::fs::write(&tmp, bytes)?;
	std::fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
	use super::*;
	use encoding_rs::SHIFT_JIS;

	fn tr(address: u32, text: &str) -> Translation {
		Translation {
			address,
			text: text.to_string(),
		}
	}

	/// A script with display strings at fixed addresses and one leading jump.
	fn script_with_strings(target: u16, strings: &[(usize, &[u8])]) -> Vec<u8> {
		let last = strings.iter().map(|(at, text)| at + text.len() + 1).max().unwrap();
		let mut script = vec![0u8; last];
		script[0] = 0x14;
		script[1..3].copy_from_slice(&target.to_le_bytes());
		for &(at, text) in strings {
			script[at - 1] = 0x21;
			script[at..at + text.len()].copy_from_slice(text);
		}
		script
	}

	#[test]
	fn test_same_length_replacement_keeps_jumps() {
		let script = script_with_strings(150, &[(100, b"abc\0"), (200, b"def\0")]);
		let output =
			import(&script, &[tr(100, "xyz"), tr(200, "uvw")], SHIFT_JIS, 50).unwrap();

		assert_eq!(output.len(), script.len());
		assert_eq!(&output[1..3], &150u16.to_le_bytes());
		assert_eq!(&output[100..104], b"xyz\0");
		assert_eq!(&output[200..204], b"uvw\0");
	}

	#[test]
	fn test_growth_before_target_shifts_jump() {
		let script = script_with_strings(150, &[(100, b"abc\0"), (200, b"def\0")]);
		// String at 100 grows by 4 bytes; target 150 crosses it
		let output =
			import(&script, &[tr(100, "abcdefg"), tr(200, "def")], SHIFT_JIS, 50).unwrap();

		assert_eq!(output.len(), script.len() + 4);
		assert_eq!(&output[1..3], &154u16.to_le_bytes());
		assert_eq!(&output[100..108], b"abcdefg\0");
		// The second string sits 4 bytes later, unchanged
		assert_eq!(&output[204..208], b"def\0");
	}

	#[test]
	fn test_growth_after_target_leaves_jump() {
		let script = script_with_strings(150, &[(100, b"abc\0"), (200, b"def\0")]);
		let output =
			import(&script, &[tr(100, "abc"), tr(200, "defgh")], SHIFT_JIS, 50).unwrap();

		assert_eq!(output.len(), script.len() + 2);
		assert_eq!(&output[1..3], &150u16.to_le_bytes());
	}

	#[test]
	fn test_growth_before_low_target_leaves_jump() {
		// The jump targets 0x10, before the only changed string: no shift,
		// and the file grows by the delta
		let mut script = vec![0x14, 0x10, 0x00];
		script.resize(0x10, 0x00);
		script.extend_from_slice(&[0x21, 0x01, 0x05, b'H', b'i', 0x00]);

		let output = import(&script, &[tr(0x13, "Hello")], SHIFT_JIS, 50).unwrap();

		assert_eq!(output.len(), script.len() + 3);
		assert_eq!(&output[1..3], &0x10u16.to_le_bytes());
		assert_eq!(&output[0x13..0x19], b"Hello\0");
	}

	#[test]
	fn test_missing_translation_keeps_original() {
		let script = script_with_strings(150, &[(100, b"abc\0"), (200, b"def\0")]);
		let output = import(&script, &[tr(100, "abc")], SHIFT_JIS, 50).unwrap();
		assert_eq!(output, script);
	}

	#[test]
	fn test_overflow_target_aborts() {
		let script = script_with_strings(200, &[(100, b"a\0")]);
		let big = "x".repeat(70000);
		let err = import(&script, &[tr(100, &big)], SHIFT_JIS, 0).unwrap_err();
		assert!(matches!(err, SgsFileError::JumpTargetOverflow { .. }));
	}

	#[test]
	fn test_unencodable_translation_aborts() {
		let script = script_with_strings(150, &[(100, b"abc\0")]);
		// The replacement code point has no Shift-JIS representation
		let err = import(&script, &[tr(100, "smile \u{1F600}")], SHIFT_JIS, 50).unwrap_err();
		assert!(matches!(err, SgsFileError::EncodingFailure { .. }));
	}

	#[test]
	fn test_auto_break_at_last_space() {
		// The window is 11 characters; its last space is after "hello"
		assert_eq!(auto_line_break("hello world again", 11), "hello￥world again");
		assert_eq!(auto_line_break("hello world", 20), "hello world");
	}

	#[test]
	fn test_auto_break_hard_split_without_space() {
		assert_eq!(auto_line_break("abcdefgh", 4), "abcd￥efgh");
	}

	#[test]
	fn test_auto_break_keeps_existing_markers() {
		assert_eq!(auto_line_break("ab￥cdef", 4), "ab￥cdef");
		assert_eq!(auto_line_break("ab￥cdefgh", 4), "ab￥cdef￥gh");
	}

	#[test]
	fn test_auto_break_zero_limit_is_noop() {
		assert_eq!(auto_line_break("whatever text", 0), "whatever text");
	}
}
