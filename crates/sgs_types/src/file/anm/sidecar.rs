//! `metadata.txt` sidecar support.
//!
//! The decoder writes one line per frame, `i left top width height`, and the
//! re-encoder uses it to restore each frame's placement. Entries are keyed
//! by frame index; a missing entry leaves the placement at (0, 0).

use std::collections::BTreeMap;

use crate::file::{FileType, SgsFileError};

use super::frame::Frame;

/// Placement and size recorded for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMeta {
	/// Horizontal placement
	pub left: u16,
	/// Vertical placement
	pub top: u16,
	/// Frame width
	pub width: u16,
	/// Frame height
	pub height: u16,
}

/// Renders the `metadata.txt` sidecar for a list of frames.
pub fn metadata_to_text(frames: &[Frame]) -> String {
	let mut text = String::new();
	for (i, frame) in frames.iter().enumerate() {
		text.push_str(&format!(
			"{} {} {} {} {}\n",
			i, frame.left, frame.top, frame.width, frame.height
		));
	}
	text
}

/// Parses a `metadata.txt` sidecar into an index → meta map.
pub fn metadata_from_text(text: &str) -> Result<BTreeMap<usize, FrameMeta>, SgsFileError> {
	let mut map = BTreeMap::new();

	for line in text.lines() {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}

		let mut parts = line.split_whitespace();
		let parse = |part: Option<&str>| part.and_then(|p| p.parse::<u32>().ok());

		let fields = (
			parse(parts.next()),
			parse(parts.next()),
			parse(parts.next()),
			parse(parts.next()),
			parse(parts.next()),
		);
		let (Some(index), Some(left), Some(top), Some(width), Some(height)) = fields else {
			return Err(SgsFileError::unsupported_format(
				FileType::Anm,
				format!("malformed metadata line: '{line}'"),
			));
		};

		map.insert(
			index as usize,
			FrameMeta {
				left: left as u16,
				top: top as u16,
				width: width as u16,
				height: height as u16,
			},
		);
	}

	Ok(map)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_roundtrip() {
		let frames = vec![
			Frame::new(10, 20, 4, 1, vec![0; 4]).unwrap(),
			Frame::new(0, 0, 4, 2, vec![0; 8]).unwrap(),
		];

		let text = metadata_to_text(&frames);
		assert_eq!(text, "0 10 20 4 1\n1 0 0 4 2\n");

		let map = metadata_from_text(&text).unwrap();
		assert_eq!(map[&0].left, 10);
		assert_eq!(map[&0].top, 20);
		assert_eq!(map[&1].width, 4);
		assert_eq!(map[&1].height, 2);
	}

	#[test]
	fn test_rejects_malformed_lines() {
		assert!(metadata_from_text("0 1 2").is_err());
		assert!(metadata_from_text("zero 1 2 3 4").is_err());
	}

	#[test]
	fn test_skips_blank_lines() {
		let map = metadata_from_text("\n0 1 2 3 4\n\n").unwrap();
		assert_eq!(map.len(), 1);
	}
}
