//! Script bytecode support: disassembly, string export, translation import.
//!
//! A script is a flat byte image walked linearly from offset 0 through the
//! opcode dispatch table in [`opcodes`]. The walk yields a disassembly
//! listing plus two side indexes: every 16-bit branch operand (with the byte
//! offset of the word itself) and every embedded string (with the byte
//! offset of its first text byte). The importer in [`import`] consumes both
//! to rewrite translated strings of different length without breaking
//! branch targets.
//!
//! Text is decoded and encoded through a named `encoding_rs` codec; the
//! engine's native codec is Shift-JIS (code page 932).

pub mod export;
pub mod import;
pub mod opcodes;
pub mod reader;
pub mod walker;

use encoding_rs::Encoding;

use crate::file::SgsFileError;

pub use self::export::Translation;
pub use self::opcodes::{JumpKind, OpcodeDef, Operands};
pub use self::walker::{Disassembly, JumpReference, StringEntry, StringKind};

/// The engine's native text codec.
pub const DEFAULT_ENCODING: &Encoding = encoding_rs::SHIFT_JIS;

/// Resolves a codec from a WHATWG label or a Windows code-page number.
pub fn encoding_from_label(label: &str) -> Option<&'static Encoding> {
	if let Ok(code_page) = label.parse::<u32>() {
		return match code_page {
			932 => Some(encoding_rs::SHIFT_JIS),
			936 => Some(encoding_rs::GBK),
			949 => Some(encoding_rs::EUC_KR),
			950 => Some(encoding_rs::BIG5),
			65001 => Some(encoding_rs::UTF_8),
			_ => None,
		};
	}
	Encoding::for_label(label.as_bytes())
}

/// A script file: a flat byte image plus the codec used for its strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
	data: Vec<u8>,
	encoding: &'static Encoding,
}

impl File {
	/// Wraps a script image with the default Shift-JIS codec.
	pub fn from_bytes(data: Vec<u8>) -> Self {
		Self {
			data,
			encoding: DEFAULT_ENCODING,
		}
	}

	/// Wraps a script image with an explicit codec.
	pub fn with_encoding(data: Vec<u8>, encoding: &'static Encoding) -> Self {
		Self {
			data,
			encoding,
		}
	}

	/// Opens a script file from the specified path.
	pub fn open(
		path: impl AsRef<std::path::Path>,
		encoding: &'static Encoding,
	) -> Result<Self, SgsFileError> {
		Ok(Self::with_encoding(std::fs::read(path)?, encoding))
	}

	/// Returns the raw script image.
	pub fn data(&self) -> &[u8] {
		&self.data
	}

	/// Returns the configured codec.
	pub fn encoding(&self) -> &'static Encoding {
		self.encoding
	}

	/// Runs the walker over the image.
	pub fn disassemble(&self) -> Disassembly {
		walker::walk(&self.data, self.encoding)
	}

	/// Renders the translation export file for every recorded string.
	pub fn export_text(&self) -> String {
		export::render(&self.disassemble().strings)
	}

	/// Applies a parsed translation set, returning the rebuilt image.
	pub fn import_translations(
		&self,
		translations: &[Translation],
		max_line_length: usize,
	) -> Result<Vec<u8>, SgsFileError> {
		import::import(&self.data, translations, self.encoding, max_line_length)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_encoding_lookup() {
		assert_eq!(encoding_from_label("932"), Some(encoding_rs::SHIFT_JIS));
		assert_eq!(encoding_from_label("shift_jis"), Some(encoding_rs::SHIFT_JIS));
		assert_eq!(encoding_from_label("utf-8"), Some(encoding_rs::UTF_8));
		assert_eq!(encoding_from_label("65001"), Some(encoding_rs::UTF_8));
		assert_eq!(encoding_from_label("1"), None);
		assert_eq!(encoding_from_label("no-such-codec"), None);
	}

	#[test]
	fn test_export_then_import_is_identity() {
		// An unmodified translation file reproduces the script byte-for-byte
		let mut image = vec![0x24, 0x04];
		image.extend_from_slice(b"Ann\0");
		image.extend_from_slice(&[0x14, 0x00, 0x00]);
		image.extend_from_slice(&[0x21, 0x01, 0x05, b'H', b'i', 0x00]);
		image.extend_from_slice(&[0x3E, 0x01]);
		image.extend_from_slice(b"pick\0");

		let script = File::from_bytes(image.clone());
		let translations = export::parse(&script.export_text());
		assert!(!translations.is_empty());

		let output = script.import_translations(&translations, 50).unwrap();
		assert_eq!(output, image);
	}

	#[test]
	fn test_line_break_marker_survives_roundtrip() {
		// 0x81 0x8F is the full-width yen marker under Shift-JIS; it exports
		// as \n and re-imports to the same bytes
		let mut image = vec![0x21];
		image.extend_from_slice(&[b'a', 0x81, 0x8F, b'b', 0x00]);

		let script = File::from_bytes(image.clone());
		let exported = script.export_text();
		assert!(exported.contains("a\\nb"));

		let translations = export::parse(&exported);
		let output = script.import_translations(&translations, 50).unwrap();
		assert_eq!(output, image);
	}

	#[test]
	fn test_import_with_changed_text_reencodes() {
		let mut image = vec![0x21];
		image.extend_from_slice(b"old\0");

		let script = File::from_bytes(image);
		let translations = vec![Translation {
			address: 1,
			text: "renewed".to_string(),
		}];

		let output = script.import_translations(&translations, 50).unwrap();
		assert_eq!(&output[1..9], b"renewed\0");
	}
}
