//! Translation text export and parsing.
//!
//! Each recorded string emits a three-line block:
//!
//! ```text
//! ◇AAAAAAAA◇|name|text
//! ◆AAAAAAAA◆|name|text
//! <blank>
//! ```
//!
//! The `◇` line keeps the original, the `◆` line is the translation target,
//! and `|name|` appears only when a speaker label was recorded. In the text,
//! the full-width-yen line-break marker becomes a literal `\n` and literal
//! backslashes are doubled. The parser reads only `◆` lines back.

use super::walker::StringEntry;

/// Line-break marker used by the engine inside display text.
pub const LINE_BREAK: char = '￥';

/// Escapes text for export: backslashes double, break markers become `\n`.
pub fn escape(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for ch in text.chars() {
		match ch {
			'\\' => out.push_str("\\\\"),
			LINE_BREAK => out.push_str("\\n"),
			_ => out.push(ch),
		}
	}
	out
}

/// Reverses [`escape`]: `\n` becomes the break marker, `\\` a backslash.
pub fn unescape(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	let mut chars = text.chars();
	while let Some(ch) = chars.next() {
		if ch != '\\' {
			out.push(ch);
			continue;
		}
		match chars.next() {
			Some('n') => out.push(LINE_BREAK),
			Some('\\') => out.push('\\'),
			Some(other) => {
				out.push('\\');
				out.push(other);
			}
			None => out.push('\\'),
		}
	}
	out
}

/// Renders the export file for a list of recorded strings.
pub fn render(strings: &[StringEntry]) -> String {
	let mut out = String::new();
	for entry in strings {
		let name = match &entry.name {
			Some(name) => format!("|{name}|"),
			None => String::new(),
		};
		let text = escape(&entry.text);
		out.push_str(&format!("◇{:08X}◇{}{}\n", entry.address, name, text));
		out.push_str(&format!("◆{:08X}◆{}{}\n", entry.address, name, text));
		out.push('\n');
	}
	out
}

/// One parsed translation line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
	/// Byte address of the string in the original script
	pub address: u32,
	/// Unescaped replacement text
	pub text: String,
}

/// Parses a translation file, keeping only `◆` lines.
///
/// A leading `|name|` bracket is stripped; the name is display-only and the
/// importer re-derives speaker labels from the script itself.
pub fn parse(text: &str) -> Vec<Translation> {
	let mut translations = Vec::new();

	for line in text.lines() {
		if !line.contains('◆') {
			continue;
		}

		let mut parts = line.splitn(3, '◆');
		let _ = parts.next();
		let Some(address) = parts.next() else {
			continue;
		};
		let Ok(address) = u32::from_str_radix(address.trim(), 16) else {
			continue;
		};
		let rest = parts.next().unwrap_or("");

		let rest = if let Some(stripped) = rest.strip_prefix('|') {
			match stripped.split_once('|') {
				Some((_, text)) => text,
				None => rest,
			}
		} else {
			rest
		};

		translations.push(Translation {
			address,
			text: unescape(rest),
		});
	}

	translations
}
