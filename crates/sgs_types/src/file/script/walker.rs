//! Table-driven script walker.
//!
//! One linear pass from offset 0: read an opcode byte, dispatch through
//! [`super::opcodes::lookup`], let the operand layout consume its bytes, emit
//! a disassembly line, and record jump references and strings along the way.
//! Unknown opcodes emit an `UNKNOWN_OPCODE` line and the walk continues at
//! the next byte; an operand read that runs past EOF records the error on the
//! current line and stops.
//!
//! Backward jumps are never followed; addresses therefore come out strictly
//! increasing, which the importer relies on for its prefix sums.

use std::collections::BTreeMap;

use encoding_rs::Encoding;

use super::opcodes::{self, JumpKind, Operands};
use super::reader::ByteReader;
use crate::file::SgsFileError;

/// A recorded 16-bit branch operand.
///
/// `operand_address` is the offset of the target word itself, not of the
/// opcode that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpReference {
	/// Byte offset of the 16-bit target word
	pub operand_address: u32,
	/// Target address currently stored in the word
	pub target: u16,
	/// Branch category
	pub kind: JumpKind,
}

/// String categories recorded by the walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringKind {
	/// Display text (opcode 0x21)
	Display = 0,
	/// Token definition text (opcode 0x24)
	Token = 1,
	/// Choice menu text (opcodes 0x3E and 0x69)
	Choice = 2,
}

/// A string recorded with its byte offset.
///
/// `address` points at the first text byte. `byte_len` is the encoded length
/// excluding the NUL terminator; the importer skips that many source bytes
/// when splicing a replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringEntry {
	/// Byte offset of the first text byte
	pub address: u32,
	/// Decoded text
	pub text: String,
	/// String category
	pub kind: StringKind,
	/// Speaker label resolved from the token table, if any
	pub name: Option<String>,
	/// Encoded byte length excluding the NUL
	pub byte_len: usize,
}

/// Result of one walk: disassembly lines plus the side indexes.
#[derive(Debug, Clone, Default)]
pub struct Disassembly {
	/// One line per decoded instruction
	pub lines: Vec<String>,
	/// Every tracked branch operand
	pub jumps: Vec<JumpReference>,
	/// Every recorded string, in address order
	pub strings: Vec<StringEntry>,
	/// Token table as of the end of the walk, keyed by stored id
	pub tokens: BTreeMap<u8, String>,
}

impl Disassembly {
	/// Renders the disassembly listing.
	pub fn text(&self) -> String {
		let mut text = String::new();
		for line in &self.lines {
			text.push_str(line);
			text.push('\n');
		}
		text
	}
}

/// Walks a script image, producing disassembly and side indexes.
pub fn walk(data: &[u8], encoding: &'static Encoding) -> Disassembly {
	let mut state = WalkState {
		reader: ByteReader::new(data),
		encoding,
		out: Disassembly::default(),
	};
	state.run();
	state.out
}

struct WalkState<'a> {
	reader: ByteReader<'a>,
	encoding: &'static Encoding,
	out: Disassembly,
}

impl WalkState<'_> {
	fn run(&mut self) {
		while !self.reader.is_eof() {
			let address = self.reader.position();
			let opcode = match self.reader.read_u8() {
				Ok(opcode) => opcode,
				Err(_) => break,
			};

			let Some(def) = opcodes::lookup(opcode) else {
				self.out.lines.push(format!("{address:08X} | UNKNOWN_OPCODE 0x{opcode:02X}"));
				continue;
			};

			match self.read_operands(def.operands) {
				Ok(operands) if operands.is_empty() => {
					self.out.lines.push(format!("{address:08X} | {}", def.mnemonic));
				}
				Ok(operands) => {
					self.out.lines.push(format!("{address:08X} | {} {operands}", def.mnemonic));
				}
				Err(err) => {
					self.out
						.lines
						.push(format!("{address:08X} | {} <error: {err}>", def.mnemonic));
					break;
				}
			}
		}
	}

	fn read_branch(&mut self, kind: JumpKind) -> Result<u16, SgsFileError> {
		let operand_address = self.reader.position() as u32;
		let target = self.reader.read_u16_le()?;
		self.out.jumps.push(JumpReference {
			operand_address,
			target,
			kind,
		});
		Ok(target)
	}

	/// Collects the raw bytes of a NUL-terminated string, honoring the
	/// engine's double-byte sequences: a byte >= 0x80 opens a two-byte pair,
	/// and the pair 0x81 0x90 is followed by one more token-id byte. The
	/// collected bytes keep those sequences intact so that re-encoding
	/// preserves offsets.
	fn scan_text_bytes(&mut self) -> Result<Vec<u8>, SgsFileError> {
		let mut raw = Vec::new();
		loop {
			let byte = self.reader.read_u8()?;
			if byte == 0 {
				return Ok(raw);
			}
			raw.push(byte);
			if byte >= 0x80 {
				let trail = self.reader.read_u8()?;
				raw.push(trail);
				if byte == 0x81 && trail == 0x90 {
					raw.push(self.reader.read_u8()?);
				}
			}
		}
	}

	fn decode(&self, raw: &[u8]) -> String {
		self.encoding.decode_without_bom_handling(raw).0.into_owned()
	}

	/// Reads one NUL-terminated string and records it.
	fn read_string(&mut self, kind: StringKind, name: Option<String>) -> Result<String, SgsFileError> {
		let address = self.reader.position() as u32;
		let raw = self.scan_text_bytes()?;
		let text = self.decode(&raw);
		self.out.strings.push(StringEntry {
			address,
			text: text.clone(),
			kind,
			name,
			byte_len: raw.len(),
		});
		Ok(text)
	}

	fn read_operands(&mut self, operands: Operands) -> Result<String, SgsFileError> {
		let r = &mut self.reader;
		match operands {
			Operands::None => Ok(String::new()),
			Operands::U16 => Ok(format!("{}", r.read_u16_le()?)),
			Operands::U32 => Ok(format!("{}", r.read_u32_le()?)),
			Operands::RegImm => {
				let reg = r.read_u8()?;
				let imm = r.read_u16_le()?;
				Ok(format!("r{reg}, {imm}"))
			}
			Operands::RegSigned => {
				let reg = r.read_u8()?;
				let imm = r.read_i16_le()?;
				Ok(format!("r{reg}, {imm}"))
			}
			Operands::RegReg => {
				let a = r.read_u8()?;
				let b = r.read_u8()?;
				Ok(format!("r{a}, r{b}"))
			}
			Operands::Branch(kind) => {
				let target = self.read_branch(kind)?;
				Ok(format!("0x{target:04X}"))
			}
			Operands::RegImmBranch => {
				let reg = self.reader.read_u8()?;
				let imm = self.reader.read_u16_le()?;
				let target = self.read_branch(JumpKind::Compare)?;
				Ok(format!("r{reg}, {imm}, 0x{target:04X}"))
			}
			Operands::RegRegBranch => {
				let a = self.reader.read_u8()?;
				let b = self.reader.read_u8()?;
				let target = self.read_branch(JumpKind::Compare)?;
				Ok(format!("r{a}, r{b}, 0x{target:04X}"))
			}
			Operands::ImmBranch => {
				let imm = self.reader.read_u16_le()?;
				let target = self.read_branch(JumpKind::Compare)?;
				Ok(format!("{imm}, 0x{target:04X}"))
			}
			Operands::PropImmBranch => {
				let prop = self.reader.read_u8()?;
				let imm = self.reader.read_u16_le()?;
				let target = self.read_branch(JumpKind::Test)?;
				Ok(format!("p{prop}, {imm}, 0x{target:04X}"))
			}
			Operands::MaskBranch => {
				let mask = self.reader.read_u32_le()?;
				let target = self.read_branch(JumpKind::Test)?;
				Ok(format!("0x{mask:08X}, 0x{target:04X}"))
			}
			Operands::DisplayText => {
				let name = if self.reader.peek_u8() == Some(0x01) {
					self.reader.read_u8()?;
					let id = self.reader.read_u8()?;
					self.out.tokens.get(&id).cloned()
				} else {
					None
				};
				let text = self.read_string(StringKind::Display, name.clone())?;
				match name {
					Some(name) => Ok(format!("|{name}| \"{text}\"")),
					None => Ok(format!("\"{text}\"")),
				}
			}
			Operands::TokenDef => {
				let id = self.reader.read_u8()?;
				let stored = id.wrapping_add(1);
				let text = self.read_string(StringKind::Token, None)?;
				self.out.tokens.insert(stored, text.clone());
				Ok(format!("{stored}, \"{text}\""))
			}
			Operands::Choice => {
				let count = self.reader.read_u8()?;
				let mut parts = vec![format!("{count}")];
				for _ in 0..count {
					// The optional token-id prefix is consumed and dropped
					if self.reader.peek_u8() == Some(0x01) {
						self.reader.read_u8()?;
						self.reader.read_u8()?;
					}
					let text = self.read_string(StringKind::Choice, None)?;
					parts.push(format!("\"{text}\""));
				}
				Ok(parts.join(", "))
			}
			Operands::ChoiceJump => {
				let count = self.reader.read_u8()?;
				let mut parts = vec![format!("{count}")];
				for _ in 0..count {
					let target = self.read_branch(JumpKind::Choice)?;
					let text = self.read_string(StringKind::Choice, None)?;
					parts.push(format!("0x{target:04X} \"{text}\""));
				}
				Ok(parts.join(", "))
			}
			Operands::Str => {
				let raw = self.scan_text_bytes()?;
				Ok(format!("\"{}\"", self.decode(&raw)))
			}
			Operands::StrU8 => {
				let raw = self.scan_text_bytes()?;
				let arg = self.reader.read_u8()?;
				Ok(format!("\"{}\", {arg}", self.decode(&raw)))
			}
			Operands::StrU16U16 => {
				let raw = self.scan_text_bytes()?;
				let x = self.reader.read_u16_le()?;
				let y = self.reader.read_u16_le()?;
				Ok(format!("\"{}\", {x}, {y}", self.decode(&raw)))
			}
			Operands::PairList => {
				let mut pairs = Vec::new();
				loop {
					let a = self.reader.read_u8()?;
					if a == 0 {
						break;
					}
					let b = self.reader.read_u8()?;
					pairs.push(format!("0x{:06X}", (u32::from(a) << 16) | u32::from(b)));
				}
				Ok(format!("[{}]", pairs.join(", ")))
			}
			Operands::DwordArray => {
				let count = self.reader.read_u8()?;
				let mut values = Vec::with_capacity(count as usize);
				for _ in 0..count {
					values.push(format!("{}", self.reader.read_u32_le()?));
				}
				Ok(format!("[{}]", values.join(", ")))
			}
		}
	}
}
