//! ARC archive container support.
//!
//! ARC files bundle the engine's assets behind a fixed index. The layout is:
//!
//! ```text
//! 0x00..0x04   "SGS."
//! 0x04..0x0C   "DAT 1.00"
//! 0x0C..0x10   file count N (u32 LE)
//! 0x10 + 32*i  index entry i (0x20 bytes):
//!     +0x00    name, UTF-8, NUL padded/truncated to 16 bytes
//!     +0x10    reserved (3 bytes, zero)
//!     +0x13    is_packed flag (0 or 1)
//!     +0x14    stored_size (u32 LE)
//!     +0x18    unpacked_size (u32 LE)
//!     +0x1C    absolute data offset (u32 LE)
//! ```
//!
//! Entry names may contain forward slashes denoting subdirectories. Packed
//! entries use the sliding-window stream from [`crate::file::lz`].

use std::{
	fmt::Formatter,
	io::{self, Read},
};

use super::{FileType, SgsFileError, lz};

mod constants {
	/// Leading tag bytes
	pub const TAG: [u8; 4] = *b"SGS.";

	/// Version magic verified on unpack
	pub const MAGIC: [u8; 8] = *b"DAT 1.00";

	/// Offset of the file count field
	pub const COUNT_OFFSET: usize = 12;

	/// Offset of the first index entry
	pub const INDEX_OFFSET: usize = 16;

	/// Size of one index entry
	pub const ENTRY_SIZE: usize = 0x20;

	/// Maximum stored name length in bytes
	pub const NAME_LEN: usize = 16;
}

/// A single archive index entry.
///
/// Built during the index scan and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
	/// Raw name bytes, NUL padded
	pub raw_name: [u8; constants::NAME_LEN],

	/// Whether the payload is compressed
	pub is_packed: bool,

	/// Size of the payload as stored in the archive
	pub stored_size: u32,

	/// Size of the payload after decompression
	pub unpacked_size: u32,

	/// Absolute offset of the payload within the archive
	pub offset: u32,
}

impl Entry {
	/// Creates a new entry, truncating the name to 16 bytes
	pub fn new(name: &str, is_packed: bool, stored_size: u32, unpacked_size: u32, offset: u32) -> Self {
		let mut raw_name = [0u8; constants::NAME_LEN];
		let bytes = name.as_bytes();
		let len = bytes.len().min(constants::NAME_LEN);
		raw_name[..len].copy_from_slice(&bytes[..len]);

		Self {
			raw_name,
			is_packed,
			stored_size,
			unpacked_size,
			offset,
		}
	}

	/// Returns the name as a string, trimming trailing NUL bytes
	pub fn name(&self) -> String {
		let end = self.raw_name.iter().position(|&b| b == 0).unwrap_or(constants::NAME_LEN);
		String::from_utf8_lossy(&self.raw_name[..end]).into_owned()
	}

	/// Loads an entry from a 0x20-byte slice
	pub fn from_bytes(data: &[u8]) -> Result<Self, SgsFileError> {
		if data.len() < constants::ENTRY_SIZE {
			return Err(SgsFileError::insufficient_data(
				FileType::Arc,
				constants::ENTRY_SIZE,
				data.len(),
			));
		}

		let mut raw_name = [0u8; constants::NAME_LEN];
		raw_name.copy_from_slice(&data[0..constants::NAME_LEN]);

		let is_packed = data[0x13] != 0;
		let stored_size = u32::from_le_bytes(data[0x14..0x18].try_into()?);
		let unpacked_size = u32::from_le_bytes(data[0x18..0x1C].try_into()?);
		let offset = u32::from_le_bytes(data[0x1C..0x20].try_into()?);

		Ok(Self {
			raw_name,
			is_packed,
			stored_size,
			unpacked_size,
			offset,
		})
	}

	/// Serializes the entry to its 0x20-byte on-disk form
	pub fn to_bytes(&self) -> [u8; constants::ENTRY_SIZE] {
		let mut buffer = [0u8; constants::ENTRY_SIZE];
		buffer[0..constants::NAME_LEN].copy_from_slice(&self.raw_name);
		buffer[0x13] = u8::from(self.is_packed);
		buffer[0x14..0x18].copy_from_slice(&self.stored_size.to_le_bytes());
		buffer[0x18..0x1C].copy_from_slice(&self.unpacked_size.to_le_bytes());
		buffer[0x1C..0x20].copy_from_slice(&self.offset.to_le_bytes());
		buffer
	}

	/// Returns the size of an index entry in bytes
	pub const fn size() -> usize {
		constants::ENTRY_SIZE
	}
}

impl std::fmt::Display for Entry {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"Entry {{ name: '{}', packed: {}, stored: {}, unpacked: {}, offset: {} }}",
			self.name(),
			self.is_packed,
			self.stored_size,
			self.unpacked_size,
			self.offset
		)
	}
}

/// ARC archive file.
///
/// Holds the parsed index together with the raw archive image; payloads are
/// extracted (and decompressed) on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
	entries: Vec<Entry>,
	data: Vec<u8>,
}

impl File {
	/// Parses an archive from bytes.
	///
	/// Verifies the version magic at bytes 4..12, reads the index, and checks
	/// that every entry's payload lies within the file.
	pub fn from_bytes(data: &[u8]) -> Result<Self, SgsFileError> {
		if data.len() < constants::INDEX_OFFSET {
			return Err(SgsFileError::insufficient_data(
				FileType::Arc,
				constants::INDEX_OFFSET,
				data.len(),
			));
		}

		let magic = &data[4..12];
		if magic != constants::MAGIC {
			return Err(SgsFileError::invalid_magic(FileType::Arc, &constants::MAGIC, magic));
		}

		let count = u32::from_le_bytes(data[constants::COUNT_OFFSET..constants::INDEX_OFFSET].try_into()?)
			as usize;

		let index_end = constants::INDEX_OFFSET + count * constants::ENTRY_SIZE;
		if data.len() < index_end {
			return Err(SgsFileError::insufficient_data(FileType::Arc, index_end, data.len()));
		}

		let mut entries = Vec::with_capacity(count);
		for i in 0..count {
			let offset = constants::INDEX_OFFSET + i * constants::ENTRY_SIZE;
			let entry = Entry::from_bytes(&data[offset..offset + constants::ENTRY_SIZE])?;

			let end = entry.offset as u64 + entry.stored_size as u64;
			if end > data.len() as u64 {
				return Err(SgsFileError::BadPlacement {
					file_type: FileType::Arc,
					name: entry.name(),
					offset: entry.offset,
					size: entry.stored_size,
					file_len: data.len(),
				});
			}

			entries.push(entry);
		}

		Ok(Self {
			entries,
			data: data.to_vec(),
		})
	}

	/// Loads an archive from any reader
	pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, SgsFileError> {
		let mut data = Vec::new();
		reader.read_to_end(&mut data)?;
		Self::from_bytes(&data)
	}

	/// Opens an archive from the specified path
	pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, SgsFileError> {
		let data = std::fs::read(path)?;
		Self::from_bytes(&data)
	}

	/// Returns the index entries
	pub fn entries(&self) -> &[Entry] {
		&self.entries
	}

	/// Returns the number of entries
	pub fn num_entries(&self) -> usize {
		self.entries.len()
	}

	/// Finds an entry by name (case-insensitive)
	pub fn find_entry(&self, name: &str) -> Option<&Entry> {
		self.entries.iter().find(|e| e.name().eq_ignore_ascii_case(name))
	}

	/// Reads and, if necessary, decompresses the payload of an entry
	pub fn read_entry(&self, entry: &Entry) -> Result<Vec<u8>, SgsFileError> {
		let start = entry.offset as usize;
		let end = start + entry.stored_size as usize;
		let stored = &self.data[start..end];

		if entry.is_packed {
			lz::decompress(stored, entry.unpacked_size as usize)
		} else {
			Ok(stored.to_vec())
		}
	}

	/// Reads an entry's payload by name
	pub fn read_entry_by_name(&self, name: &str) -> Result<Vec<u8>, SgsFileError> {
		let entry = self.find_entry(name).ok_or_else(|| SgsFileError::EntryNotFound {
			file_type: FileType::Arc,
			message: name.to_string(),
		})?;
		self.read_entry(entry)
	}

	/// Iterates over entries with their unpacked payloads
	pub fn iter(&self) -> impl Iterator<Item = (&Entry, Result<Vec<u8>, SgsFileError>)> {
		self.entries.iter().map(|entry| (entry, self.read_entry(entry)))
	}

	/// Builds an archive from `(name, payload)` pairs.
	///
	/// Names longer than 16 bytes are truncated; forward slashes denote
	/// subdirectories on extraction. With `compress` set, every payload is run
	/// through the sliding-window packer.
	pub fn build(files: &[(String, Vec<u8>)], compress: bool) -> Self {
		let count = files.len();
		let payload_base = constants::INDEX_OFFSET + count * constants::ENTRY_SIZE;

		let mut entries = Vec::with_capacity(count);
		let mut payloads = Vec::with_capacity(count);
		let mut offset = payload_base as u32;

		for (name, raw) in files {
			let stored = if compress {
				lz::compress(raw)
			} else {
				raw.clone()
			};

			entries.push(Entry::new(
				name,
				compress,
				stored.len() as u32,
				raw.len() as u32,
				offset,
			));
			offset += stored.len() as u32;
			payloads.push(stored);
		}

		let mut data = Vec::with_capacity(offset as usize);
		data.extend_from_slice(&constants::TAG);
		data.extend_from_slice(&constants::MAGIC);
		data.extend_from_slice(&(count as u32).to_le_bytes());
		for entry in &entries {
			data.extend_from_slice(&entry.to_bytes());
		}
		for payload in &payloads {
			data.extend_from_slice(payload);
		}

		Self {
			entries,
			data,
		}
	}

	/// Builds an archive from a directory tree.
	///
	/// Files are enumerated in sorted order for determinism; entry names are
	/// the forward-slash relative paths below `dir`, truncated to 16 bytes.
	pub fn pack_dir(dir: impl AsRef<std::path::Path>, compress: bool) -> Result<Self, SgsFileError> {
		let dir = dir.as_ref();

		let mut files = Vec::new();
		for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
			let entry = entry.map_err(std::io::Error::from)?;
			if !entry.file_type().is_file() {
				continue;
			}

			let name = entry
				.path()
				.strip_prefix(dir)
				.map_err(|_| SgsFileError::EntryNotFound {
					file_type: FileType::Arc,
					message: format!("{} is outside {}", entry.path().display(), dir.display()),
				})?
				.components()
				.map(|c| c.as_os_str().to_string_lossy())
				.collect::<Vec<_>>()
				.join("/");
			let data = std::fs::read(entry.path())?;
			files.push((name, data));
		}

		Ok(Self::build(&files, compress))
	}

	/// Returns the raw archive image
	pub fn as_bytes(&self) -> &[u8] {
		&self.data
	}

	/// Serializes the archive image
	pub fn to_bytes(&self) -> Vec<u8> {
		self.data.clone()
	}

	/// Writes the archive to the specified path
	pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), SgsFileError> {
		std::fs::write(path, &self.data)?;
		Ok(())
	}

	/// Extracts every entry below `out_dir`, creating subdirectories as
	/// needed for names containing forward slashes.
	pub fn extract_all(&self, out_dir: impl AsRef<std::path::Path>) -> Result<(), SgsFileError> {
		let out_dir = out_dir.as_ref();
		for entry in &self.entries {
			let data = self.read_entry(entry)?;
			let path = out_dir.join(entry.name());
			if let Some(parent) = path.parent() {
				std::fs::create_dir_all(parent)?;
			}
			std::fs::write(&path, &data)?;
		}
		Ok(())
	}
}

impl std::fmt::Display for File {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		writeln!(f, "ARC File: {} entries", self.entries.len())?;
		for entry in &self.entries {
			writeln!(f, "  {}", entry)?;
		}
		Ok(())
	}
}

impl TryFrom<&[u8]> for File {
	type Error = SgsFileError;

	fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
		Self::from_bytes(value)
	}
}

impl From<File> for Vec<u8> {
	fn from(file: File) -> Self {
		file.data
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_files() -> Vec<(String, Vec<u8>)> {
		vec![
			("a.txt".to_string(), b"hello".to_vec()),
			("sub/b.bin".to_string(), vec![0x00, 0xFF]),
		]
	}

	#[test]
	fn test_build_layout() {
		let arc = File::build(&sample_files(), false);
		let bytes = arc.to_bytes();

		// tag + magic + count + two index entries + 5 + 2 payload bytes
		assert_eq!(bytes.len(), 16 + 2 * 0x20 + 5 + 2);
		assert_eq!(&bytes[0..4], b"SGS.");
		assert_eq!(&bytes[4..12], b"DAT 1.00");
		assert_eq!(u32::from_le_bytes(bytes[12..16].try_into().unwrap()), 2);
	}

	#[test]
	fn test_roundtrip_uncompressed() {
		let files = sample_files();
		let arc = File::build(&files, false);
		let parsed = File::from_bytes(&arc.to_bytes()).unwrap();

		assert_eq!(parsed.num_entries(), 2);
		for (name, payload) in &files {
			assert_eq!(&parsed.read_entry_by_name(name).unwrap(), payload);
		}
	}

	#[test]
	fn test_roundtrip_compressed() {
		let files = vec![("runs.dat".to_string(), vec![7u8; 4096])];
		let arc = File::build(&files, true);
		let parsed = File::from_bytes(&arc.to_bytes()).unwrap();

		let entry = parsed.find_entry("runs.dat").unwrap();
		assert!(entry.is_packed);
		assert!((entry.stored_size as usize) < 4096);
		assert_eq!(parsed.read_entry(entry).unwrap(), vec![7u8; 4096]);
	}

	#[test]
	fn test_rejects_bad_magic() {
		let mut bytes = File::build(&sample_files(), false).to_bytes();
		bytes[4] = b'X';
		let err = File::from_bytes(&bytes).unwrap_err();
		assert!(err.is_invalid_magic());
	}

	#[test]
	fn test_rejects_bad_placement() {
		let mut bytes = File::build(&sample_files(), false).to_bytes();
		// Inflate the first entry's stored size past the end of the file
		bytes[16 + 0x14..16 + 0x18].copy_from_slice(&0xFFFF_u32.to_le_bytes());
		let err = File::from_bytes(&bytes).unwrap_err();
		assert!(matches!(err, SgsFileError::BadPlacement { .. }));
	}

	#[test]
	fn test_name_truncated_to_16_bytes() {
		let entry = Entry::new("a_very_long_file_name.dat", false, 0, 0, 0);
		assert_eq!(entry.name().len(), 16);
		assert_eq!(entry.name(), "a_very_long_file");
	}

	#[test]
	fn test_entry_roundtrip() {
		let entry = Entry::new("sub/file.bin", true, 10, 40, 0x60);
		let parsed = Entry::from_bytes(&entry.to_bytes()).unwrap();
		assert_eq!(parsed, entry);
	}

	#[test]
	fn test_find_entry_case_insensitive() {
		let arc = File::build(&sample_files(), false);
		assert!(arc.find_entry("A.TXT").is_some());
		assert!(arc.find_entry("missing").is_none());
	}
}
