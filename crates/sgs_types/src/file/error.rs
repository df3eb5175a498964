//! Error types for file format parsing and manipulation.
//!
//! This module provides a unified error handling system using [`SgsFileError`]
//! for all file formats supported by sgs-rs.

use thiserror::Error;

/// Unified error type for all file format operations
#[derive(Debug, Error)]
pub enum SgsFileError {
	/// Not enough data to parse
	#[error("{file_type} error: Insufficient data (expected {expected} bytes, got {actual} bytes)")]
	InsufficientData {
		/// File type that encountered the error
		file_type: FileType,
		/// Expected number of bytes
		expected: usize,
		/// Actual number of bytes
		actual: usize,
	},

	/// Invalid magic number
	#[error(
		"{file_type} error: Invalid magic number (expected {expected:02X?}, got {actual:02X?})"
	)]
	InvalidMagic {
		/// File type that encountered the error
		file_type: FileType,
		/// Expected magic bytes
		expected: Vec<u8>,
		/// Actual magic bytes
		actual: Vec<u8>,
	},

	/// Declared entry placement exceeds the containing file (ARC files)
	#[error(
		"{file_type} error: Entry '{name}' extends past end of file (offset {offset} + size {size} > {file_len})"
	)]
	BadPlacement {
		/// File type that encountered the error
		file_type: FileType,
		/// Entry name
		name: String,
		/// Declared data offset
		offset: u32,
		/// Declared stored size
		size: u32,
		/// Actual file length
		file_len: usize,
	},

	/// Unsupported sample depth or pixel format
	#[error("{file_type} error: Unsupported format: {message}")]
	UnsupportedFormat {
		/// File type that encountered the error
		file_type: FileType,
		/// Description of the unsupported value
		message: String,
	},

	/// A string cannot be represented in the target text codec
	#[error("{file_type} error: Cannot encode string at {address:08X} with codec {codec}")]
	EncodingFailure {
		/// File type that encountered the error
		file_type: FileType,
		/// Byte address of the offending string
		address: u32,
		/// Name of the codec that failed
		codec: &'static str,
	},

	/// A patched branch target no longer fits in 16 bits
	#[error(
		"{file_type} error: Patched jump target {target} at operand offset {operand_address:08X} overflows 16 bits"
	)]
	JumpTargetOverflow {
		/// File type that encountered the error
		file_type: FileType,
		/// Byte offset of the 16-bit operand word
		operand_address: u32,
		/// Adjusted target that did not fit
		target: i64,
	},

	/// Decompression error
	#[error("{file_type} error: Decompression failed: {message}")]
	DecompressionError {
		/// File type that encountered the error
		file_type: FileType,
		/// Error message
		message: String,
	},

	/// Entry not found
	#[error("{file_type} error: Entry not found: {message}")]
	EntryNotFound {
		/// File type that encountered the error
		file_type: FileType,
		/// Error message
		message: String,
	},

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),

	/// Slice conversion error
	#[error(transparent)]
	TryFromSliceError(#[from] std::array::TryFromSliceError),
}

impl SgsFileError {
	/// Returns the file type associated with this error
	pub fn file_type(&self) -> Option<FileType> {
		match self {
			Self::InsufficientData {
				file_type,
				..
			}
			| Self::InvalidMagic {
				file_type,
				..
			}
			| Self::BadPlacement {
				file_type,
				..
			}
			| Self::UnsupportedFormat {
				file_type,
				..
			}
			| Self::EncodingFailure {
				file_type,
				..
			}
			| Self::JumpTargetOverflow {
				file_type,
				..
			}
			| Self::DecompressionError {
				file_type,
				..
			}
			| Self::EntryNotFound {
				file_type,
				..
			} => Some(*file_type),
			_ => None,
		}
	}

	/// Returns true if this is an I/O error
	pub fn is_io_error(&self) -> bool {
		matches!(self, Self::IOError(_))
	}

	/// Returns true if this is an insufficient data error
	pub fn is_insufficient_data(&self) -> bool {
		matches!(self, Self::InsufficientData { .. })
	}

	/// Returns true if this is an invalid magic error
	pub fn is_invalid_magic(&self) -> bool {
		matches!(self, Self::InvalidMagic { .. })
	}

	/// Create an insufficient data error
	pub fn insufficient_data(file_type: FileType, expected: usize, actual: usize) -> Self {
		Self::InsufficientData {
			file_type,
			expected,
			actual,
		}
	}

	/// Create an invalid magic error
	pub fn invalid_magic(file_type: FileType, expected: &[u8], actual: &[u8]) -> Self {
		Self::InvalidMagic {
			file_type,
			expected: expected.to_vec(),
			actual: actual.to_vec(),
		}
	}

	/// Create an unsupported format error
	pub fn unsupported_format(file_type: FileType, message: impl Into<String>) -> Self {
		Self::UnsupportedFormat {
			file_type,
			message: message.into(),
		}
	}
}

/// File type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
	/// ARC archive container
	Arc,
	/// ANM animation file
	Anm,
	/// PCM / WAV sound file
	Pcm,
	/// Script bytecode file
	Script,
}

impl FileType {
	/// Returns the typical file extension for this file type
	pub fn extension(&self) -> &'static str {
		match self {
			FileType::Arc => "ARC",
			FileType::Anm => "ANM",
			FileType::Pcm => "PCM",
			FileType::Script => "BIN",
		}
	}

	/// Returns a human-readable description of this file type
	pub fn description(&self) -> &'static str {
		match self {
			FileType::Arc => "Archive container",
			FileType::Anm => "Animation file",
			FileType::Pcm => "Sound file",
			FileType::Script => "Script bytecode",
		}
	}
}

impl std::fmt::Display for FileType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			FileType::Arc => write!(f, "ARC"),
			FileType::Anm => write!(f, "ANM"),
			FileType::Pcm => write!(f, "PCM"),
			FileType::Script => write!(f, "SCRIPT"),
		}
	}
}
