//! This crate provides core data types and file format support for the
//! `sgs-rs` project.
//!
//! # File Formats
//!
//! - **ARC**: `SGS.DAT 1.00` archive containers with optional sliding-window
//!   compression
//! - **ANM**: palette-indexed animation files with a column-strip RLE frame
//!   stream
//! - **PCM/WAV**: raw PCM blobs and WAV files, with conversion between them
//! - **SCRIPT**: bytecode images with disassembly, string export, and
//!   translation import
//!
//! # Examples
//!
//! ```rust
//! use sgs_types::file::{ArcFile, ScriptFile};
//!
//! // Build a small archive in memory
//! let files = vec![("readme.txt".to_string(), b"hello".to_vec())];
//! let arc = ArcFile::build(&files, false);
//! assert_eq!(arc.num_entries(), 1);
//!
//! // Disassemble a script image
//! let script = ScriptFile::from_bytes(vec![0x14, 0x10, 0x00]);
//! let disasm = script.disassemble();
//! assert_eq!(disasm.jumps.len(), 1);
//! ```

pub mod file;
pub mod prelude;

// Re-export commonly used file types at crate root for convenience
pub use file::{
	AnmFile, AnmFrame, AnmPalette, ArcEntry, ArcFile, FileType, FormatTag, SampleSpec,
	ScriptFile, SgsFileError, Sound, Version,
};
