//! Prelude module for `sgs_types`.
//!
//! This module provides a convenient way to import commonly used types.
//!
//! # Examples
//!
//! ```rust
//! use sgs_types::prelude::*;
//!
//! let arc = ArcFile::build(&[], false);
//! assert_eq!(arc.num_entries(), 0);
//! ```

pub use crate::file::{
	AnmFile, AnmFrame, AnmPalette, ArcEntry, ArcFile, Disassembly, FileType, FormatTag,
	JumpKind, JumpReference, SampleSpec, ScriptFile, SgsFileError, Sound, StringEntry,
	StringKind, Translation, Version,
};

// Re-export the file module itself for qualified access
pub use crate::file;
