//! File type support for the sgs-rs project.

mod error;

pub mod anm;
pub mod arc;
pub mod lz;
pub mod pcm;
pub mod script;

// Re-export error types
pub use error::{FileType, SgsFileError};

// Re-export main file types
pub use anm::{File as AnmFile, Frame as AnmFrame, Palette as AnmPalette};
pub use arc::{Entry as ArcEntry, File as ArcFile};
pub use pcm::{FormatTag, SampleSpec, Sound, Version};
pub use script::{
	Disassembly, File as ScriptFile, JumpKind, JumpReference, StringEntry, StringKind, Translation,
};
