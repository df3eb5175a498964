//! `.ANM` animation file format support.
//!
//! ANM files pair a 256-entry palette with a stream of indexed-color frames.
//! The frame stream is either raw or run-length encoded over four-column
//! strips (see [`rle`]). Frames decode to 8-bit indexed bitmaps plus the
//! `palette.txt` / `metadata.txt` sidecars that the re-encoder consumes.

pub mod bmp;
pub mod constants;
pub mod file;
pub mod frame;
pub mod palette;
pub mod rle;
pub mod sidecar;

pub use self::file::File;
pub use self::frame::Frame;
pub use self::palette::{Color, Palette};
pub use self::sidecar::FrameMeta;
