//! ANM file format constants.

/// Number of palette entries
pub const PALETTE_COLORS: usize = 256;

/// Size of the on-disk palette (256 BGR triples)
pub const PALETTE_SIZE: usize = 0x300;

/// Offset of the frame count field (u16 LE)
pub const FRAME_COUNT_OFFSET: usize = 0x300;

/// Offset of the flags field (u16 LE)
pub const FLAGS_OFFSET: usize = 0x302;

/// Offset of the per-frame offset table
pub const OFFSET_TABLE_OFFSET: usize = 0x304;

/// Flag bit marking the frame stream as uncompressed
pub const FLAG_UNCOMPRESSED: u16 = 0x8000;

/// Size of a per-frame header (left, top, width, height as u16 LE)
pub const FRAME_HEADER_SIZE: usize = 8;

/// Columns processed together by the RLE codec
pub const STRIP_WIDTH: usize = 4;

/// Size of the BGRA palette embedded in emitted bitmaps
pub const BMP_PALETTE_SIZE: usize = 1024;
