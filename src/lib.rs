//! `sgs-rs` is a toolkit for reading, converting, and rebuilding the file
//! formats of the SGS visual novel engine: ARC archives, ANM animations,
//! PCM/WAV sound data, and script bytecode.

pub use sgs_internal::*;
