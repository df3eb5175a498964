//! Internal crate for `sgs-rs`.
//!
//! This crate exists to give the root crate a single re-export surface and
//! should not be used directly.
//!
//! # Examples
//!
//! ```rust
//! use sgs_internal::prelude::*;
//!
//! let arc = ArcFile::build(&[], false);
//! assert_eq!(arc.num_entries(), 0);
//! ```

/// `use sgs_internal::prelude::*;` to import commonly used items.
pub mod prelude;

// Re-export sgs_types for convenience
pub use sgs_types;
