//! Prelude module for `sgs_internal`.
//!
//! This module provides a convenient way to import commonly used types and
//! traits.

// Re-export everything from sgs_types::prelude
#[doc(inline)]
pub use sgs_types::prelude::*;

// Re-export the entire sgs_types module for advanced usage
#[doc(inline)]
pub use sgs_types;
