//! Validation utilities for serialized and externally supplied CRS arrays
//!
//! Pure functions with no I/O dependencies.

pub mod bounds;
pub mod format;
pub mod structure;

pub use bounds::{cast_typed_slice, validate_alignment, validate_array_bounds, validate_typed_slice};
pub use format::{align_to_boundary, calculate_padding};
pub use structure::{has_sorted_indices, validate_structure};
