#![no_std]

//! CRS Core - Compressed Row Storage Format Definitions
//!
//! This crate provides the scalar and index types, shape arithmetic, the
//! binary header of a serialized CRS matrix and pure validation functions.
//! It performs no I/O and does not allocate unless the `alloc` feature is on.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod error;
pub mod format;
pub mod shape;
pub mod triplet;
pub mod types;
pub mod validation;

pub use error::*;
pub use format::*;
pub use shape::Shape;
pub use triplet::Triplet;
pub use types::{Index, Scalar, Size};
pub use validation::{
    align_to_boundary, calculate_padding, has_sorted_indices, validate_alignment,
    validate_array_bounds, validate_structure,
};
