//! Binary format definitions for serialized CRS matrices
//!
//! Pure data structure definitions for the wire layout. No I/O.

pub mod constants;
pub mod header;

pub use header::CrsHeader;
