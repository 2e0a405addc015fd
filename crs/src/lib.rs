//! CRS - Compressed row storage sparse matrices with pluggable linear algebra
//!
//! This library stores sparse matrices in compressed row storage (three
//! arrays: values, row offsets and column indices) and runs dense and sparse
//! kernels through interchangeable backends.
//!
//! ## Architecture
//!
//! - **crs-core**: Scalar types, shape, triplets, the binary header and
//!   structural validation (no I/O, `no_std`)
//! - **crs**: Storage strategies, the matrix itself, dense operands and the
//!   backend registry
//!
//! ## Quick Start
//!
//! ```rust
//! use crs::{BackendRegistry, SparseMatrix, Triplet, Vector};
//!
//! fn example() -> crs::Result<()> {
//!     let a = SparseMatrix::from_triplets(
//!         3,
//!         3,
//!         &[
//!             Triplet::new(0, 0, 2.0),
//!             Triplet::new(0, 2, -3.0),
//!             Triplet::new(1, 1, 2.0),
//!             Triplet::new(2, 2, 2.0),
//!         ],
//!     )?;
//!
//!     let x = Vector::from(vec![1.0, 2.0, 3.0]);
//!     let mut y = Vector::new(3);
//!     BackendRegistry::global().find("generic")?.spmv(&a, &x, &mut y)?;
//!     assert_eq!(y.as_slice(), &[-7.0, 4.0, 6.0]);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! ## Features
//!
//! - **Storage strategies**: heap, shared read-only, in-memory buffer,
//!   memory-mapped file and row-map assembly, with copy-on-write before the
//!   first mutation of a read-only matrix
//! - **Binary format**: a fixed 104-byte header followed by 8-byte aligned
//!   arrays, readable in place from a buffer or a mapped file
//! - **Backends**: serial reference, rayon parallel and cache-blocked,
//!   selected by name or through `CRS_LINALG_BACKEND`

pub mod allocator;
pub mod config;
pub mod dense;
pub mod error;
pub mod linalg;
pub mod sparse;

pub use crs_core::{CrsError, CrsHeader, Index, Scalar, Shape, Size, Triplet};

pub use allocator::{Allocator, HeapAllocator, Layout};
pub use config::LinalgConfig;
pub use dense::{Matrix, Vector};
pub use error::{Error, Result};
pub use linalg::{BackendRegistry, LinearAlgebra};
pub use sparse::{Entry, SparseMatrix};
