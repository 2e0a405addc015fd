//! Storage providers for the three CRS arrays of a [`SparseMatrix`]
//!
//! A matrix never owns its arrays directly. It asks its allocator for a
//! [`Layout`] of raw array pointers sized by a [`Shape`], and hands the
//! layout back when it is reset or dropped. The allocator decides where the
//! memory lives: owned heap vectors, caller-supplied shared arrays, a copy of
//! a serialized buffer or a memory-mapped file.
//!
//! [`SparseMatrix`]: crate::SparseMatrix

use std::fmt;
use std::ptr;

use crs_core::{Index, Scalar, Shape};

use crate::Result;

mod buffer;
mod heap;
#[cfg(feature = "mmap")]
mod mmap;
mod row_map;
mod shared;

pub use buffer::BufferAllocator;
pub use heap::HeapAllocator;
#[cfg(feature = "mmap")]
pub use mmap::MmapAllocator;
pub use row_map::RowMapAllocator;
pub use shared::SharedAllocator;

pub(crate) use buffer::map_arrays;

/// Raw views of the `data`, `outer` and `inner` arrays
///
/// The pointers stay valid until the layout is passed back to
/// [`Allocator::deallocate`] or the allocator is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub data: *mut Scalar,
    pub outer: *mut Index,
    pub inner: *mut Index,
}

impl Layout {
    pub const fn null() -> Self {
        Self {
            data: ptr::null_mut(),
            outer: ptr::null_mut(),
            inner: ptr::null_mut(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.data.is_null() || self.outer.is_null() || self.inner.is_null()
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::null()
    }
}

/// Memory strategy of a sparse matrix
pub trait Allocator: Send + Sync + fmt::Display {
    /// Provide arrays for `shape`
    ///
    /// Allocators backed by existing arrays ignore the requested sizes and
    /// overwrite `shape` with the dimensions they actually hold.
    fn allocate(&mut self, shape: &mut Shape) -> Result<Layout>;

    /// Release the arrays of a layout obtained from [`Allocator::allocate`]
    fn deallocate(&mut self, layout: Layout, shape: Shape);

    /// True when the arrays live in memory shared with other processes
    fn in_shared_memory(&self) -> bool;

    /// True when `allocate` honours the requested shape and the arrays may
    /// be written. Matrices switch to heap storage before mutating arrays
    /// provided by an immutable allocator.
    fn is_mutable(&self) -> bool {
        true
    }
}
