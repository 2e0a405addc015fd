//! Compressed row storage sparse matrix
//!
//! A [`SparseMatrix`] holds three arrays: `data` (values), `inner` (column
//! index of each value) and `outer` (offset of each row's first value, with
//! a final entry equal to the number of non-zeros). Row `r` occupies
//! `data[outer[r]..outer[r + 1]]`.
//!
//! Storage is provided by an [`Allocator`]. Matrices built by this crate use
//! heap vectors; matrices opened from shared arrays, buffers or files view
//! that memory in place and move to heap storage on the first mutation.

mod assembly;
mod io;
mod iter;

pub use iter::{Entries, Entry};

use std::fmt;
use std::mem;
use std::sync::Arc;

use crs_core::{has_sorted_indices, validate_structure, Index, Scalar, Shape, Size};

use crate::allocator::{Allocator, HeapAllocator, Layout, SharedAllocator};
use crate::{Error, Result};

/// Read-only slice accessor over one layout array
macro_rules! array_accessor {
    ($name:ident, $field:ident, $len:ident, $type:ty) => {
        pub fn $name(&self) -> &[$type] {
            if self.layout.$field.is_null() {
                return &[];
            }
            // SAFETY: `owner` produced the layout for `shape` and keeps the
            // arrays alive until the layout is released in `release`.
            unsafe { std::slice::from_raw_parts(self.layout.$field, self.shape.$len()) }
        }
    };
}

pub struct SparseMatrix {
    layout: Layout,
    shape: Shape,
    owner: Box<dyn Allocator>,
}

// SAFETY: SparseMatrix is safe to Send between threads because:
// 1. The raw pointers in `layout` point into storage held by `owner`
// 2. `owner` is itself Send and moves together with the pointers
// 3. No thread-local state is involved
unsafe impl Send for SparseMatrix {}

// SAFETY: SparseMatrix is safe to share between threads (Sync) because:
// 1. Every `&self` method only reads the arrays
// 2. Writes require `&mut self`, which excludes concurrent readers
// 3. `owner` is Sync and is never mutated through `&self`
unsafe impl Sync for SparseMatrix {}

impl SparseMatrix {
    /// Empty `rows x cols` matrix without non-zeros
    pub fn new(rows: Size, cols: Size) -> Self {
        let shape = Shape::new(rows, cols, 0);
        let mut matrix = Self::detached();
        matrix.install_heap(HeapAllocator::with_shape(&shape), shape);
        matrix
    }

    /// Matrix with zero-filled storage for `nnz` entries
    ///
    /// The arrays must be filled through [`SparseMatrix::arrays_mut`] before
    /// the matrix is used.
    pub fn with_capacity(rows: Size, cols: Size, nnz: Size) -> Result<Self> {
        let mut matrix = Self::new(rows, cols);
        matrix.reserve(nnz)?;
        Ok(matrix)
    }

    /// Take ownership of CRS arrays
    ///
    /// Fails with `InvariantViolation` unless `data.len() == inner.len()`,
    /// `outer.len() == rows + 1` and the arrays form a valid CRS structure.
    /// Columns within a row may be in any order.
    pub fn from_arrays(
        rows: Size,
        cols: Size,
        data: Vec<Scalar>,
        outer: Vec<Index>,
        inner: Vec<Index>,
    ) -> Result<Self> {
        if data.len() != inner.len() {
            return Err(Error::InvariantViolation(format!(
                "data has {} entries but inner has {}",
                data.len(),
                inner.len()
            )));
        }
        if outer.len() != rows + 1 {
            return Err(Error::InvariantViolation(format!(
                "outer has {} entries, expected rows + 1 = {}",
                outer.len(),
                rows + 1
            )));
        }
        validate_structure(rows, cols, data.len(), &outer, &inner)
            .map_err(|e| Error::InvariantViolation(e.to_string()))?;

        Ok(Self::from_parts(rows, cols, data, outer, inner))
    }

    /// View reference-counted arrays without copying them
    pub fn from_shared(
        rows: Size,
        cols: Size,
        data: Arc<[Scalar]>,
        outer: Arc<[Index]>,
        inner: Arc<[Index]>,
    ) -> Result<Self> {
        let allocator = SharedAllocator::new(rows, cols, data, outer, inner)?;
        Self::from_allocator(Box::new(allocator))
    }

    /// Matrix over whatever arrays `owner` provides
    pub fn from_allocator(mut owner: Box<dyn Allocator>) -> Result<Self> {
        let mut shape = Shape::default();
        let layout = owner.allocate(&mut shape)?;
        let matrix = Self {
            layout,
            shape,
            owner,
        };

        validate_structure(
            shape.rows,
            shape.cols,
            shape.nnz,
            matrix.outer(),
            matrix.inner(),
        )
        .map_err(|e| Error::InvariantViolation(e.to_string()))?;

        Ok(matrix)
    }

    /// Rectangular identity: ones on the first `min(rows, cols)` diagonal entries
    pub fn identity(rows: Size, cols: Size) -> Result<Self> {
        let mut matrix = Self::new(rows, cols);
        matrix.set_identity(rows, cols)?;
        Ok(matrix)
    }

    /// Arrays already known to satisfy the CRS structure
    pub(crate) fn from_parts(
        rows: Size,
        cols: Size,
        data: Vec<Scalar>,
        outer: Vec<Index>,
        inner: Vec<Index>,
    ) -> Self {
        let shape = Shape::new(rows, cols, data.len());
        let mut matrix = Self::detached();
        matrix.install_heap(HeapAllocator::from_parts(data, outer, inner), shape);
        matrix
    }

    fn detached() -> Self {
        Self {
            layout: Layout::null(),
            shape: Shape::default(),
            owner: Box::new(HeapAllocator::new()),
        }
    }

    pub fn rows(&self) -> Size {
        self.shape.rows
    }

    pub fn cols(&self) -> Size {
        self.shape.cols
    }

    pub fn non_zeros(&self) -> Size {
        self.shape.nnz
    }

    pub fn is_empty(&self) -> bool {
        self.non_zeros() == 0
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    array_accessor!(data, data, data_size, Scalar);
    array_accessor!(outer, outer, outer_size, Index);
    array_accessor!(inner, inner, inner_size, Index);

    /// Writable values; the sparsity pattern stays fixed
    pub fn data_mut(&mut self) -> &mut [Scalar] {
        self.arrays_mut().0
    }

    /// Writable `(data, outer, inner)` arrays
    ///
    /// Meant for filling storage obtained from [`SparseMatrix::reserve`]. The
    /// caller is responsible for leaving a valid CRS structure behind.
    pub fn arrays_mut(&mut self) -> (&mut [Scalar], &mut [Index], &mut [Index]) {
        self.make_mutable();
        if self.layout.is_null() {
            return (&mut [], &mut [], &mut []);
        }
        // SAFETY: the owner is mutable after `make_mutable`, the three arrays
        // are distinct allocations sized by `shape`, and `&mut self` keeps
        // every other borrow of them out.
        unsafe {
            (
                std::slice::from_raw_parts_mut(self.layout.data, self.shape.data_size()),
                std::slice::from_raw_parts_mut(self.layout.outer, self.shape.outer_size()),
                std::slice::from_raw_parts_mut(self.layout.inner, self.shape.inner_size()),
            )
        }
    }

    /// Drop all entries and set new dimensions
    pub fn resize(&mut self, rows: Size, cols: Size) -> Result<()> {
        self.reallocate(Shape::new(rows, cols, 0))
    }

    /// Allocate zero-filled storage for `nnz` entries, discarding current entries
    pub fn reserve(&mut self, nnz: Size) -> Result<()> {
        if !self.shape.has_dimensions() {
            return Err(Error::PreconditionViolation(format!(
                "reserve needs rows > 0 and cols > 0, matrix is {}x{}",
                self.rows(),
                self.cols()
            )));
        }
        check_index_capacity(nnz)?;
        self.reallocate(Shape::new(self.rows(), self.cols(), nnz))
    }

    /// Replace the contents with a `rows x cols` rectangular identity
    pub fn set_identity(&mut self, rows: Size, cols: Size) -> Result<()> {
        let nnz = rows.min(cols);
        check_index_capacity(nnz)?;

        let data = vec![1.0; nnz];
        let inner = (0..nnz as Index).collect();
        let outer = (0..=rows).map(|i| i.min(nnz) as Index).collect();
        self.install_heap(
            HeapAllocator::from_parts(data, outer, inner),
            Shape::new(rows, cols, nnz),
        );
        Ok(())
    }

    /// Remove stored entries equal to `value`, keeping row order
    pub fn prune(&mut self, value: Scalar) -> &mut Self {
        let mut data = Vec::with_capacity(self.non_zeros());
        let mut inner = Vec::with_capacity(self.non_zeros());
        let mut outer = Vec::with_capacity(self.shape.outer_size());
        outer.push(0);

        for r in 0..self.rows() {
            let (start, end) = self.row_bounds(r);
            for k in start..end {
                if self.data()[k] != value {
                    data.push(self.data()[k]);
                    inner.push(self.inner()[k]);
                }
            }
            outer.push(data.len() as Index);
        }

        let shape = Shape::new(self.rows(), self.cols(), data.len());
        self.install_heap(HeapAllocator::from_parts(data, outer, inner), shape);
        self
    }

    /// Transpose in place
    pub fn transpose(&mut self) -> &mut Self {
        let mut transposed = self.transposed();
        self.swap(&mut transposed);
        self
    }

    /// Transposed copy
    ///
    /// Entries are relabelled, never summed. Columns of the result are in
    /// ascending order within each row.
    pub fn transposed(&self) -> SparseMatrix {
        let (rows, cols, nnz) = (self.rows(), self.cols(), self.non_zeros());

        let mut outer = vec![0 as Index; cols + 1];
        for &c in self.inner() {
            outer[c as usize + 1] += 1;
        }
        for c in 0..cols {
            outer[c + 1] += outer[c];
        }

        let mut next: Vec<usize> = outer[..cols].iter().map(|&o| o as usize).collect();
        let mut data = vec![0.0; nnz];
        let mut inner = vec![0 as Index; nnz];
        for r in 0..rows {
            let (start, end) = self.row_bounds(r);
            for k in start..end {
                let c = self.inner()[k] as usize;
                let pos = next[c];
                next[c] += 1;
                data[pos] = self.data()[k];
                inner[pos] = r as Index;
            }
        }

        Self::from_parts(cols, rows, data, outer, inner)
    }

    /// Exchange all state with `other` in constant time
    pub fn swap(&mut self, other: &mut SparseMatrix) {
        mem::swap(self, other);
    }

    /// Matrix made of the selected rows, in the order given
    pub fn row_reduction(&self, rows: &[Size]) -> Result<SparseMatrix> {
        if rows.len() > self.rows() {
            return Err(Error::PreconditionViolation(format!(
                "row reduction selects {} rows from a matrix with {}",
                rows.len(),
                self.rows()
            )));
        }
        if let Some(&bad) = rows.iter().find(|&&r| r >= self.rows()) {
            return Err(Error::out_of_range("row", bad as i64, self.rows()));
        }

        let mut data = Vec::new();
        let mut inner = Vec::new();
        let mut outer = Vec::with_capacity(rows.len() + 1);
        outer.push(0);
        for &r in rows {
            let (start, end) = self.row_bounds(r);
            data.extend_from_slice(&self.data()[start..end]);
            inner.extend_from_slice(&self.inner()[start..end]);
            outer.push(data.len() as Index);
        }

        Ok(Self::from_parts(rows.len(), self.cols(), data, outer, inner))
    }

    /// True when columns strictly increase within every row
    pub fn has_sorted_indices(&self) -> bool {
        has_sorted_indices(self.outer(), self.inner())
    }

    /// Bytes held by the matrix and its arrays
    pub fn footprint(&self) -> usize {
        mem::size_of::<Self>() + self.shape.alloc_size()
    }

    pub fn in_shared_memory(&self) -> bool {
        self.owner.in_shared_memory()
    }

    pub fn owner(&self) -> &dyn Allocator {
        self.owner.as_ref()
    }

    /// `data` range of row `r`
    pub(crate) fn row_bounds(&self, r: Size) -> (usize, usize) {
        let outer = self.outer();
        (outer[r] as usize, outer[r + 1] as usize)
    }

    /// Hand the layout back to the owner and forget it
    fn release(&mut self) {
        let layout = mem::replace(&mut self.layout, Layout::null());
        let shape = mem::take(&mut self.shape);
        if !layout.is_null() {
            self.owner.deallocate(layout, shape);
        }
    }

    fn install_heap(&mut self, mut heap: HeapAllocator, shape: Shape) {
        // Vec buffers do not move with the allocator, so the pointers stay valid.
        let layout = heap.layout();
        self.release();
        self.owner = Box::new(heap);
        self.layout = layout;
        self.shape = shape;
    }

    fn reallocate(&mut self, shape: Shape) -> Result<()> {
        if !self.owner.is_mutable() {
            self.install_heap(HeapAllocator::with_shape(&shape), shape);
            return Ok(());
        }

        self.release();
        let mut allocated = shape;
        self.layout = self.owner.allocate(&mut allocated)?;
        self.shape = allocated;
        Ok(())
    }

    /// Copy arrays from an immutable owner into heap storage
    fn make_mutable(&mut self) {
        if self.owner.is_mutable() {
            return;
        }
        let heap = HeapAllocator::from_parts(
            self.data().to_vec(),
            self.outer().to_vec(),
            self.inner().to_vec(),
        );
        let shape = self.shape;
        self.install_heap(heap, shape);
    }
}

fn check_index_capacity(nnz: Size) -> Result<()> {
    if nnz > Index::MAX as usize {
        return Err(Error::out_of_range(
            "non-zero count",
            nnz as i64,
            Index::MAX as usize,
        ));
    }
    Ok(())
}

impl Default for SparseMatrix {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl Drop for SparseMatrix {
    fn drop(&mut self) {
        self.release();
    }
}

impl Clone for SparseMatrix {
    /// Deep copy into heap storage
    fn clone(&self) -> Self {
        Self::from_parts(
            self.rows(),
            self.cols(),
            self.data().to_vec(),
            self.outer().to_vec(),
            self.inner().to_vec(),
        )
    }
}

impl PartialEq for SparseMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape
            && self.outer() == other.outer()
            && self.inner() == other.inner()
            && self.data() == other.data()
    }
}

impl fmt::Debug for SparseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseMatrix")
            .field("shape", &self.shape)
            .field("owner", &self.owner.to_string())
            .finish()
    }
}

impl fmt::Display for SparseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SparseMatrix[{},{}]", self.shape, self.owner)
    }
}
