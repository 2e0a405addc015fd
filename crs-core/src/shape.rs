//! Dimensions and array sizes of a CRS matrix

use core::mem::size_of;

use crate::types::{Index, Scalar, Size};

/// Rows, columns and stored non-zeros of a CRS matrix
///
/// All array sizes are derived from these three numbers: `data` and `inner`
/// hold `nnz` entries, `outer` holds `rows + 1` offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shape {
    pub rows: Size,
    pub cols: Size,
    pub nnz: Size,
}

impl Shape {
    pub const fn new(rows: Size, cols: Size, nnz: Size) -> Self {
        Self { rows, cols, nnz }
    }

    /// True when both dimensions are set
    pub const fn has_dimensions(&self) -> bool {
        self.rows > 0 && self.cols > 0
    }

    pub const fn data_size(&self) -> Size {
        self.nnz
    }

    pub const fn inner_size(&self) -> Size {
        self.nnz
    }

    pub const fn outer_size(&self) -> Size {
        self.rows + 1
    }

    pub const fn sizeof_data(&self) -> Size {
        self.data_size() * size_of::<Scalar>()
    }

    pub const fn sizeof_inner(&self) -> Size {
        self.inner_size() * size_of::<Index>()
    }

    pub const fn sizeof_outer(&self) -> Size {
        self.outer_size() * size_of::<Index>()
    }

    /// Bytes needed to hold all three arrays
    pub const fn alloc_size(&self) -> Size {
        self.sizeof_data() + self.sizeof_outer() + self.sizeof_inner()
    }

    pub fn checked_outer_size(&self) -> Option<Size> {
        self.rows.checked_add(1)
    }

    pub fn checked_sizeof_data(&self) -> Option<Size> {
        self.nnz.checked_mul(size_of::<Scalar>())
    }

    pub fn checked_sizeof_inner(&self) -> Option<Size> {
        self.nnz.checked_mul(size_of::<Index>())
    }

    pub fn checked_sizeof_outer(&self) -> Option<Size> {
        self.checked_outer_size()?.checked_mul(size_of::<Index>())
    }

    /// [`Shape::alloc_size`], or `None` when it does not fit in a `usize`
    pub fn checked_alloc_size(&self) -> Option<Size> {
        self.checked_sizeof_data()?
            .checked_add(self.checked_sizeof_outer()?)?
            .checked_add(self.checked_sizeof_inner()?)
    }
}

impl core::fmt::Display for Shape {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Shape[nnz={},rows={},cols={}]",
            self.nnz, self.rows, self.cols
        )
    }
}
