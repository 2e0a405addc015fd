use std::collections::BTreeMap;
use std::fmt;

use crs_core::{Index, Scalar, Shape, Size};

use super::{Allocator, HeapAllocator, Layout};
use crate::{Error, Result};

/// One row of a [`RowMapAllocator`]: column to value, ordered by column
pub type RowMap = BTreeMap<Index, Scalar>;

/// Builds CRS arrays from rows of ordered `column -> value` maps
///
/// Column order within each row follows the map, so the result always has
/// ascending, unique column indices.
#[derive(Debug)]
pub struct RowMapAllocator {
    cols: Size,
    rows: Vec<RowMap>,
    arrays: Option<HeapAllocator>,
}

impl RowMapAllocator {
    pub fn new(cols: Size, rows: Vec<RowMap>) -> Result<Self> {
        for row in &rows {
            if let Some((&min, _)) = row.first_key_value() {
                if min < 0 {
                    return Err(Error::out_of_range("column", min as i64, cols));
                }
            }
            if let Some((&max, _)) = row.last_key_value() {
                if max as i64 >= cols as i64 {
                    return Err(Error::out_of_range("column", max as i64, cols));
                }
            }
        }
        Ok(Self {
            cols,
            rows,
            arrays: None,
        })
    }

    pub fn nnz(&self) -> Size {
        self.rows.iter().map(BTreeMap::len).sum()
    }

    fn build(&self) -> Result<HeapAllocator> {
        let nnz = self.nnz();
        if nnz > Index::MAX as usize {
            return Err(Error::out_of_range("non-zero count", nnz as i64, Index::MAX as usize));
        }

        let mut data = Vec::with_capacity(nnz);
        let mut inner = Vec::with_capacity(nnz);
        let mut outer = Vec::with_capacity(self.rows.len() + 1);
        outer.push(0);

        for row in &self.rows {
            for (&col, &value) in row {
                inner.push(col);
                data.push(value);
            }
            outer.push(inner.len() as Index);
        }

        Ok(HeapAllocator::from_parts(data, outer, inner))
    }
}

impl Allocator for RowMapAllocator {
    fn allocate(&mut self, shape: &mut Shape) -> Result<Layout> {
        *shape = Shape::new(self.rows.len(), self.cols, self.nnz());
        let arrays = match self.arrays.take() {
            Some(arrays) => arrays,
            None => self.build()?,
        };
        Ok(self.arrays.insert(arrays).layout())
    }

    fn deallocate(&mut self, _layout: Layout, _shape: Shape) {
        self.arrays = None;
    }

    fn in_shared_memory(&self) -> bool {
        false
    }

    fn is_mutable(&self) -> bool {
        false
    }
}

impl fmt::Display for RowMapAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RowMapAllocator[rows={},cols={}]", self.rows.len(), self.cols)
    }
}
