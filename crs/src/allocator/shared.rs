use std::fmt;
use std::sync::Arc;

use crs_core::{validate_structure, Index, Scalar, Shape, Size};

use super::{Allocator, Layout};
use crate::{Error, Result};

/// Read-only view over caller-supplied arrays
///
/// The arrays are reference counted, so any number of matrices can view the
/// same storage without copying and none of them outlives it.
#[derive(Debug, Clone)]
pub struct SharedAllocator {
    shape: Shape,
    data: Arc<[Scalar]>,
    outer: Arc<[Index]>,
    inner: Arc<[Index]>,
}

impl SharedAllocator {
    /// Wrap arrays describing a `rows x cols` matrix
    ///
    /// Fails with `InvariantViolation` unless the arrays satisfy the CRS
    /// structure. Columns within a row may appear in any order.
    pub fn new(
        rows: Size,
        cols: Size,
        data: Arc<[Scalar]>,
        outer: Arc<[Index]>,
        inner: Arc<[Index]>,
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

        Ok(Self {
            shape: Shape::new(rows, cols, data.len()),
            data,
            outer,
            inner,
        })
    }
}

impl Allocator for SharedAllocator {
    fn allocate(&mut self, shape: &mut Shape) -> Result<Layout> {
        *shape = self.shape;
        // Matrices never write through a layout from an immutable allocator.
        Ok(Layout {
            data: self.data.as_ptr().cast_mut(),
            outer: self.outer.as_ptr().cast_mut(),
            inner: self.inner.as_ptr().cast_mut(),
        })
    }

    fn deallocate(&mut self, _layout: Layout, _shape: Shape) {}

    fn in_shared_memory(&self) -> bool {
        false
    }

    fn is_mutable(&self) -> bool {
        false
    }
}

impl fmt::Display for SharedAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedAllocator[{}]", self.shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_its_shape() {
        let mut shared = SharedAllocator::new(
            2,
            3,
            Arc::from(vec![1.0, 2.0]),
            Arc::from(vec![0, 1, 2]),
            Arc::from(vec![2, 0]),
        )
        .unwrap();

        let mut shape = Shape::new(10, 10, 10);
        let layout = shared.allocate(&mut shape).unwrap();
        assert_eq!(shape, Shape::new(2, 3, 2));
        assert_eq!(layout.data.cast_const(), shared.data.as_ptr());
        assert!(!shared.is_mutable());
    }

    #[test]
    fn test_rejects_malformed_arrays() {
        let err = SharedAllocator::new(
            2,
            3,
            Arc::from(vec![1.0]),
            Arc::from(vec![0, 1, 2]),
            Arc::from(vec![2, 0]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));

        let err = SharedAllocator::new(
            2,
            3,
            Arc::from(vec![1.0, 2.0]),
            Arc::from(vec![0, 1, 2]),
            Arc::from(vec![3, 0]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
    }
}
