use std::fmt;

use crs_core::{Index, Scalar, Shape};

use super::{Allocator, Layout};
use crate::Result;

/// Owned vector storage, the default allocator
#[derive(Debug, Default)]
pub struct HeapAllocator {
    data: Vec<Scalar>,
    outer: Vec<Index>,
    inner: Vec<Index>,
}

impl HeapAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero-filled arrays sized for `shape`
    pub fn with_shape(shape: &Shape) -> Self {
        Self {
            data: vec![0.0; shape.data_size()],
            outer: vec![0; shape.outer_size()],
            inner: vec![0; shape.inner_size()],
        }
    }

    /// Take ownership of already assembled arrays
    ///
    /// `allocate` with the matching shape returns these arrays unchanged.
    pub fn from_parts(data: Vec<Scalar>, outer: Vec<Index>, inner: Vec<Index>) -> Self {
        Self { data, outer, inner }
    }

    /// Pointers into the current vectors
    pub(crate) fn layout(&mut self) -> Layout {
        Layout {
            data: self.data.as_mut_ptr(),
            outer: self.outer.as_mut_ptr(),
            inner: self.inner.as_mut_ptr(),
        }
    }
}

fn fit<T: Copy>(values: &mut Vec<T>, len: usize, zero: T) {
    if values.len() != len {
        values.clear();
        values.resize(len, zero);
    }
}

impl Allocator for HeapAllocator {
    fn allocate(&mut self, shape: &mut Shape) -> Result<Layout> {
        fit(&mut self.data, shape.data_size(), 0.0);
        fit(&mut self.outer, shape.outer_size(), 0);
        fit(&mut self.inner, shape.inner_size(), 0);
        Ok(self.layout())
    }

    fn deallocate(&mut self, _layout: Layout, _shape: Shape) {
        self.data = Vec::new();
        self.outer = Vec::new();
        self.inner = Vec::new();
    }

    fn in_shared_memory(&self) -> bool {
        false
    }
}

impl fmt::Display for HeapAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HeapAllocator[]")
    }
}
