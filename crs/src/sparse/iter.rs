//! Iteration over stored entries

use std::iter::Zip;
use std::slice::Iter;

use crs_core::{Index, Scalar, Size};

use super::SparseMatrix;
use crate::{Error, Result};

/// A stored entry of a sparse matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub row: Size,
    pub col: Index,
    pub value: Scalar,
}

/// Entries in storage order, row by row; empty rows are skipped
pub struct Entries<'a> {
    outer: &'a [Index],
    inner: &'a [Index],
    data: &'a [Scalar],
    row: Size,
    pos: usize,
}

impl Iterator for Entries<'_> {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        if self.pos >= self.data.len() {
            return None;
        }
        // outer[rows] == nnz > pos, so this stops on a valid row
        while self.pos >= self.outer[self.row + 1] as usize {
            self.row += 1;
        }

        let entry = Entry {
            row: self.row,
            col: self.inner[self.pos],
            value: self.data[self.pos],
        };
        self.pos += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.data.len() - self.pos;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Entries<'_> {}

impl SparseMatrix {
    pub fn iter(&self) -> Entries<'_> {
        Entries {
            outer: self.outer(),
            inner: self.inner(),
            data: self.data(),
            row: 0,
            pos: 0,
        }
    }

    /// `(column, value)` pairs of one row
    pub fn row(&self, row: Size) -> Result<Zip<Iter<'_, Index>, Iter<'_, Scalar>>> {
        if row >= self.rows() {
            return Err(Error::out_of_range("row", row as i64, self.rows()));
        }
        let (start, end) = self.row_bounds(row);
        Ok(self.inner()[start..end].iter().zip(&self.data()[start..end]))
    }
}

impl<'a> IntoIterator for &'a SparseMatrix {
    type Item = Entry;
    type IntoIter = Entries<'a>;

    fn into_iter(self) -> Entries<'a> {
        self.iter()
    }
}
