//! Triplet to CRS assembly

use std::collections::BTreeSet;

use crs_core::{Index, Scalar, Shape, Size, Triplet};
use tracing::trace;

use super::{check_index_capacity, SparseMatrix};
use crate::allocator::HeapAllocator;
use crate::{Error, Result};

impl SparseMatrix {
    /// `rows x cols` matrix assembled from triplets, summing duplicates
    pub fn from_triplets(rows: Size, cols: Size, triplets: &[Triplet]) -> Result<Self> {
        let mut matrix = Self::new(rows, cols);
        matrix.set_from_triplets(triplets)?;
        Ok(matrix)
    }

    /// Replace the contents with the sum of `triplets`
    ///
    /// Each row stores the distinct columns it is referenced with, in
    /// ascending order. Triplets addressing the same position are added.
    /// Every triplet is bounds checked before the matrix is touched.
    pub fn set_from_triplets(&mut self, triplets: &[Triplet]) -> Result<()> {
        let (rows, cols) = self.check_assembly(triplets)?;

        let mut columns = vec![BTreeSet::new(); rows];
        for t in triplets {
            columns[t.row() as usize].insert(t.col());
        }

        let nnz = columns.iter().map(BTreeSet::len).sum();
        check_index_capacity(nnz)?;

        let mut outer = Vec::with_capacity(rows + 1);
        let mut inner = Vec::with_capacity(nnz);
        outer.push(0);
        for row in &columns {
            inner.extend(row.iter().copied());
            outer.push(inner.len() as Index);
        }

        let mut data = vec![0.0; nnz];
        for t in triplets {
            let r = t.row() as usize;
            let (start, end) = (outer[r] as usize, outer[r + 1] as usize);
            if let Ok(rank) = inner[start..end].binary_search(&t.col()) {
                data[start + rank] += t.value();
            }
        }

        trace!(rows, cols, nnz, triplets = triplets.len(), "assembled from triplets");
        self.install_heap(
            HeapAllocator::from_parts(data, outer, inner),
            Shape::new(rows, cols, nnz),
        );
        Ok(())
    }

    /// Same result as [`SparseMatrix::set_from_triplets`], computed by
    /// sorting a copy of the triplets and merging equal positions in a
    /// single pass
    pub fn assemble_from_triplets(&mut self, triplets: &[Triplet]) -> Result<()> {
        let (rows, cols) = self.check_assembly(triplets)?;

        let mut sorted = triplets.to_vec();
        sorted.sort_by(Triplet::cmp_position);

        let mut data: Vec<Scalar> = Vec::with_capacity(sorted.len());
        let mut inner: Vec<Index> = Vec::with_capacity(sorted.len());
        let mut outer: Vec<Index> = vec![0; rows + 1];
        let mut last = None;

        for t in &sorted {
            if last == Some(t.position()) {
                if let Some(value) = data.last_mut() {
                    *value += t.value();
                }
                continue;
            }
            last = Some(t.position());
            // start from +0.0 like set_from_triplets, so -0.0 is stored as 0.0
            data.push(0.0 + t.value());
            inner.push(t.col());
            outer[t.row() as usize + 1] += 1;
        }

        let nnz = data.len();
        check_index_capacity(nnz)?;
        for r in 0..rows {
            outer[r + 1] += outer[r];
        }

        self.install_heap(
            HeapAllocator::from_parts(data, outer, inner),
            Shape::new(rows, cols, nnz),
        );
        Ok(())
    }

    fn check_assembly(&self, triplets: &[Triplet]) -> Result<(Size, Size)> {
        let (rows, cols) = (self.rows(), self.cols());
        if !self.shape().has_dimensions() {
            return Err(Error::PreconditionViolation(format!(
                "assembly needs rows > 0 and cols > 0, matrix is {rows}x{cols}"
            )));
        }

        for t in triplets {
            if t.row() < 0 || t.row() as usize >= rows {
                return Err(Error::out_of_range("row", t.row() as i64, rows));
            }
            if t.col() < 0 || t.col() as usize >= cols {
                return Err(Error::out_of_range("column", t.col() as i64, cols));
            }
        }
        Ok((rows, cols))
    }
}
