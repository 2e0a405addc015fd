//! Shared-memory parallel backend on the rayon thread pool
//!
//! Work is split by output row (or output column for column-major
//! results), so every output element is written by exactly one task.

use crs_core::{Index, Scalar};
use rayon::prelude::*;

use super::generic::{scale_row, sparse_row_dot};
use super::{checks, LinearAlgebra, PARALLEL};
use crate::config::LinalgConfig;
use crate::dense::{Matrix, Vector};
use crate::{Result, SparseMatrix};

#[derive(Debug, Clone, Copy)]
pub struct Parallel {
    min_len: usize,
}

impl Parallel {
    /// `min_len` is the smallest number of rows handed to one task
    pub fn new(min_len: usize) -> Self {
        Self {
            min_len: min_len.max(1),
        }
    }

    pub fn from_config(config: &LinalgConfig) -> Self {
        Self::new(config.parallel_min_len)
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    fn spmv_into(&self, a: &SparseMatrix, x: &[Scalar], y: &mut [Scalar]) {
        let (data, outer, inner) = (a.data(), a.outer(), a.inner());
        y.par_iter_mut()
            .enumerate()
            .with_min_len(self.min_len)
            .for_each(|(r, yr)| {
                *yr = sparse_row_dot(data, inner, outer[r] as usize, outer[r + 1] as usize, x);
            });
    }
}

impl Default for Parallel {
    fn default() -> Self {
        Self::from_config(&LinalgConfig::default())
    }
}

/// Split `data` into one mutable slice per row
fn split_rows_mut<'a>(mut data: &'a mut [Scalar], outer: &[Index]) -> Vec<&'a mut [Scalar]> {
    let mut rows = Vec::with_capacity(outer.len().saturating_sub(1));
    for bounds in outer.windows(2) {
        let len = (bounds[1] - bounds[0]) as usize;
        let (row, rest) = std::mem::take(&mut data).split_at_mut(len);
        rows.push(row);
        data = rest;
    }
    rows
}

impl LinearAlgebra for Parallel {
    fn name(&self) -> &str {
        PARALLEL
    }

    fn dot(&self, x: &Vector<'_>, y: &Vector<'_>) -> Result<Scalar> {
        checks::dot(x, y)?;
        Ok(x.as_slice()
            .par_iter()
            .zip(y.as_slice().par_iter())
            .with_min_len(self.min_len)
            .map(|(a, b)| a * b)
            .sum())
    }

    fn gemv(&self, a: &Matrix<'_>, x: &Vector<'_>, y: &mut Vector<'_>) -> Result<()> {
        checks::gemv(a, x, y)?;
        let (rows, values, x) = (a.rows(), a.as_slice(), x.as_slice());
        y.as_mut_slice()
            .par_iter_mut()
            .enumerate()
            .with_min_len(self.min_len)
            .for_each(|(r, yr)| {
                *yr = x
                    .iter()
                    .enumerate()
                    .map(|(c, &xc)| values[c * rows + r] * xc)
                    .sum();
            });
        Ok(())
    }

    fn gemm(&self, a: &Matrix<'_>, b: &Matrix<'_>, c: &mut Matrix<'_>) -> Result<()> {
        checks::gemm(a, b, c)?;
        let rows = c.rows().max(1);
        c.as_mut_slice()
            .par_chunks_mut(rows)
            .enumerate()
            .for_each(|(j, cj)| {
                cj.fill(0.0);
                for k in 0..a.cols() {
                    let bkj = b[(k, j)];
                    for (ci, &v) in cj.iter_mut().zip(a.col(k)) {
                        *ci += v * bkj;
                    }
                }
            });
        Ok(())
    }

    fn spmv(&self, a: &SparseMatrix, x: &Vector<'_>, y: &mut Vector<'_>) -> Result<()> {
        checks::spmv(a, x, y)?;
        self.spmv_into(a, x.as_slice(), y.as_mut_slice());
        Ok(())
    }

    fn spmm(&self, a: &SparseMatrix, b: &Matrix<'_>, c: &mut Matrix<'_>) -> Result<()> {
        checks::spmm(a, b, c)?;
        let (data, outer, inner) = (a.data(), a.outer(), a.inner());
        let rows = c.rows().max(1);
        c.as_mut_slice()
            .par_chunks_mut(rows)
            .enumerate()
            .for_each(|(j, cj)| {
                let bj = b.col(j);
                for (r, cr) in cj.iter_mut().enumerate() {
                    *cr = sparse_row_dot(data, inner, outer[r] as usize, outer[r + 1] as usize, bj);
                }
            });
        Ok(())
    }

    fn dsptd(
        &self,
        x: &Vector<'_>,
        a: &SparseMatrix,
        y: &Vector<'_>,
        b: &mut SparseMatrix,
    ) -> Result<()> {
        checks::dsptd(x, a, y)?;

        let mut t = a.transposed();
        let (x, y) = (x.as_slice(), y.as_slice());
        {
            let (data, outer, inner) = t.arrays_mut();
            let (outer, inner): (&[Index], &[Index]) = (outer, inner);
            split_rows_mut(data, outer)
                .into_par_iter()
                .enumerate()
                .with_min_len(self.min_len)
                .for_each(|(r, values)| {
                    let start = outer[r] as usize;
                    scale_row(values, &inner[start..start + values.len()], x[r], y);
                });
        }

        b.swap(&mut t);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::Generic;
    use crs_core::Triplet;

    #[test]
    fn test_split_rows_mut() {
        let mut data = [1.0, 2.0, 3.0, 4.0];
        let rows = split_rows_mut(&mut data, &[0, 2, 2, 4]);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], &[1.0, 2.0]);
        assert!(rows[1].is_empty());
        assert_eq!(rows[2], &[3.0, 4.0]);
    }

    #[test]
    fn test_small_tasks_match_generic() {
        let parallel = Parallel::new(1);
        let a = SparseMatrix::from_triplets(
            3,
            3,
            &[
                Triplet::new(0, 0, 2.0),
                Triplet::new(0, 2, -3.0),
                Triplet::new(1, 1, 2.0),
                Triplet::new(2, 2, 2.0),
            ],
        )
        .unwrap();
        let x = Vector::from(vec![1.0, 2.0, 3.0]);

        let mut y = Vector::new(3);
        parallel.spmv(&a, &x, &mut y).unwrap();
        assert_eq!(y.as_slice(), &[-7.0, 4.0, 6.0]);

        let mut expected = SparseMatrix::default();
        Generic.dsptd(&x, &a, &x, &mut expected).unwrap();
        let mut b = SparseMatrix::default();
        parallel.dsptd(&x, &a, &x, &mut b).unwrap();
        assert_eq!(b, expected);
    }

    #[test]
    fn test_empty_operands() {
        let parallel = Parallel::default();
        let a = SparseMatrix::new(0, 0);
        let mut y = Vector::new(0);
        parallel.spmv(&a, &Vector::new(0), &mut y).unwrap();

        let mut c = Matrix::new(0, 3);
        parallel.gemm(&Matrix::new(0, 2), &Matrix::new(2, 3), &mut c).unwrap();
        assert_eq!(parallel.dot(&Vector::new(0), &Vector::new(0)).unwrap(), 0.0);
    }
}
