//! Serial reference backend

use crs_core::{Index, Scalar};

use super::{checks, LinearAlgebra, GENERIC};
use crate::dense::{Matrix, Vector};
use crate::{Result, SparseMatrix};

/// Straightforward single-threaded kernels; the reference the other
/// backends are tested against
#[derive(Debug, Default, Clone, Copy)]
pub struct Generic;

/// `y[r] = Σ A[r, c] x[c]` over the stored entries of row `r`
pub(crate) fn sparse_row_dot(
    data: &[Scalar],
    inner: &[Index],
    start: usize,
    end: usize,
    x: &[Scalar],
) -> Scalar {
    data[start..end]
        .iter()
        .zip(&inner[start..end])
        .map(|(&v, &c)| v * x[c as usize])
        .sum()
}

pub(crate) fn spmv_into(a: &SparseMatrix, x: &[Scalar], y: &mut [Scalar]) {
    let (data, outer, inner) = (a.data(), a.outer(), a.inner());
    for (r, yr) in y.iter_mut().enumerate() {
        *yr = sparse_row_dot(data, inner, outer[r] as usize, outer[r + 1] as usize, x);
    }
}

/// Multiply every stored value of row `r` by `x[r] * y[col]`
pub(crate) fn scale_row(
    values: &mut [Scalar],
    cols: &[Index],
    xr: Scalar,
    y: &[Scalar],
) {
    for (v, &c) in values.iter_mut().zip(cols) {
        *v *= xr * y[c as usize];
    }
}

impl LinearAlgebra for Generic {
    fn name(&self) -> &str {
        GENERIC
    }

    fn dot(&self, x: &Vector<'_>, y: &Vector<'_>) -> Result<Scalar> {
        checks::dot(x, y)?;
        Ok(x.iter().zip(y.iter()).map(|(a, b)| a * b).sum())
    }

    fn gemv(&self, a: &Matrix<'_>, x: &Vector<'_>, y: &mut Vector<'_>) -> Result<()> {
        checks::gemv(a, x, y)?;
        let y = y.as_mut_slice();
        y.fill(0.0);
        for c in 0..a.cols() {
            let xc = x[c];
            for (yr, &v) in y.iter_mut().zip(a.col(c)) {
                *yr += v * xc;
            }
        }
        Ok(())
    }

    fn gemm(&self, a: &Matrix<'_>, b: &Matrix<'_>, c: &mut Matrix<'_>) -> Result<()> {
        checks::gemm(a, b, c)?;
        for j in 0..c.cols() {
            let cj = c.col_mut(j);
            cj.fill(0.0);
            for k in 0..a.cols() {
                let bkj = b[(k, j)];
                for (ci, &v) in cj.iter_mut().zip(a.col(k)) {
                    *ci += v * bkj;
                }
            }
        }
        Ok(())
    }

    fn spmv(&self, a: &SparseMatrix, x: &Vector<'_>, y: &mut Vector<'_>) -> Result<()> {
        checks::spmv(a, x, y)?;
        spmv_into(a, x.as_slice(), y.as_mut_slice());
        Ok(())
    }

    fn spmm(&self, a: &SparseMatrix, b: &Matrix<'_>, c: &mut Matrix<'_>) -> Result<()> {
        checks::spmm(a, b, c)?;
        for j in 0..c.cols() {
            spmv_into(a, b.col(j), c.col_mut(j));
        }
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
        let (data, outer, inner) = t.arrays_mut();
        for (r, bounds) in outer.windows(2).enumerate() {
            let (start, end) = (bounds[0] as usize, bounds[1] as usize);
            scale_row(&mut data[start..end], &inner[start..end], x[r], y.as_slice());
        }

        b.swap(&mut t);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crs_core::Triplet;

    fn a3() -> SparseMatrix {
        SparseMatrix::from_triplets(
            3,
            3,
            &[
                Triplet::new(0, 0, 2.0),
                Triplet::new(0, 2, -3.0),
                Triplet::new(1, 1, 2.0),
                Triplet::new(2, 2, 2.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_dot() {
        let x = Vector::from(vec![1.0, 2.0, 3.0]);
        assert_eq!(Generic.dot(&x, &x).unwrap(), 14.0);
        assert!(matches!(
            Generic.dot(&x, &Vector::new(2)),
            Err(Error::SizeMismatch { op: "dot", .. })
        ));
    }

    #[test]
    fn test_gemv_overwrites() {
        let a = Matrix::from_row_major(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let x = Vector::from(vec![1.0, 0.0, -1.0]);
        let mut y = Vector::from(vec![100.0, 100.0]);
        Generic.gemv(&a, &x, &mut y).unwrap();
        assert_eq!(y.as_slice(), &[-2.0, -2.0]);
    }

    #[test]
    fn test_gemm_overwrites() {
        let a = Matrix::from_row_major(2, 2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = Matrix::from_row_major(2, 1, &[1.0, 1.0]).unwrap();
        let mut c = Matrix::from_row_major(2, 1, &[9.0, 9.0]).unwrap();
        Generic.gemm(&a, &b, &mut c).unwrap();
        assert_eq!(c.as_slice(), &[3.0, 7.0]);
    }

    #[test]
    fn test_spmv() {
        let x = Vector::from(vec![1.0, 2.0, 3.0]);
        let mut y = Vector::new(3);
        Generic.spmv(&a3(), &x, &mut y).unwrap();
        assert_eq!(y.as_slice(), &[-7.0, 4.0, 6.0]);
    }

    #[test]
    fn test_spmv_identity_rectangular() {
        let x = Vector::from(vec![1.0, 2.0, 3.0]);

        let mut tall = Vector::new(6);
        Generic
            .spmv(&SparseMatrix::identity(6, 3).unwrap(), &x, &mut tall)
            .unwrap();
        assert_eq!(tall.as_slice(), &[1.0, 2.0, 3.0, 0.0, 0.0, 0.0]);

        let mut wide = Vector::new(2);
        Generic
            .spmv(&SparseMatrix::identity(2, 3).unwrap(), &x, &mut wide)
            .unwrap();
        assert_eq!(wide.as_slice(), &[1.0, 2.0]);
    }

    #[test]
    fn test_spmm() {
        let b = Matrix::from_row_major(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let mut c = Matrix::new(3, 2);
        Generic.spmm(&a3(), &b, &mut c).unwrap();
        assert_eq!(
            c,
            Matrix::from_row_major(3, 2, &[-13.0, -14.0, 6.0, 8.0, 10.0, 12.0]).unwrap()
        );
    }

    #[test]
    fn test_dsptd_square() {
        let x = Vector::from(vec![1.0, 2.0, 3.0]);
        let mut b = SparseMatrix::default();
        Generic.dsptd(&x, &a3(), &x, &mut b).unwrap();
        assert_eq!(b.outer(), &[0, 1, 2, 4]);
        assert_eq!(b.inner(), &[0, 1, 0, 2]);
        assert_eq!(b.data(), &[2.0, 8.0, -9.0, 18.0]);
    }

    #[test]
    fn test_dsptd_rectangular() {
        let a = SparseMatrix::from_triplets(
            2,
            3,
            &[
                Triplet::new(0, 0, 1.0),
                Triplet::new(0, 2, 2.0),
                Triplet::new(1, 0, 3.0),
                Triplet::new(1, 1, 4.0),
            ],
        )
        .unwrap();
        let x = Vector::from(vec![1.0, 2.0, 3.0]);
        let y = Vector::from(vec![1.0, 2.0]);
        let mut b = SparseMatrix::default();
        Generic.dsptd(&x, &a, &y, &mut b).unwrap();

        assert_eq!((b.rows(), b.cols()), (3, 2));
        assert_eq!(b.outer(), &[0, 2, 3, 4]);
        assert_eq!(b.inner(), &[0, 1, 1, 0]);
        assert_eq!(b.data(), &[1.0, 6.0, 16.0, 6.0]);

        let before = b.clone();
        assert!(Generic.dsptd(&y, &a, &x, &mut b).is_err());
        assert_eq!(b, before);
    }

    #[test]
    fn test_spmv_with_unsorted_columns() {
        let a = SparseMatrix::from_arrays(1, 3, vec![-3.0, 2.0], vec![0, 2], vec![2, 0]).unwrap();
        let x = Vector::from(vec![1.0, 2.0, 3.0]);
        let mut y = Vector::new(1);
        Generic.spmv(&a, &x, &mut y).unwrap();
        assert_eq!(y[0], -7.0);
    }
}
