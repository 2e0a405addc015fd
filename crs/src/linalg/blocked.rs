//! Cache-blocked serial backend
//!
//! Dense kernels walk tiles of `block_size` rows and columns so the working
//! set of `A` stays in cache. Operations without a blocked kernel are
//! forwarded to a fallback backend.

use std::fmt;
use std::sync::Arc;

use crs_core::Scalar;
use tracing::debug;

use super::generic::spmv_into;
use super::{checks, Generic, LinearAlgebra, BLOCKED};
use crate::config::LinalgConfig;
use crate::dense::{Matrix, Vector};
use crate::{Result, SparseMatrix};

pub struct Blocked {
    block_size: usize,
    fallback: Arc<dyn LinearAlgebra>,
}

impl Blocked {
    pub fn new(block_size: usize, fallback: Arc<dyn LinearAlgebra>) -> Self {
        Self {
            block_size: block_size.max(1),
            fallback,
        }
    }

    pub fn from_config(config: &LinalgConfig) -> Self {
        Self::new(config.block_size, Arc::new(Generic))
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Backend receiving the operations this one forwards
    pub fn fallback(&self) -> &dyn LinearAlgebra {
        self.fallback.as_ref()
    }
}

impl Default for Blocked {
    fn default() -> Self {
        Self::from_config(&LinalgConfig::default())
    }
}

impl fmt::Debug for Blocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blocked")
            .field("block_size", &self.block_size)
            .field("fallback", &self.fallback.name())
            .finish()
    }
}

/// Start and end of each tile along an axis of `len` elements
fn tiles(len: usize, size: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..len).step_by(size).map(move |start| (start, (start + size).min(len)))
}

impl LinearAlgebra for Blocked {
    fn name(&self) -> &str {
        BLOCKED
    }

    fn dot(&self, x: &Vector<'_>, y: &Vector<'_>) -> Result<Scalar> {
        checks::dot(x, y)?;
        let (x, y) = (x.as_slice(), y.as_slice());

        let mut acc = [0.0; 4];
        let xs = x.chunks_exact(4);
        let ys = y.chunks_exact(4);
        let tail: Scalar = xs
            .remainder()
            .iter()
            .zip(ys.remainder())
            .map(|(a, b)| a * b)
            .sum();
        for (a, b) in xs.zip(ys) {
            for i in 0..4 {
                acc[i] += a[i] * b[i];
            }
        }

        Ok((acc[0] + acc[1]) + (acc[2] + acc[3]) + tail)
    }

    fn gemv(&self, a: &Matrix<'_>, x: &Vector<'_>, y: &mut Vector<'_>) -> Result<()> {
        checks::gemv(a, x, y)?;
        let (rows, values) = (a.rows(), a.as_slice());
        let y = y.as_mut_slice();
        y.fill(0.0);

        for (r0, r1) in tiles(rows, self.block_size) {
            for (c0, c1) in tiles(a.cols(), self.block_size) {
                for c in c0..c1 {
                    let xc = x[c];
                    let column = &values[c * rows..(c + 1) * rows];
                    for r in r0..r1 {
                        y[r] += column[r] * xc;
                    }
                }
            }
        }
        Ok(())
    }

    fn gemm(&self, a: &Matrix<'_>, b: &Matrix<'_>, c: &mut Matrix<'_>) -> Result<()> {
        checks::gemm(a, b, c)?;
        let (m, n, depth) = (c.rows(), c.cols(), a.cols());
        let values = a.as_slice();
        let out = c.as_mut_slice();
        out.fill(0.0);

        for (j0, j1) in tiles(n, self.block_size) {
            for (k0, k1) in tiles(depth, self.block_size) {
                for (i0, i1) in tiles(m, self.block_size) {
                    for j in j0..j1 {
                        for k in k0..k1 {
                            let bkj = b[(k, j)];
                            let column = &values[k * m..(k + 1) * m];
                            for i in i0..i1 {
                                out[j * m + i] += column[i] * bkj;
                            }
                        }
                    }
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

    /// Walks the rows of `A` once per tile of output columns
    fn spmm(&self, a: &SparseMatrix, b: &Matrix<'_>, c: &mut Matrix<'_>) -> Result<()> {
        checks::spmm(a, b, c)?;
        let (data, outer, inner) = (a.data(), a.outer(), a.inner());
        let (m, k_len) = (c.rows(), b.rows());
        let b_values = b.as_slice();
        let out = c.as_mut_slice();

        for (j0, j1) in tiles(b.cols(), self.block_size) {
            for r in 0..m {
                let (start, end) = (outer[r] as usize, outer[r + 1] as usize);
                for j in j0..j1 {
                    let b_col = &b_values[j * k_len..(j + 1) * k_len];
                    out[j * m + r] = data[start..end]
                        .iter()
                        .zip(&inner[start..end])
                        .map(|(&v, &col)| v * b_col[col as usize])
                        .sum();
                }
            }
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
        debug!(fallback = self.fallback.name(), "blocked backend forwards dsptd");
        self.fallback.dsptd(x, a, y, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_tiles() {
        assert_eq!(tiles(5, 2).collect::<Vec<_>>(), vec![(0, 2), (2, 4), (4, 5)]);
        assert_eq!(tiles(0, 3).count(), 0);
    }

    #[test]
    fn test_dot_with_remainder() {
        let x = Vector::from((1..=7).map(f64::from).collect::<Vec<_>>());
        assert_eq!(Blocked::default().dot(&x, &x).unwrap(), 140.0);
    }

    #[test]
    fn test_gemm_across_tiles() {
        let blocked = Blocked::new(2, Arc::new(Generic));
        let a = Matrix::from_row_major(3, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]).unwrap();
        let identity = Matrix::from_row_major(3, 3, &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]).unwrap();
        let mut c = Matrix::new(3, 3);
        blocked.gemm(&a, &identity, &mut c).unwrap();
        assert_eq!(c, a);
    }

    struct NoDsptd;

    impl LinearAlgebra for NoDsptd {
        fn name(&self) -> &str {
            "no-dsptd"
        }
        fn dot(&self, _: &Vector<'_>, _: &Vector<'_>) -> Result<Scalar> {
            Ok(0.0)
        }
        fn gemv(&self, _: &Matrix<'_>, _: &Vector<'_>, _: &mut Vector<'_>) -> Result<()> {
            Ok(())
        }
        fn gemm(&self, _: &Matrix<'_>, _: &Matrix<'_>, _: &mut Matrix<'_>) -> Result<()> {
            Ok(())
        }
        fn spmv(&self, _: &SparseMatrix, _: &Vector<'_>, _: &mut Vector<'_>) -> Result<()> {
            Ok(())
        }
        fn spmm(&self, _: &SparseMatrix, _: &Matrix<'_>, _: &mut Matrix<'_>) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_dsptd_is_forwarded() {
        let blocked = Blocked::new(8, Arc::new(NoDsptd));
        let a = SparseMatrix::identity(2, 2).unwrap();
        let x = Vector::new(2);
        let mut b = SparseMatrix::default();

        let err = blocked.dsptd(&x, &a, &x, &mut b).unwrap_err();
        assert!(matches!(
            err,
            Error::Unimplemented { ref backend, op: "dsptd" } if backend == "no-dsptd"
        ));
    }
}
