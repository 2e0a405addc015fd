//! Operand size checks shared by every backend

use crate::dense::{Matrix, Vector};
use crate::{Error, Result, SparseMatrix};

pub(crate) fn dot(x: &Vector<'_>, y: &Vector<'_>) -> Result<()> {
    if x.size() != y.size() {
        return Err(Error::size_mismatch(
            "dot",
            format!("x has {} entries, y has {}", x.size(), y.size()),
        ));
    }
    Ok(())
}

fn matrix_vector(
    op: &'static str,
    rows: usize,
    cols: usize,
    x: &Vector<'_>,
    y: &Vector<'_>,
) -> Result<()> {
    if x.size() != cols || y.size() != rows {
        return Err(Error::size_mismatch(
            op,
            format!(
                "A is {rows}x{cols}, x has {} entries, y has {}",
                x.size(),
                y.size()
            ),
        ));
    }
    Ok(())
}

fn matrix_matrix(
    op: &'static str,
    a: (usize, usize),
    b: (usize, usize),
    c: (usize, usize),
) -> Result<()> {
    if a.1 != b.0 || a.0 != c.0 || b.1 != c.1 {
        return Err(Error::size_mismatch(
            op,
            format!(
                "A is {}x{}, B is {}x{}, C is {}x{}",
                a.0, a.1, b.0, b.1, c.0, c.1
            ),
        ));
    }
    Ok(())
}

pub(crate) fn gemv(a: &Matrix<'_>, x: &Vector<'_>, y: &Vector<'_>) -> Result<()> {
    matrix_vector("gemv", a.rows(), a.cols(), x, y)
}

pub(crate) fn spmv(a: &SparseMatrix, x: &Vector<'_>, y: &Vector<'_>) -> Result<()> {
    matrix_vector("spmv", a.rows(), a.cols(), x, y)
}

pub(crate) fn gemm(a: &Matrix<'_>, b: &Matrix<'_>, c: &Matrix<'_>) -> Result<()> {
    matrix_matrix(
        "gemm",
        (a.rows(), a.cols()),
        (b.rows(), b.cols()),
        (c.rows(), c.cols()),
    )
}

pub(crate) fn spmm(a: &SparseMatrix, b: &Matrix<'_>, c: &Matrix<'_>) -> Result<()> {
    matrix_matrix(
        "spmm",
        (a.rows(), a.cols()),
        (b.rows(), b.cols()),
        (c.rows(), c.cols()),
    )
}

pub(crate) fn dsptd(x: &Vector<'_>, a: &SparseMatrix, y: &Vector<'_>) -> Result<()> {
    if x.size() != a.cols() || y.size() != a.rows() {
        return Err(Error::size_mismatch(
            "dsptd",
            format!(
                "A is {}x{}, x has {} entries (needs {}), y has {} (needs {})",
                a.rows(),
                a.cols(),
                x.size(),
                a.cols(),
                y.size(),
                a.rows()
            ),
        ));
    }
    Ok(())
}
