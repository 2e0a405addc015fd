use std::ops::{Index, IndexMut};

use crs_core::{Scalar, Size};

use super::Storage;
use crate::{Error, Result};

/// Dense column-major matrix: element `(r, c)` lives at `c * rows + r`
#[derive(Debug, Clone)]
pub struct Matrix<'a> {
    rows: Size,
    cols: Size,
    storage: Storage<'a>,
}

impl Matrix<'static> {
    /// Zero-filled `rows x cols` matrix
    pub fn new(rows: Size, cols: Size) -> Self {
        Self {
            rows,
            cols,
            storage: Storage::Owned(vec![0.0; rows * cols]),
        }
    }

    pub fn from_col_major(rows: Size, cols: Size, values: Vec<Scalar>) -> Result<Self> {
        check_len(rows, cols, values.len())?;
        Ok(Self {
            rows,
            cols,
            storage: Storage::Owned(values),
        })
    }

    /// Build from values listed row by row
    pub fn from_row_major(rows: Size, cols: Size, values: &[Scalar]) -> Result<Self> {
        check_len(rows, cols, values.len())?;
        let mut matrix = Self::new(rows, cols);
        for (r, row) in values.chunks_exact(cols.max(1)).enumerate().take(rows) {
            for (c, &value) in row.iter().enumerate() {
                matrix[(r, c)] = value;
            }
        }
        Ok(matrix)
    }
}

impl<'a> Matrix<'a> {
    /// Read-only column-major view over caller memory, copied on first write
    pub fn view(rows: Size, cols: Size, values: &'a [Scalar]) -> Result<Self> {
        check_len(rows, cols, values.len())?;
        Ok(Self {
            rows,
            cols,
            storage: Storage::Shared(values),
        })
    }

    /// Writable column-major view over caller memory
    pub fn view_mut(rows: Size, cols: Size, values: &'a mut [Scalar]) -> Result<Self> {
        check_len(rows, cols, values.len())?;
        Ok(Self {
            rows,
            cols,
            storage: Storage::Exclusive(values),
        })
    }

    pub fn rows(&self) -> Size {
        self.rows
    }

    pub fn cols(&self) -> Size {
        self.cols
    }

    pub fn size(&self) -> Size {
        self.rows * self.cols
    }

    pub fn get(&self, row: Size, col: Size) -> Option<Scalar> {
        if row < self.rows && col < self.cols {
            Some(self.as_slice()[col * self.rows + row])
        } else {
            None
        }
    }

    pub fn col(&self, col: Size) -> &[Scalar] {
        &self.as_slice()[col * self.rows..(col + 1) * self.rows]
    }

    pub fn col_mut(&mut self, col: Size) -> &mut [Scalar] {
        let rows = self.rows;
        &mut self.as_mut_slice()[col * rows..(col + 1) * rows]
    }

    /// Values in column-major order
    pub fn as_slice(&self) -> &[Scalar] {
        self.storage.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [Scalar] {
        self.storage.as_mut_slice()
    }

    pub fn fill(&mut self, value: Scalar) {
        self.as_mut_slice().fill(value);
    }

    pub fn is_borrowed(&self) -> bool {
        self.storage.is_borrowed()
    }

    pub fn into_vec(self) -> Vec<Scalar> {
        self.storage.into_vec()
    }
}

impl Index<(Size, Size)> for Matrix<'_> {
    type Output = Scalar;

    fn index(&self, (row, col): (Size, Size)) -> &Scalar {
        assert!(row < self.rows && col < self.cols, "matrix index out of bounds");
        &self.as_slice()[col * self.rows + row]
    }
}

impl IndexMut<(Size, Size)> for Matrix<'_> {
    fn index_mut(&mut self, (row, col): (Size, Size)) -> &mut Scalar {
        assert!(row < self.rows && col < self.cols, "matrix index out of bounds");
        let rows = self.rows;
        &mut self.as_mut_slice()[col * rows + row]
    }
}

impl PartialEq for Matrix<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.as_slice() == other.as_slice()
    }
}

fn check_len(rows: Size, cols: Size, len: usize) -> Result<()> {
    if rows.checked_mul(cols) != Some(len) {
        return Err(Error::InvariantViolation(format!(
            "dense matrix {rows}x{cols} cannot hold {len} values"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_major_layout() {
        let m = Matrix::from_row_major(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(m.as_slice(), &[1.0, 3.0, 5.0, 2.0, 4.0, 6.0]);
        assert_eq!(m[(0, 1)], 2.0);
        assert_eq!(m.get(2, 0), Some(5.0));
        assert_eq!(m.get(3, 0), None);
        assert_eq!(m.col(1), &[2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            Matrix::from_col_major(2, 2, vec![1.0; 3]),
            Err(Error::InvariantViolation(_))
        ));
        assert!(Matrix::view(2, 3, &[0.0; 5]).is_err());
    }

    #[test]
    fn test_view_mut_writes_through() {
        let mut values = [0.0; 4];
        {
            let mut m = Matrix::view_mut(2, 2, &mut values).unwrap();
            m[(1, 0)] = 7.0;
            m.col_mut(1).fill(1.0);
        }
        assert_eq!(values, [0.0, 7.0, 1.0, 1.0]);
    }
}
