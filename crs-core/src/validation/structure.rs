//! Structural invariants of CRS arrays

use crate::{CrsError, Index, Size};

/// Check that `outer` and `inner` describe a valid `rows x cols` matrix
///
/// Requires `outer.len() == rows + 1`, `inner.len() == nnz`, `outer[0] == 0`,
/// `outer[rows] == nnz`, non-decreasing offsets and every column index in
/// `0..cols`. Ordering of columns inside a row is not checked.
pub fn validate_structure(
    rows: Size,
    cols: Size,
    nnz: Size,
    outer: &[Index],
    inner: &[Index],
) -> Result<(), CrsError> {
    if outer.len() != rows + 1 || inner.len() != nnz {
        return Err(CrsError::CorruptedData);
    }

    if outer[0] != 0 || outer[rows] as i64 != nnz as i64 {
        return Err(CrsError::MalformedOuter);
    }
    if outer.windows(2).any(|w| w[0] > w[1]) {
        return Err(CrsError::MalformedOuter);
    }

    if inner.iter().any(|&c| c < 0 || c as i64 >= cols as i64) {
        return Err(CrsError::IndexOutOfBounds);
    }

    Ok(())
}

/// True when column indices strictly increase within every row
///
/// Assumes the arrays already passed [`validate_structure`].
pub fn has_sorted_indices(outer: &[Index], inner: &[Index]) -> bool {
    outer.windows(2).all(|w| {
        let row = &inner[w[0] as usize..w[1] as usize];
        row.windows(2).all(|pair| pair[0] < pair[1])
    })
}
