//! Coordinate input records for CRS assembly

use core::cmp::Ordering;

use crate::types::{Index, Scalar};

/// A single `(row, col, value)` contribution
///
/// Triplets addressing the same position are summed on assembly.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triplet {
    row: Index,
    col: Index,
    value: Scalar,
}

impl Triplet {
    pub const fn new(row: Index, col: Index, value: Scalar) -> Self {
        Self { row, col, value }
    }

    pub const fn row(&self) -> Index {
        self.row
    }

    pub const fn col(&self) -> Index {
        self.col
    }

    pub const fn value(&self) -> Scalar {
        self.value
    }

    /// `(row, col)` key, the order triplets are assembled in
    pub const fn position(&self) -> (Index, Index) {
        (self.row, self.col)
    }

    /// Compare by position only, ignoring the value
    pub fn cmp_position(&self, other: &Self) -> Ordering {
        self.position().cmp(&other.position())
    }
}

impl From<(Index, Index, Scalar)> for Triplet {
    fn from((row, col, value): (Index, Index, Scalar)) -> Self {
        Self::new(row, col, value)
    }
}
