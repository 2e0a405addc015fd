//! Numeric types shared by every CRS array

/// Value type stored in sparse and dense containers
pub type Scalar = f64;

/// Type of row offsets and column indices
pub type Index = i32;

/// Type of dimensions and counts
pub type Size = usize;
