//! Error types for CRS format operations

/// Errors raised while decoding or validating CRS data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrsError {
    /// Invalid header format
    InvalidHeader,
    /// Header written by an incompatible build (version, endianness or type sizes)
    UnsupportedFormat,
    /// Insufficient buffer space
    InsufficientBuffer,
    /// Array not aligned for its element type
    ArrayAlignment,
    /// Array size calculation would overflow
    ArraySizeOverflow,
    /// Column index out of bounds
    IndexOutOfBounds,
    /// Row offsets do not start at zero, decrease, or do not end at nnz
    MalformedOuter,
    /// Array lengths disagree with each other or with the header
    CorruptedData,
}

impl core::fmt::Display for CrsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            CrsError::InvalidHeader => "Invalid CRS header",
            CrsError::UnsupportedFormat => "Unsupported format version or type layout",
            CrsError::InsufficientBuffer => "Insufficient buffer space",
            CrsError::ArrayAlignment => "Array not aligned to element size",
            CrsError::ArraySizeOverflow => "Array size overflow",
            CrsError::IndexOutOfBounds => "Column index out of bounds",
            CrsError::MalformedOuter => "Malformed row offsets",
            CrsError::CorruptedData => "Array lengths are inconsistent",
        };
        write!(f, "{msg}")
    }
}

impl core::error::Error for CrsError {}

/// Result type for CRS format operations
pub type Result<T> = core::result::Result<T, CrsError>;
