//! Header of a serialized CRS matrix
//!
//! The header is followed by three arrays in the order `data`, `outer`,
//! `inner`, each starting on an 8-byte boundary and stored in the byte
//! order of the writer.

use core::mem::size_of;

use super::constants::{endian, ALIGNMENT_BOUNDARY};
use crate::validation::align_to_boundary;
use crate::{CrsError, Index, Scalar, Shape};

/// Fixed-size header of a serialized CRS matrix (integers little-endian)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrsHeader {
    /// Magic bytes: "CRSM"
    pub magic: [u8; 4],
    /// Format version
    pub version: u8,
    /// Byte order of the arrays (see [`endian`])
    pub little_endian: u8,
    /// `size_of::<Index>()` of the writer
    pub index_size: u8,
    /// `size_of::<Scalar>()` of the writer
    pub scalar_size: u8,
    pub rows: u64,
    pub cols: u64,
    pub nnz: u64,
    /// Offset to the values array from the buffer start
    pub data_offset: u64,
    /// Size of the values array in bytes
    pub data_size: u64,
    /// Offset to the row offsets array
    pub outer_offset: u64,
    /// Size of the row offsets array in bytes
    pub outer_size: u64,
    /// Offset to the column indices array
    pub inner_offset: u64,
    /// Size of the column indices array in bytes
    pub inner_size: u64,
    /// Reserved space for future extensions
    pub reserved: [u8; 24],
}

impl CrsHeader {
    /// Magic bytes for serialized CRS matrices
    pub const MAGIC: [u8; 4] = *b"CRSM";

    /// Current format version
    pub const VERSION: u8 = 1;

    /// Size of the header in bytes
    pub const SIZE: usize = size_of::<Self>();

    /// Header describing a matrix of the given shape written by this build,
    /// with arrays laid out back to back after the header
    pub const fn for_shape(shape: &Shape) -> Self {
        let data_offset = align_to_boundary(Self::SIZE, ALIGNMENT_BOUNDARY);
        let outer_offset = align_to_boundary(data_offset + shape.sizeof_data(), ALIGNMENT_BOUNDARY);
        let inner_offset =
            align_to_boundary(outer_offset + shape.sizeof_outer(), ALIGNMENT_BOUNDARY);

        Self {
            magic: Self::MAGIC,
            version: Self::VERSION,
            little_endian: endian::native(),
            index_size: size_of::<Index>() as u8,
            scalar_size: size_of::<Scalar>() as u8,
            rows: shape.rows as u64,
            cols: shape.cols as u64,
            nnz: shape.nnz as u64,
            data_offset: data_offset as u64,
            data_size: shape.sizeof_data() as u64,
            outer_offset: outer_offset as u64,
            outer_size: shape.sizeof_outer() as u64,
            inner_offset: inner_offset as u64,
            inner_size: shape.sizeof_inner() as u64,
            reserved: [0; 24],
        }
    }

    /// Shape recorded in the header
    pub const fn shape(&self) -> Shape {
        Shape::new(self.rows as usize, self.cols as usize, self.nnz as usize)
    }

    /// Bytes spanned by header and arrays
    pub const fn total_size(&self) -> u64 {
        self.inner_offset + self.inner_size
    }

    /// [`CrsHeader::total_size`] for headers read from untrusted bytes
    pub fn checked_total_size(&self) -> Result<u64, CrsError> {
        self.inner_offset
            .checked_add(self.inner_size)
            .ok_or(CrsError::ArraySizeOverflow)
    }

    /// Shape recorded in the header, rejecting counts this build cannot address
    pub fn checked_shape(&self) -> Result<Shape, CrsError> {
        let to_size = |v: u64| usize::try_from(v).map_err(|_| CrsError::ArraySizeOverflow);
        let shape = Shape::new(to_size(self.rows)?, to_size(self.cols)?, to_size(self.nnz)?);
        // outer stores offsets up to nnz as Index
        if shape.nnz > Index::MAX as usize {
            return Err(CrsError::ArraySizeOverflow);
        }
        Ok(shape)
    }

    /// Check that the arrays can be read in place by this build
    ///
    /// Array sizes must match the recorded shape and the arrays must follow
    /// the header in the order data, outer, inner without overlapping.
    pub fn check_compatible(&self) -> Result<(), CrsError> {
        if self.version > Self::VERSION
            || self.little_endian != endian::native()
            || self.index_size as usize != size_of::<Index>()
            || self.scalar_size as usize != size_of::<Scalar>()
        {
            return Err(CrsError::UnsupportedFormat);
        }

        let shape = self.checked_shape()?;
        let sizes = [
            shape.checked_sizeof_data(),
            shape.checked_sizeof_outer(),
            shape.checked_sizeof_inner(),
        ];
        let mut expected = [0u64; 3];
        for (slot, size) in expected.iter_mut().zip(sizes) {
            *slot = size.ok_or(CrsError::ArraySizeOverflow)? as u64;
        }
        if [self.data_size, self.outer_size, self.inner_size] != expected {
            return Err(CrsError::CorruptedData);
        }

        let data_end = self
            .data_offset
            .checked_add(self.data_size)
            .ok_or(CrsError::ArraySizeOverflow)?;
        let outer_end = self
            .outer_offset
            .checked_add(self.outer_size)
            .ok_or(CrsError::ArraySizeOverflow)?;
        self.checked_total_size()?;
        if self.data_offset < Self::SIZE as u64
            || self.outer_offset < data_end
            || self.inner_offset < outer_end
        {
            return Err(CrsError::CorruptedData);
        }

        Ok(())
    }

    /// Parse header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CrsError> {
        if bytes.len() < Self::SIZE {
            return Err(CrsError::InsufficientBuffer);
        }

        if bytes[0..4] != Self::MAGIC {
            return Err(CrsError::InvalidHeader);
        }

        let mut reserved = [0u8; 24];
        reserved.copy_from_slice(&bytes[80..104]);

        Ok(Self {
            magic: Self::MAGIC,
            version: bytes[4],
            little_endian: bytes[5],
            index_size: bytes[6],
            scalar_size: bytes[7],
            rows: read_u64(bytes, 8),
            cols: read_u64(bytes, 16),
            nnz: read_u64(bytes, 24),
            data_offset: read_u64(bytes, 32),
            data_size: read_u64(bytes, 40),
            outer_offset: read_u64(bytes, 48),
            outer_size: read_u64(bytes, 56),
            inner_offset: read_u64(bytes, 64),
            inner_size: read_u64(bytes, 72),
            reserved,
        })
    }

    /// Convert header to bytes array (no-std compatible)
    pub fn to_bytes_array(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];

        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes[5] = self.little_endian;
        bytes[6] = self.index_size;
        bytes[7] = self.scalar_size;

        let fields = [
            self.rows,
            self.cols,
            self.nnz,
            self.data_offset,
            self.data_size,
            self.outer_offset,
            self.outer_size,
            self.inner_offset,
            self.inner_size,
        ];
        for (i, field) in fields.iter().enumerate() {
            let start = 8 + i * 8;
            bytes[start..start + 8].copy_from_slice(&field.to_le_bytes());
        }

        bytes[80..104].copy_from_slice(&self.reserved);
        bytes
    }

    /// Convert header to bytes (requires alloc feature)
    #[cfg(feature = "alloc")]
    pub fn to_bytes(&self) -> alloc::vec::Vec<u8> {
        self.to_bytes_array().to_vec()
    }
}

impl Default for CrsHeader {
    fn default() -> Self {
        Self::for_shape(&Shape::default())
    }
}

fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_size() {
        assert_eq!(CrsHeader::SIZE, 104);
    }

    #[test]
    fn test_layout_offsets() {
        // 3x3 with 4 non-zeros: 32 bytes data, 16 bytes outer, 16 bytes inner
        let header = CrsHeader::for_shape(&Shape::new(3, 3, 4));
        assert_eq!(header.data_offset, 104);
        assert_eq!(header.data_size, 32);
        assert_eq!(header.outer_offset, 136);
        assert_eq!(header.outer_size, 16);
        assert_eq!(header.inner_offset, 152);
        assert_eq!(header.total_size(), 168);
        assert_eq!(header.check_compatible(), Ok(()));
    }

    #[test]
    fn test_unaligned_arrays_are_padded() {
        // 2 rows -> 12 byte outer array, inner must start on the next boundary
        let header = CrsHeader::for_shape(&Shape::new(2, 5, 1));
        assert_eq!(header.outer_offset, 112);
        assert_eq!(header.inner_offset, 128);
    }

    #[test]
    fn test_bytes_conversion() {
        let header = CrsHeader::for_shape(&Shape::new(6, 6, 2));
        let bytes = header.to_bytes_array();
        assert_eq!(&bytes[0..4], b"CRSM");
        assert_eq!(CrsHeader::from_bytes(&bytes), Ok(header));
    }

    #[test]
    fn test_rejects_bad_input() {
        let bytes = CrsHeader::default().to_bytes_array();
        assert_eq!(
            CrsHeader::from_bytes(&bytes[..50]),
            Err(CrsError::InsufficientBuffer)
        );

        let mut corrupted = bytes;
        corrupted[0] = b'X';
        assert_eq!(
            CrsHeader::from_bytes(&corrupted),
            Err(CrsError::InvalidHeader)
        );
    }

    #[test]
    fn test_incompatible_writer() {
        let mut header = CrsHeader::for_shape(&Shape::new(2, 2, 2));
        header.index_size = 8;
        assert_eq!(header.check_compatible(), Err(CrsError::UnsupportedFormat));

        let mut header = CrsHeader::for_shape(&Shape::new(2, 2, 2));
        header.little_endian ^= 1;
        assert_eq!(header.check_compatible(), Err(CrsError::UnsupportedFormat));

        let mut header = CrsHeader::for_shape(&Shape::new(2, 2, 2));
        header.data_size += 8;
        assert_eq!(header.check_compatible(), Err(CrsError::CorruptedData));
    }

    #[test]
    fn test_oversized_counts() {
        let mut header = CrsHeader::for_shape(&Shape::new(2, 2, 2));
        header.rows = u64::MAX;
        assert_eq!(header.check_compatible(), Err(CrsError::ArraySizeOverflow));

        let mut header = CrsHeader::for_shape(&Shape::new(2, 2, 2));
        header.nnz = 1 << 62;
        assert_eq!(header.check_compatible(), Err(CrsError::ArraySizeOverflow));

        let mut header = CrsHeader::for_shape(&Shape::new(2, 2, 2));
        header.inner_offset = u64::MAX;
        assert_eq!(header.check_compatible(), Err(CrsError::ArraySizeOverflow));
    }

    #[test]
    fn test_overlapping_arrays() {
        let mut header = CrsHeader::for_shape(&Shape::new(2, 2, 2));
        header.outer_offset = header.data_offset;
        assert_eq!(header.check_compatible(), Err(CrsError::CorruptedData));
    }
}
