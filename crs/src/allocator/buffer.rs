use std::fmt;

use bytemuck::Pod;
use crs_core::{
    validate_structure, validation::cast_typed_slice, CrsError, CrsHeader, Index, Scalar, Shape,
};

use super::{Allocator, Layout};
use crate::Result;

/// Locate and validate the arrays of a serialized matrix inside `bytes`
///
/// Checks the header, that every array lies inside the buffer with the
/// alignment of its element type, and the CRS structure of the arrays.
pub(crate) fn map_arrays(bytes: &[u8]) -> Result<(Shape, Layout)> {
    let header = CrsHeader::from_bytes(bytes)?;
    header.check_compatible()?;
    if header.checked_total_size()? > bytes.len() as u64 {
        return Err(CrsError::InsufficientBuffer.into());
    }
    let shape = header.shape();

    let data = region::<Scalar>(bytes, header.data_offset, header.data_size)?;
    let outer = region::<Index>(bytes, header.outer_offset, header.outer_size)?;
    let inner = region::<Index>(bytes, header.inner_offset, header.inner_size)?;
    validate_structure(shape.rows, shape.cols, shape.nnz, outer, inner)?;

    // Arrays handed out by immutable allocators are never written through.
    let layout = Layout {
        data: data.as_ptr().cast_mut(),
        outer: outer.as_ptr().cast_mut(),
        inner: inner.as_ptr().cast_mut(),
    };
    Ok((shape, layout))
}

fn region<T: Pod>(bytes: &[u8], offset: u64, size: u64) -> Result<&[T]> {
    let start = usize::try_from(offset).map_err(|_| CrsError::ArraySizeOverflow)?;
    let len = usize::try_from(size).map_err(|_| CrsError::ArraySizeOverflow)?;
    let end = start
        .checked_add(len)
        .ok_or(CrsError::ArraySizeOverflow)?;
    let slice = bytes.get(start..end).ok_or(CrsError::InsufficientBuffer)?;

    Ok(cast_typed_slice::<T>(slice)?)
}

/// Private aligned copy of a serialized matrix
///
/// The arrays are used in place inside the copy, so loading costs one
/// `memcpy` and no per-element decoding.
#[derive(Debug, Clone)]
pub struct BufferAllocator {
    words: Vec<u64>,
    len: usize,
    shape: Shape,
}

impl BufferAllocator {
    pub fn new(bytes: &[u8]) -> Result<Self> {
        let mut words = vec![0u64; bytes.len().div_ceil(8)];
        bytemuck::cast_slice_mut::<u64, u8>(&mut words)[..bytes.len()].copy_from_slice(bytes);

        let mut allocator = Self {
            words,
            len: bytes.len(),
            shape: Shape::default(),
        };
        allocator.shape = map_arrays(allocator.bytes())?.0;
        Ok(allocator)
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    fn bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u64, u8>(&self.words)[..self.len]
    }
}

impl Allocator for BufferAllocator {
    fn allocate(&mut self, shape: &mut Shape) -> Result<Layout> {
        let (stored, layout) = map_arrays(self.bytes())?;
        *shape = stored;
        Ok(layout)
    }

    fn deallocate(&mut self, _layout: Layout, _shape: Shape) {}

    fn in_shared_memory(&self) -> bool {
        false
    }

    fn is_mutable(&self) -> bool {
        false
    }
}

impl fmt::Display for BufferAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BufferAllocator[bytes={}]", self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn serialized_identity() -> Vec<u8> {
        // 2x2 identity laid out by hand
        let shape = Shape::new(2, 2, 2);
        let header = CrsHeader::for_shape(&shape);
        let mut bytes = vec![0u8; header.total_size() as usize];
        bytes[..CrsHeader::SIZE].copy_from_slice(&header.to_bytes_array());

        let data: [Scalar; 2] = [1.0, 1.0];
        let outer: [Index; 3] = [0, 1, 2];
        let inner: [Index; 2] = [0, 1];
        let put = |bytes: &mut Vec<u8>, offset: u64, src: &[u8]| {
            let start = offset as usize;
            bytes[start..start + src.len()].copy_from_slice(src);
        };
        put(&mut bytes, header.data_offset, bytemuck::cast_slice(&data));
        put(&mut bytes, header.outer_offset, bytemuck::cast_slice(&outer));
        put(&mut bytes, header.inner_offset, bytemuck::cast_slice(&inner));
        bytes
    }

    #[test]
    fn test_maps_arrays() {
        let mut allocator = BufferAllocator::new(&serialized_identity()).unwrap();
        let mut shape = Shape::default();
        let layout = allocator.allocate(&mut shape).unwrap();

        assert_eq!(shape, Shape::new(2, 2, 2));
        assert!(!layout.is_null());
        assert!(!allocator.is_mutable());
    }

    #[test]
    fn test_truncated_buffer() {
        let bytes = serialized_identity();
        let err = BufferAllocator::new(&bytes[..bytes.len() - 4]).unwrap_err();
        assert!(matches!(err, Error::Format(CrsError::InsufficientBuffer)));
    }

    #[test]
    fn test_corrupted_offsets() {
        let mut bytes = serialized_identity();
        let outer_offset = CrsHeader::from_bytes(&bytes).unwrap().outer_offset as usize;
        // outer becomes [0, 5, 2]
        bytes[outer_offset + 4..outer_offset + 8].copy_from_slice(&5i32.to_ne_bytes());
        let err = BufferAllocator::new(&bytes).unwrap_err();
        assert!(matches!(err, Error::Format(CrsError::MalformedOuter)));
    }

    #[test]
    fn test_header_with_unaddressable_rows() {
        let mut header = CrsHeader::for_shape(&Shape::new(2, 2, 2));
        header.rows = u64::MAX;
        let err = BufferAllocator::new(&header.to_bytes_array()).unwrap_err();
        assert!(matches!(err, Error::Format(CrsError::ArraySizeOverflow)));
    }

    #[test]
    fn test_header_larger_than_buffer() {
        // consistent header announcing 2 GiB of values, followed by nothing
        let header = CrsHeader::for_shape(&Shape::new(2, 2, 1 << 28));
        let err = BufferAllocator::new(&header.to_bytes_array()).unwrap_err();
        assert!(matches!(err, Error::Format(CrsError::InsufficientBuffer)));
    }
}
