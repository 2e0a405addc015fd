//! Array bounds and alignment validation
//!
//! Pure arithmetic on byte lengths and addresses, no memory access.

use crate::CrsError;

/// Number of `T` elements held by `byte_len` bytes
///
/// Rejects lengths that are not a multiple of the element size and counts
/// large enough to overflow downstream offset arithmetic.
pub const fn validate_array_bounds<T>(byte_len: usize) -> Result<usize, CrsError> {
    let element_size = core::mem::size_of::<T>();

    if byte_len % element_size != 0 {
        return Err(CrsError::ArrayAlignment);
    }

    let count = byte_len / element_size;
    if count > usize::MAX / 8 {
        return Err(CrsError::ArraySizeOverflow);
    }

    Ok(count)
}

/// Validate alignment for a pointer to typed data
pub fn validate_alignment<T>(ptr: *const u8) -> Result<(), CrsError> {
    let alignment = core::mem::align_of::<T>();
    if (ptr as usize) % alignment != 0 {
        return Err(CrsError::ArrayAlignment);
    }
    Ok(())
}

/// Combined length and alignment check before reinterpreting bytes as `[T]`
pub fn validate_typed_slice<T>(data: &[u8]) -> Result<usize, CrsError> {
    validate_alignment::<T>(data.as_ptr())?;
    validate_array_bounds::<T>(data.len())
}

/// Reinterpret `data` in place as a slice of `T` after [`validate_typed_slice`]
pub fn cast_typed_slice<T: bytemuck::Pod>(data: &[u8]) -> Result<&[T], CrsError> {
    validate_typed_slice::<T>(data)?;
    bytemuck::try_cast_slice(data).map_err(|_| CrsError::ArrayAlignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Index, Scalar};

    #[test]
    fn test_validate_array_bounds() {
        assert_eq!(validate_array_bounds::<Index>(16), Ok(4));
        assert_eq!(validate_array_bounds::<Scalar>(24), Ok(3));

        assert_eq!(
            validate_array_bounds::<Index>(15),
            Err(CrsError::ArrayAlignment)
        );
        assert_eq!(
            validate_array_bounds::<Scalar>(20),
            Err(CrsError::ArrayAlignment)
        );

        assert_eq!(validate_array_bounds::<Index>(0), Ok(0));
    }

    #[test]
    fn test_validate_alignment() {
        let aligned_data: [u64; 4] = [0; 4];
        let ptr = aligned_data.as_ptr() as *const u8;

        assert_eq!(validate_alignment::<Scalar>(ptr), Ok(()));
        assert_eq!(validate_alignment::<Index>(ptr), Ok(()));

        let unaligned_ptr = ptr.wrapping_add(1);
        assert_eq!(
            validate_alignment::<Scalar>(unaligned_ptr),
            Err(CrsError::ArrayAlignment)
        );
    }

    #[test]
    fn test_validate_typed_slice() {
        let storage: [u64; 2] = [0; 2];
        let bytes: &[u8] = bytemuck::cast_slice(&storage);
        assert_eq!(validate_typed_slice::<Index>(bytes), Ok(4));
        assert_eq!(
            validate_typed_slice::<Scalar>(&bytes[4..]),
            Err(CrsError::ArrayAlignment)
        );
    }

    #[test]
    fn test_cast_typed_slice() {
        let storage: [u64; 2] = [1, 2];
        let bytes: &[u8] = bytemuck::cast_slice(&storage);
        assert_eq!(cast_typed_slice::<u64>(bytes), Ok(&storage[..]));
        assert_eq!(
            cast_typed_slice::<Index>(&bytes[..7]),
            Err(CrsError::ArrayAlignment)
        );
    }
}
