//! Format constants for serialized CRS matrices

/// Alignment boundary of every array in a serialized matrix
pub const ALIGNMENT_BOUNDARY: usize = 8;

/// Byte order flag values stored in the header
pub mod endian {
    pub const BIG: u8 = 0;
    pub const LITTLE: u8 = 1;

    /// Flag describing the byte order of the running build
    pub const fn native() -> u8 {
        if cfg!(target_endian = "little") {
            LITTLE
        } else {
            BIG
        }
    }
}
