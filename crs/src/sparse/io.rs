//! Binary encoding, files and in-memory buffers
//!
//! The byte layout is the one described by [`CrsHeader`]: the header, then
//! `data`, `outer` and `inner`, each on an 8-byte boundary, in native byte
//! order. Readers reject data written with a different byte order or
//! different index/scalar sizes.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::mem;
use std::path::Path;

use bytemuck::Pod;
use crs_core::format::constants::ALIGNMENT_BOUNDARY;
use crs_core::{calculate_padding, CrsError, CrsHeader, Index, Scalar};
use tracing::debug;

use super::SparseMatrix;
use crate::allocator::BufferAllocator;
use crate::Result;

const PADDING: [u8; ALIGNMENT_BOUNDARY] = [0; ALIGNMENT_BOUNDARY];
const READ_CHUNK_BYTES: usize = 1 << 16;

impl SparseMatrix {
    /// Header describing this matrix as it is serialized
    pub fn header(&self) -> CrsHeader {
        CrsHeader::for_shape(&self.shape())
    }

    /// Number of bytes written by [`SparseMatrix::encode`]
    pub fn serialized_size(&self) -> usize {
        self.header().total_size() as usize
    }

    pub fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        let header = self.header();
        writer.write_all(&header.to_bytes_array())?;

        let mut pos = CrsHeader::SIZE;
        let arrays: [&[u8]; 3] = [
            bytemuck::cast_slice(self.data()),
            bytemuck::cast_slice(self.outer()),
            bytemuck::cast_slice(self.inner()),
        ];
        for bytes in arrays {
            let padding = calculate_padding(pos, ALIGNMENT_BOUNDARY);
            writer.write_all(&PADDING[..padding])?;
            writer.write_all(bytes)?;
            pos += padding + bytes.len();
        }
        debug_assert_eq!(pos as u64, header.total_size());

        Ok(())
    }

    /// Read a matrix written by [`SparseMatrix::encode`] into heap storage
    pub fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        let mut raw = [0u8; CrsHeader::SIZE];
        reader.read_exact(&mut raw)?;
        let header = CrsHeader::from_bytes(&raw)?;
        header.check_compatible()?;
        let shape = header.shape();

        let mut pos = CrsHeader::SIZE as u64;
        let data: Vec<Scalar> = read_array(reader, &mut pos, header.data_offset, shape.data_size())?;
        let outer: Vec<Index> = read_array(reader, &mut pos, header.outer_offset, shape.outer_size())?;
        let inner: Vec<Index> = read_array(reader, &mut pos, header.inner_offset, shape.inner_size())?;

        debug!(%shape, bytes = pos, "decoded sparse matrix");
        Self::from_arrays(shape.rows, shape.cols, data, outer, inner)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.encode(&mut writer)?;
        writer.flush()?;
        debug!(path = %path.display(), shape = %self.shape(), "saved sparse matrix");
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let matrix = Self::decode(&mut reader)?;
        debug!(path = %path.display(), shape = %matrix.shape(), "loaded sparse matrix");
        Ok(matrix)
    }

    /// Serialize into `buffer`, returning the number of bytes written
    pub fn dump(&self, buffer: &mut [u8]) -> Result<usize> {
        let size = self.serialized_size();
        if buffer.len() < size {
            return Err(CrsError::InsufficientBuffer.into());
        }
        let mut cursor = &mut buffer[..size];
        self.encode(&mut cursor)?;
        Ok(size)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.serialized_size());
        self.encode(&mut bytes)?;
        Ok(bytes)
    }

    /// Matrix viewing a private aligned copy of a serialized buffer
    pub fn load_buffer(bytes: &[u8]) -> Result<Self> {
        Self::from_allocator(Box::new(BufferAllocator::new(bytes)?))
    }

    /// Matrix viewing a memory-mapped file written by [`SparseMatrix::save`]
    #[cfg(feature = "mmap")]
    pub fn open_mmap<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_allocator(Box::new(crate::allocator::MmapAllocator::open(path)?))
    }

    /// Text listing of the stored entries, one `row col value` line each
    pub fn write_entries<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for entry in self {
            writeln!(writer, "{} {} {}", entry.row, entry.col, entry.value)?;
        }
        Ok(())
    }
}

/// Read `count` values starting at `offset`, growing the array as bytes
/// arrive so a header cannot force a large allocation up front
fn read_array<R: Read, T: Pod>(
    reader: &mut R,
    pos: &mut u64,
    offset: u64,
    count: usize,
) -> Result<Vec<T>> {
    let padding = offset
        .checked_sub(*pos)
        .filter(|&gap| gap < PADDING.len() as u64)
        .ok_or(CrsError::CorruptedData)?;

    let mut skipped = PADDING;
    reader.read_exact(&mut skipped[..padding as usize])?;

    let chunk = (READ_CHUNK_BYTES / mem::size_of::<T>()).max(1);
    let mut values: Vec<T> = Vec::new();
    while values.len() < count {
        let start = values.len();
        values.resize(start + chunk.min(count - start), T::zeroed());
        reader.read_exact(bytemuck::cast_slice_mut(&mut values[start..]))?;
    }

    *pos = offset + (count * mem::size_of::<T>()) as u64;
    Ok(values)
}
