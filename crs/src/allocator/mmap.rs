use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use crs_core::Shape;
use memmap2::{Mmap, MmapOptions};
use tracing::debug;

use super::{map_arrays, Allocator, Layout};
use crate::Result;

/// Read-only memory mapping of a saved matrix
///
/// Pages are shared with every other process mapping the same file, and the
/// arrays are used in place without being read up front.
#[derive(Debug)]
pub struct MmapAllocator {
    mmap: Mmap,
    path: PathBuf,
    shape: Shape,
}

impl MmapAllocator {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;

        // SAFETY: The mapping is read-only and every array is validated
        // (bounds, alignment, structure) before a layout is handed out.
        // Modifying the file while it is mapped is the caller's concern.
        let mmap = unsafe { MmapOptions::new().map(&file)? };

        let (shape, _) = map_arrays(&mmap)?;
        debug!(path = %path.display(), %shape, bytes = mmap.len(), "mapped sparse matrix");

        Ok(Self { mmap, path, shape })
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Allocator for MmapAllocator {
    fn allocate(&mut self, shape: &mut Shape) -> Result<Layout> {
        let (stored, layout) = map_arrays(&self.mmap)?;
        *shape = stored;
        Ok(layout)
    }

    fn deallocate(&mut self, _layout: Layout, _shape: Shape) {}

    fn in_shared_memory(&self) -> bool {
        true
    }

    fn is_mutable(&self) -> bool {
        false
    }
}

impl fmt::Display for MmapAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MmapAllocator[path={}]", self.path.display())
    }
}
