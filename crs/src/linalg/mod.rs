//! Dense and sparse linear algebra behind interchangeable backends
//!
//! Every backend implements the same six operations with the same size
//! checks, and results agree up to floating point summation order. Callers
//! pick a backend by name through a [`BackendRegistry`], or use the process
//! wide default from [`backend`].

mod blocked;
mod checks;
mod generic;
mod parallel;
mod registry;

pub use blocked::Blocked;
pub use generic::Generic;
pub use parallel::Parallel;
pub use registry::BackendRegistry;

use std::sync::Arc;

use crs_core::Scalar;

use crate::dense::{Matrix, Vector};
use crate::{Error, Result, SparseMatrix};

/// Name of the serial reference backend
pub const GENERIC: &str = "generic";
/// Name of the rayon backend
pub const PARALLEL: &str = "rayon";
/// Name of the cache-blocked backend
pub const BLOCKED: &str = "blocked";

/// Operations every linear algebra backend provides
///
/// Outputs are always overwritten, never accumulated into. Size checks
/// happen before any output is touched.
pub trait LinearAlgebra: Send + Sync {
    /// Registration name
    fn name(&self) -> &str;

    /// Scalar product of two vectors of equal size
    fn dot(&self, x: &Vector<'_>, y: &Vector<'_>) -> Result<Scalar>;

    /// `y = A x` for a dense `A`
    fn gemv(&self, a: &Matrix<'_>, x: &Vector<'_>, y: &mut Vector<'_>) -> Result<()>;

    /// `C = A B` for dense matrices
    fn gemm(&self, a: &Matrix<'_>, b: &Matrix<'_>, c: &mut Matrix<'_>) -> Result<()>;

    /// `y = A x` for a sparse `A`
    fn spmv(&self, a: &SparseMatrix, x: &Vector<'_>, y: &mut Vector<'_>) -> Result<()>;

    /// `C = A B` for a sparse `A` and dense `B`
    fn spmm(&self, a: &SparseMatrix, b: &Matrix<'_>, c: &mut Matrix<'_>) -> Result<()>;

    /// `B = diag(x) Aᵀ diag(y)`, replacing the contents of `b`
    fn dsptd(
        &self,
        _x: &Vector<'_>,
        _a: &SparseMatrix,
        _y: &Vector<'_>,
        _b: &mut SparseMatrix,
    ) -> Result<()> {
        Err(Error::Unimplemented {
            backend: self.name().to_string(),
            op: "dsptd",
        })
    }
}

/// Default backend of the global registry
pub fn backend() -> Result<Arc<dyn LinearAlgebra>> {
    BackendRegistry::global().backend()
}

/// Backend registered under `name` in the global registry
pub fn find(name: &str) -> Result<Arc<dyn LinearAlgebra>> {
    BackendRegistry::global().find(name)
}
