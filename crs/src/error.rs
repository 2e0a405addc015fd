//! Error type shared by matrices, allocators and linear algebra backends

use crs_core::CrsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A call was made on an object not in the required state
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    /// Arrays handed to a constructor do not describe a valid matrix
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("{what} {index} out of range [0, {bound})")]
    OutOfRange {
        what: &'static str,
        index: i64,
        bound: usize,
    },

    #[error("{op}: size mismatch, {detail}")]
    SizeMismatch { op: &'static str, detail: String },

    #[error("linear algebra backend '{name}' not found, available: {available}")]
    NotFound { name: String, available: String },

    #[error("linear algebra backend '{0}' is already registered")]
    DuplicateRegistration(String),

    #[error("{op} is not implemented by backend '{backend}'")]
    Unimplemented { backend: String, op: &'static str },

    /// Malformed or incompatible serialized data
    #[error("malformed CRS data: {0}")]
    Format(#[from] CrsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn out_of_range(what: &'static str, index: i64, bound: usize) -> Self {
        Error::OutOfRange {
            what,
            index,
            bound,
        }
    }

    pub(crate) fn size_mismatch(op: &'static str, detail: impl Into<String>) -> Self {
        Error::SizeMismatch {
            op,
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
