//! Contiguous dense buffers consumed and produced by the backends
//!
//! Both [`Vector`] and [`Matrix`] either own their values or borrow them
//! from the caller. A shared borrow is copied into owned storage on the
//! first write; an exclusive borrow is written through.

mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;

use crs_core::Scalar;

#[derive(Debug)]
enum Storage<'a> {
    Owned(Vec<Scalar>),
    Shared(&'a [Scalar]),
    Exclusive(&'a mut [Scalar]),
}

impl Storage<'_> {
    fn as_slice(&self) -> &[Scalar] {
        match self {
            Storage::Owned(values) => values,
            Storage::Shared(values) => values,
            Storage::Exclusive(values) => values,
        }
    }

    fn as_mut_slice(&mut self) -> &mut [Scalar] {
        if let Storage::Shared(values) = *self {
            *self = Storage::Owned(values.to_vec());
        }
        match self {
            Storage::Owned(values) => values,
            Storage::Exclusive(values) => values,
            Storage::Shared(_) => unreachable!("shared storage promoted above"),
        }
    }

    fn into_vec(self) -> Vec<Scalar> {
        match self {
            Storage::Owned(values) => values,
            Storage::Shared(values) => values.to_vec(),
            Storage::Exclusive(values) => values.to_vec(),
        }
    }

    fn is_borrowed(&self) -> bool {
        !matches!(self, Storage::Owned(_))
    }
}

impl Clone for Storage<'_> {
    fn clone(&self) -> Self {
        Storage::Owned(self.as_slice().to_vec())
    }
}
