use std::ops::{Index, IndexMut};

use crs_core::{Scalar, Size};

use super::Storage;

/// Dense vector of scalars
#[derive(Debug, Clone)]
pub struct Vector<'a> {
    storage: Storage<'a>,
}

impl Vector<'static> {
    /// Zero-filled vector of `size` entries
    pub fn new(size: Size) -> Self {
        Self {
            storage: Storage::Owned(vec![0.0; size]),
        }
    }

    pub fn from_slice(values: &[Scalar]) -> Self {
        values.to_vec().into()
    }
}

impl<'a> Vector<'a> {
    /// Read-only view over caller memory, copied on first write
    pub fn view(values: &'a [Scalar]) -> Self {
        Self {
            storage: Storage::Shared(values),
        }
    }

    /// Writable view over caller memory, results land in `values`
    pub fn view_mut(values: &'a mut [Scalar]) -> Self {
        Self {
            storage: Storage::Exclusive(values),
        }
    }

    pub fn size(&self) -> Size {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn is_borrowed(&self) -> bool {
        self.storage.is_borrowed()
    }

    pub fn as_slice(&self) -> &[Scalar] {
        self.storage.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [Scalar] {
        self.storage.as_mut_slice()
    }

    pub fn fill(&mut self, value: Scalar) {
        self.as_mut_slice().fill(value);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Scalar> {
        self.as_slice().iter()
    }

    pub fn into_vec(self) -> Vec<Scalar> {
        self.storage.into_vec()
    }
}

impl From<Vec<Scalar>> for Vector<'static> {
    fn from(values: Vec<Scalar>) -> Self {
        Self {
            storage: Storage::Owned(values),
        }
    }
}

impl Index<usize> for Vector<'_> {
    type Output = Scalar;

    fn index(&self, i: usize) -> &Scalar {
        &self.as_slice()[i]
    }
}

impl IndexMut<usize> for Vector<'_> {
    fn index_mut(&mut self, i: usize) -> &mut Scalar {
        &mut self.as_mut_slice()[i]
    }
}

impl PartialEq for Vector<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let v = Vector::new(4);
        assert_eq!(v.size(), 4);
        assert!(v.iter().all(|&x| x == 0.0));
        assert!(!v.is_borrowed());
    }

    #[test]
    fn test_shared_view_copies_on_write() {
        let values = [1.0, 2.0, 3.0];
        let mut v = Vector::view(&values);
        assert!(v.is_borrowed());

        v[1] = 5.0;
        assert_eq!(v.as_slice(), &[1.0, 5.0, 3.0]);
        assert!(!v.is_borrowed());
        assert_eq!(values, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_exclusive_view_writes_through() {
        let mut values = [0.0; 3];
        {
            let mut v = Vector::view_mut(&mut values);
            v.fill(2.5);
        }
        assert_eq!(values, [2.5; 3]);
    }
}
