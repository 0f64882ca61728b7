//! Owned element buffer backing a [`Tensor`](crate::Tensor).

/// Growable, contiguous buffer holding the elements of a tensor.
///
/// The buffer knows nothing about shape or strides; it only hands out the raw
/// element slice. Strided access is layered on top by tensors, views and walkers.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TensorStorage<T> {
    data: Vec<T>,
}

impl<T> TensorStorage<T> {
    /// Wraps an existing vector without copying.
    #[inline]
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Returns the elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns the elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Returns the number of elements in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the buffer holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the storage and returns the underlying vector.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T> From<Vec<T>> for TensorStorage<T> {
    fn from(data: Vec<T>) -> Self {
        Self::from_vec(data)
    }
}

#[cfg(test)]
mod tests {
    use super::TensorStorage;

    #[test]
    fn test_storage_roundtrip() {
        let mut storage = TensorStorage::from_vec(vec![1u8, 2, 3]);
        assert_eq!(storage.len(), 3);
        assert!(!storage.is_empty());
        storage.as_mut_slice()[1] = 9;
        assert_eq!(storage.as_slice(), &[1, 9, 3]);
        assert_eq!(storage.into_vec(), vec![1, 9, 3]);
    }

    #[test]
    fn test_storage_empty() {
        let storage: TensorStorage<f32> = Vec::new().into();
        assert!(storage.is_empty());
        assert_eq!(storage.len(), 0);
    }
}
