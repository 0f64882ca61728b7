use crate::error::TensorError;
use crate::shape::{
    broadcast_shapes, compute_strides, is_contiguous, normalize_axis, numel, Order, Shape,
    Strides,
};
use crate::storage::TensorStorage;
use crate::tensor::Tensor;
use crate::traversable::Traversable;

/// A non-owning strided view into tensor data.
///
/// `TensorView` borrows the storage of a [`Tensor`] and carries its own shape,
/// signed strides and starting offset. Slicing, transposition, axis insertion and
/// broadcasting only rewrite these three fields; no element is copied until
/// [`to_tensor`](Self::to_tensor) is called.
///
/// # Examples
///
/// ```rust
/// use axial_tensor::Tensor;
///
/// let t = Tensor::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
///
/// // every second column, right to left
/// let v = t.view().slice_axis(1, 0, 3, -2).unwrap();
/// assert_eq!(v.shape.as_slice(), &[2, 2]);
/// assert_eq!(v.to_tensor().unwrap().as_slice(), &[3, 1, 6, 4]);
/// ```
#[derive(Debug)]
pub struct TensorView<'a, T> {
    /// Reference to the storage held by another tensor.
    pub storage: &'a TensorStorage<T>,
    /// The shape of the tensor view.
    pub shape: Shape,
    /// The strides for accessing elements in the view.
    pub strides: Strides,
    /// Offset of the first element in the storage.
    pub offset: usize,
}

impl<T> Clone for TensorView<'_, T> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }
}

impl<'a, T> TensorView<'a, T> {
    /// Returns the number of axes of the view.
    #[inline]
    pub fn dim(&self) -> usize {
        self.shape.len()
    }

    /// Returns the number of elements visible through the view.
    #[inline]
    pub fn numel(&self) -> usize {
        numel(&self.shape)
    }

    /// Returns the whole underlying storage, regardless of the view's layout.
    #[inline]
    pub fn as_slice(&self) -> &'a [T] {
        self.storage.as_slice()
    }

    /// Checks whether the view walks its storage densely in `order`.
    pub fn is_contiguous(&self, order: Order) -> bool {
        is_contiguous(&self.shape, &self.strides, order)
    }

    /// Returns the storage offset of the element at `index`, or `None` when out of bounds.
    pub fn get_iter_offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut offset = self.offset as isize;
        for ((&idx, &extent), &stride) in index.iter().zip(&self.shape).zip(&self.strides) {
            if idx >= extent {
                return None;
            }
            offset += idx as isize * stride;
        }
        Some(offset as usize)
    }

    /// Returns the element at `index`, or `None` when out of bounds.
    pub fn get(&self, index: &[usize]) -> Option<&'a T> {
        self.get_iter_offset(index)
            .and_then(|offset| self.storage.as_slice().get(offset))
    }

    /// Restricts `axis` to `start..end` taken every `step` elements.
    ///
    /// The range is clipped to the axis extent. A negative `step` visits the range
    /// backwards, starting from `end - 1`.
    ///
    /// # Errors
    ///
    /// Returns an error if the axis is out of bounds or `step` is zero.
    pub fn slice_axis(
        &self,
        axis: isize,
        start: usize,
        end: usize,
        step: isize,
    ) -> Result<Self, TensorError> {
        let axis = normalize_axis(axis, self.dim())?;
        if step == 0 {
            return Err(TensorError::InvalidArgument(
                "slice step must be non-zero".to_string(),
            ));
        }
        let extent = self.shape[axis];
        let end = end.min(extent);
        let start = start.min(end);
        let span = end - start;
        let len = span.div_ceil(step.unsigned_abs());

        let mut view = self.clone();
        let stride = self.strides[axis];
        if len > 0 {
            let first = if step > 0 { start } else { end - 1 };
            view.offset = (self.offset as isize + first as isize * stride) as usize;
        }
        view.shape[axis] = len;
        view.strides[axis] = stride * step;
        Ok(view)
    }

    /// Selects a single index along `axis`, removing the axis.
    ///
    /// Negative indices count from the end.
    ///
    /// # Errors
    ///
    /// Returns an error if the axis or the index is out of bounds.
    pub fn index_axis(&self, axis: isize, index: isize) -> Result<Self, TensorError> {
        let axis = normalize_axis(axis, self.dim())?;
        let extent = self.shape[axis];
        let i = if index < 0 { index + extent as isize } else { index };
        if i < 0 || i >= extent as isize {
            return Err(TensorError::index_out_of_bounds(index, extent));
        }
        let mut view = self.clone();
        view.offset = (self.offset as isize + i * self.strides[axis]) as usize;
        view.shape.remove(axis);
        view.strides.remove(axis);
        Ok(view)
    }

    /// Inserts a new axis of extent 1 before position `axis`.
    ///
    /// # Errors
    ///
    /// Returns an error if `axis > dim`.
    pub fn insert_axis(&self, axis: usize) -> Result<Self, TensorError> {
        if axis > self.dim() {
            return Err(TensorError::axis_out_of_bounds(
                axis as isize,
                self.dim() + 1,
            ));
        }
        let mut view = self.clone();
        view.shape.insert(axis, 1);
        view.strides.insert(axis, 0);
        Ok(view)
    }

    /// Permutes the axes, `axes[i]` becoming axis `i`.
    ///
    /// # Errors
    ///
    /// Returns an error if `axes` is not a permutation of `0..dim`.
    pub fn permute_axes(&self, axes: &[usize]) -> Result<Self, TensorError> {
        if axes.len() != self.dim() {
            return Err(TensorError::dimension_mismatch(
                "permutation length must equal the number of axes",
                &[self.dim()],
                &[axes.len()],
            ));
        }
        let mut seen: Shape = smallvec::smallvec![0; axes.len()];
        for &axis in axes {
            if axis >= self.dim() {
                return Err(TensorError::axis_out_of_bounds(axis as isize, self.dim()));
            }
            if seen[axis] > 0 {
                return Err(TensorError::DuplicateAxis(axis));
            }
            seen[axis] = 1;
        }
        let mut view = self.clone();
        for (i, &axis) in axes.iter().enumerate() {
            view.shape[i] = self.shape[axis];
            view.strides[i] = self.strides[axis];
        }
        Ok(view)
    }

    /// Returns a view with the axes reversed.
    pub fn transpose(&self) -> Self {
        let mut view = self.clone();
        view.shape.reverse();
        view.strides.reverse();
        view
    }

    /// Reinterprets a row-major view with a new shape, without copying.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of elements differs or the view is not row-major.
    pub fn reshape(&self, shape: &[usize]) -> Result<Self, TensorError> {
        let numel = numel(shape);
        if numel != self.numel() {
            return Err(TensorError::invalid_shape(self.numel(), numel));
        }
        if !self.is_contiguous(Order::C) {
            return Err(TensorError::non_contiguous("reshape"));
        }
        Ok(Self {
            storage: self.storage,
            shape: shape.into(),
            strides: compute_strides(shape, Order::C),
            offset: self.offset,
        })
    }

    /// Broadcasts the view to `shape` using NumPy rules.
    ///
    /// Missing leading axes and extent-1 axes get a zero stride.
    ///
    /// # Errors
    ///
    /// Returns an error if the view cannot be broadcast to exactly `shape`.
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Self, TensorError> {
        let target = broadcast_shapes(&self.shape, shape)?;
        if target.as_slice() != shape {
            return Err(TensorError::BroadcastError {
                lhs: self.shape.to_vec(),
                rhs: shape.to_vec(),
            });
        }
        let pad = shape.len() - self.dim();
        let mut strides: Strides = smallvec::smallvec![0; shape.len()];
        for (axis, (&extent, &stride)) in self.shape.iter().zip(&self.strides).enumerate() {
            if extent == shape[pad + axis] {
                strides[pad + axis] = stride;
            }
        }
        Ok(Self {
            storage: self.storage,
            shape: shape.into(),
            strides,
            offset: self.offset,
        })
    }

    /// Copies the visible elements into a new row-major tensor.
    pub fn to_tensor(&self) -> Result<Tensor<T>, TensorError>
    where
        T: Clone + Send + Sync,
    {
        self.to_tensor_with_order(Order::C)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arange(shape: &[usize]) -> Result<Tensor<i32>, TensorError> {
        Tensor::from_shape_vec(shape, (0..numel(shape) as i32).collect())
    }

    #[test]
    fn slice_forward_and_backward() -> Result<(), TensorError> {
        let t = arange(&[10])?;
        let v = t.view().slice_axis(0, 2, 9, 3)?;
        assert_eq!(v.to_tensor()?.as_slice(), &[2, 5, 8]);
        let r = t.view().slice_axis(0, 0, 10, -1)?;
        assert_eq!(r.to_tensor()?.as_slice(), &[9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
        let r2 = t.view().slice_axis(-1, 1, 6, -2)?;
        assert_eq!(r2.to_tensor()?.as_slice(), &[5, 3, 1]);
        let empty = t.view().slice_axis(0, 7, 3, 1)?;
        assert_eq!(empty.numel(), 0);
        assert!(t.view().slice_axis(0, 0, 3, 0).is_err());
        Ok(())
    }

    #[test]
    fn index_and_insert_axis() -> Result<(), TensorError> {
        let t = arange(&[2, 3, 4])?;
        let row = t.view().index_axis(1, -1)?;
        assert_eq!(row.shape.as_slice(), &[2, 4]);
        assert_eq!(row.get(&[1, 3]), Some(&23));
        assert_eq!(
            t.view().index_axis(1, 3).err(),
            Some(TensorError::index_out_of_bounds(3, 3))
        );
        let expanded = row.insert_axis(1)?;
        assert_eq!(expanded.shape.as_slice(), &[2, 1, 4]);
        assert_eq!(expanded.get(&[1, 0, 2]), Some(&22));
        Ok(())
    }

    #[test]
    fn reshape_requires_row_major() -> Result<(), TensorError> {
        let t = arange(&[2, 6])?;
        let r = t.reshape(&[3, 4])?;
        assert_eq!(r.get(&[2, 1]), Some(&9));
        assert_eq!(
            t.transpose().reshape(&[12]).err(),
            Some(TensorError::non_contiguous("reshape"))
        );
        assert!(t.reshape(&[5]).is_err());
        Ok(())
    }

    #[test]
    fn broadcast_view() -> Result<(), TensorError> {
        let t = arange(&[3, 1])?;
        let b = t.view().broadcast_to(&[2, 3, 4])?;
        assert_eq!(b.strides.as_slice(), &[0, 1, 0]);
        assert_eq!(b.get(&[1, 2, 3]), Some(&2));
        assert!(t.view().broadcast_to(&[2, 4]).is_err());
        // broadcasting must not shrink an axis
        assert!(arange(&[3])?.view().broadcast_to(&[1]).is_err());
        Ok(())
    }

    #[test]
    fn contiguity_of_slices() -> Result<(), TensorError> {
        let t = arange(&[4, 5])?;
        assert!(t.view().is_contiguous(Order::C));
        assert!(t.view().slice_axis(0, 1, 3, 1)?.is_contiguous(Order::C));
        assert!(!t.view().slice_axis(1, 1, 3, 1)?.is_contiguous(Order::C));
        assert!(t.transpose().is_contiguous(Order::F));
        Ok(())
    }
}
