use num_traits::Zero;

use crate::error::TensorError;
use crate::shape::{compute_strides, is_contiguous, numel, Order, Shape, Strides};
use crate::storage::TensorStorage;
use crate::traversable::Traversable;
use crate::view::TensorView;

/// A dense, owned N-dimensional array.
///
/// The rank is dynamic: reductions and slicing change the number of axes, so the
/// shape is a [`Shape`] rather than a fixed-size array. The elements are stored in
/// a single buffer laid out in [`Order::C`] or [`Order::F`].
///
/// # Example
///
/// ```
/// use axial_tensor::Tensor;
///
/// let t = Tensor::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
/// assert_eq!(t.shape.as_slice(), &[2, 3]);
/// assert_eq!(t.strides.as_slice(), &[3, 1]);
/// assert_eq!(t.get(&[1, 2]), Some(&6));
/// ```
#[derive(Clone, Debug)]
pub struct Tensor<T> {
    /// The storage of the tensor.
    pub storage: TensorStorage<T>,
    /// The shape of the tensor.
    pub shape: Shape,
    /// The strides of the tensor data in memory.
    pub strides: Strides,
    /// The memory order the strides were computed for.
    pub order: Order,
}

impl<T> Tensor<T> {
    /// Creates a new row-major `Tensor` with the given shape and data.
    ///
    /// # Errors
    ///
    /// If the number of elements in the data does not match the shape of the tensor, an error is returned.
    pub fn from_shape_vec(shape: &[usize], data: Vec<T>) -> Result<Self, TensorError> {
        Self::from_shape_vec_with_order(shape, data, Order::C)
    }

    /// Creates a new `Tensor` whose `data` is laid out in `order`.
    ///
    /// # Errors
    ///
    /// If the number of elements in the data does not match the shape of the tensor, an error is returned.
    ///
    /// # Example
    ///
    /// ```
    /// use axial_tensor::{shape::Order, Tensor};
    ///
    /// let t = Tensor::from_shape_vec_with_order(&[2, 3], vec![1, 4, 2, 5, 3, 6], Order::F).unwrap();
    /// assert_eq!(t.get(&[0, 1]), Some(&2));
    /// assert_eq!(t.to_standard_layout().as_slice(), &[1, 2, 3, 4, 5, 6]);
    /// ```
    pub fn from_shape_vec_with_order(
        shape: &[usize],
        data: Vec<T>,
        order: Order,
    ) -> Result<Self, TensorError> {
        let numel = numel(shape);
        if numel != data.len() {
            return Err(TensorError::invalid_shape(numel, data.len()));
        }
        Ok(Self {
            storage: TensorStorage::from_vec(data),
            shape: shape.into(),
            strides: compute_strides(shape, order),
            order,
        })
    }

    /// Creates a new `Tensor` with the given shape and slice of data.
    ///
    /// # Errors
    ///
    /// If the number of elements in the data does not match the shape of the tensor, an error is returned.
    pub fn from_shape_slice(shape: &[usize], data: &[T]) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        Self::from_shape_vec(shape, data.to_vec())
    }

    /// Creates a new `Tensor` with the given shape filled with `value`.
    pub fn from_shape_val(shape: &[usize], value: T) -> Self
    where
        T: Clone,
    {
        Self {
            storage: TensorStorage::from_vec(vec![value; numel(shape)]),
            shape: shape.into(),
            strides: compute_strides(shape, Order::C),
            order: Order::C,
        }
    }

    /// Creates a new `Tensor` by calling `f` with the multi-index of every element.
    ///
    /// # Example
    ///
    /// ```
    /// use axial_tensor::Tensor;
    ///
    /// let t = Tensor::from_shape_fn(&[2, 2], |idx| (idx[0] * 2 + idx[1]) as u8);
    /// assert_eq!(t.as_slice(), &[0, 1, 2, 3]);
    /// ```
    pub fn from_shape_fn<F>(shape: &[usize], f: F) -> Self
    where
        F: Fn(&[usize]) -> T,
    {
        let numel = numel(shape);
        let mut index: Shape = smallvec::smallvec![0; shape.len()];
        let mut data = Vec::with_capacity(numel);
        for _ in 0..numel {
            data.push(f(&index));
            for k in (0..shape.len()).rev() {
                index[k] += 1;
                if index[k] < shape[k] {
                    break;
                }
                index[k] = 0;
            }
        }
        Self {
            storage: TensorStorage::from_vec(data),
            shape: shape.into(),
            strides: compute_strides(shape, Order::C),
            order: Order::C,
        }
    }

    /// Creates a new `Tensor` filled with zeros.
    pub fn zeros(shape: &[usize]) -> Self
    where
        T: Zero + Clone,
    {
        Self::from_shape_val(shape, T::zero())
    }

    /// Creates a 0-dimensional tensor holding a single value.
    pub fn scalar(value: T) -> Self {
        Self {
            storage: TensorStorage::from_vec(vec![value]),
            shape: Shape::new(),
            strides: Strides::new(),
            order: Order::C,
        }
    }

    /// Returns the number of axes.
    #[inline]
    pub fn dim(&self) -> usize {
        self.shape.len()
    }

    /// Returns the number of elements in the tensor.
    #[inline]
    pub fn numel(&self) -> usize {
        numel(&self.shape)
    }

    /// Returns the data as a slice, in storage order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.storage.as_slice()
    }

    /// Returns the data as a mutable slice, in storage order.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        self.storage.as_mut_slice()
    }

    /// Consumes the tensor and returns the data, in storage order.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.storage.into_vec()
    }

    /// Returns the storage offset of the element at `index`, or `None` when out of bounds.
    pub fn get_iter_offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0isize;
        for ((&idx, &extent), &stride) in index.iter().zip(&self.shape).zip(&self.strides) {
            if idx >= extent {
                return None;
            }
            offset += idx as isize * stride;
        }
        Some(offset as usize)
    }

    /// Returns the element at `index`, or `None` when out of bounds.
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        self.get_iter_offset(index)
            .and_then(|offset| self.as_slice().get(offset))
    }

    /// Returns the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn get_unchecked(&self, index: &[usize]) -> &T {
        let offset: isize = index
            .iter()
            .zip(&self.strides)
            .map(|(&i, &s)| i as isize * s)
            .sum();
        &self.as_slice()[offset as usize]
    }

    /// Returns a borrowed view of the whole tensor.
    pub fn view(&self) -> TensorView<'_, T> {
        TensorView {
            storage: &self.storage,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            offset: 0,
        }
    }

    /// Reinterprets a row-major tensor with a new shape, without copying.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of elements differs or the tensor is not row-major.
    pub fn reshape(&self, shape: &[usize]) -> Result<TensorView<'_, T>, TensorError> {
        self.view().reshape(shape)
    }

    /// Returns a view with the axes permuted, `axes[i]` becoming axis `i`.
    ///
    /// # Errors
    ///
    /// Returns an error if `axes` is not a permutation of `0..dim`.
    pub fn permute_axes(&self, axes: &[usize]) -> Result<TensorView<'_, T>, TensorError> {
        self.view().permute_axes(axes)
    }

    /// Returns a view with the axes reversed.
    pub fn transpose(&self) -> TensorView<'_, T> {
        self.view().transpose()
    }

    /// Applies `f` to every element, keeping the shape and layout.
    pub fn map<U, F>(&self, f: F) -> Tensor<U>
    where
        F: Fn(&T) -> U,
    {
        Tensor {
            storage: TensorStorage::from_vec(self.as_slice().iter().map(f).collect()),
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            order: self.order,
        }
    }

    /// Checks if the tensor has a standard contiguous (row-major) memory layout.
    pub fn is_standard_layout(&self) -> bool {
        is_contiguous(&self.shape, &self.strides, Order::C)
    }

    /// Converts the tensor to a standard contiguous (row-major) memory layout.
    ///
    /// Returns a clone when the tensor is already row-major.
    pub fn to_standard_layout(&self) -> Self
    where
        T: Clone + Send + Sync,
    {
        if self.is_standard_layout() {
            let mut t = self.clone();
            t.strides = compute_strides(&self.shape, Order::C);
            t.order = Order::C;
            return t;
        }
        Tensor {
            storage: TensorStorage::from_vec(self.collect_in(Order::C)),
            shape: self.shape.clone(),
            strides: compute_strides(&self.shape, Order::C),
            order: Order::C,
        }
    }
}
