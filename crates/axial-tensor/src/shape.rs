//! Shapes, strides and memory orders.
//!
//! Three kinds of strides show up in the engine:
//!
//! - *physical* strides, computed from a shape and an [`Order`] by [`compute_strides`];
//! - *adapted* strides, equal to the physical ones but zero on extent-1 axes
//!   ([`adapt_strides`]), which is what lets a size-1 axis broadcast for free;
//! - *reset* strides (backstrides), `stride * (extent - 1)`, used to send a cursor
//!   back to the start of an axis in one step ([`compute_backstrides`]).

use smallvec::SmallVec;

use crate::error::TensorError;

/// Dimensions of a tensor, stack allocated up to six axes.
pub type Shape = SmallVec<[usize; 6]>;

/// Signed element strides of a tensor.
pub type Strides = SmallVec<[isize; 6]>;

/// Memory / traversal order of a multi-index sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Order {
    /// Row-major: the last axis varies fastest.
    #[default]
    C,
    /// Column-major: the first axis varies fastest.
    F,
}

impl Order {
    /// Maps the `step`-th axis counted from the fastest-varying one to its axis index.
    #[inline]
    pub fn fast_axis(self, step: usize, dim: usize) -> usize {
        match self {
            Order::C => dim - 1 - step,
            Order::F => step,
        }
    }
}

/// Returns the number of elements described by `shape`.
///
/// A 0-dim shape holds a single element; any zero extent yields zero.
#[inline]
pub fn numel(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Computes the physical strides of a dense buffer laid out in `order`.
///
/// # Examples
///
/// ```
/// use axial_tensor::shape::{compute_strides, Order};
///
/// assert_eq!(compute_strides(&[2, 3, 4], Order::C).as_slice(), &[12, 4, 1]);
/// assert_eq!(compute_strides(&[2, 3, 4], Order::F).as_slice(), &[1, 2, 6]);
/// ```
pub fn compute_strides(shape: &[usize], order: Order) -> Strides {
    let dim = shape.len();
    let mut strides: Strides = smallvec::smallvec![0; dim];
    let mut stride = 1isize;
    for step in 0..dim {
        let axis = order.fast_axis(step, dim);
        strides[axis] = stride;
        stride *= shape[axis].max(1) as isize;
    }
    strides
}

/// Returns `strides` with every extent-1 axis zeroed.
pub fn adapt_strides(shape: &[usize], strides: &[isize]) -> Strides {
    shape
        .iter()
        .zip(strides)
        .map(|(&extent, &stride)| if extent == 1 { 0 } else { stride })
        .collect()
}

/// Computes the reset strides `stride * (extent - 1)` of each axis.
pub fn compute_backstrides(shape: &[usize], strides: &[isize]) -> Strides {
    shape
        .iter()
        .zip(strides)
        .map(|(&extent, &stride)| stride * extent.saturating_sub(1) as isize)
        .collect()
}

/// Divisors mapping a linear position in `order` back to a multi-index.
///
/// `index[k] = (pos / divisors[k]) % shape[k]` for every `pos < numel(shape)`.
pub fn strides_div(shape: &[usize], order: Order) -> Shape {
    compute_strides(shape, order)
        .into_iter()
        .map(|s| s as usize)
        .collect()
}

/// Converts a linear position in `order` to a multi-index.
pub fn unravel_index(pos: usize, shape: &[usize], order: Order) -> Shape {
    let div = strides_div(shape, order);
    shape
        .iter()
        .zip(div.iter())
        .map(|(&extent, &d)| if extent == 0 { 0 } else { (pos / d) % extent })
        .collect()
}

/// Converts a multi-index to its linear position in `order`.
pub fn ravel_index(index: &[usize], shape: &[usize], order: Order) -> usize {
    strides_div(shape, order)
        .iter()
        .zip(index)
        .map(|(&d, &i)| d * i)
        .sum()
}

/// Checks whether `strides` walk a dense buffer in exactly `order`.
///
/// Extent-1 axes are ignored, since their stride is never applied.
pub fn is_contiguous(shape: &[usize], strides: &[isize], order: Order) -> bool {
    if shape.len() != strides.len() {
        return false;
    }
    if numel(shape) == 0 {
        return true;
    }
    let expected = compute_strides(shape, order);
    shape
        .iter()
        .zip(strides.iter().zip(expected.iter()))
        .all(|(&extent, (s, e))| extent == 1 || s == e)
}

/// Computes the broadcast shape of `a` and `b` using NumPy rules.
///
/// Shorter shapes are padded with ones on the left; each pair of extents must be
/// equal or one of them must be 1.
///
/// # Errors
///
/// Returns [`TensorError::BroadcastError`] when an axis pair is incompatible.
pub fn broadcast_shapes(a: &[usize], b: &[usize]) -> Result<Shape, TensorError> {
    let dim = a.len().max(b.len());
    let mut result: Shape = smallvec::smallvec![0; dim];
    for i in 0..dim {
        let da = if i < a.len() { a[a.len() - 1 - i] } else { 1 };
        let db = if i < b.len() { b[b.len() - 1 - i] } else { 1 };
        result[dim - 1 - i] = if da == db || db == 1 {
            da
        } else if da == 1 {
            db
        } else {
            return Err(TensorError::BroadcastError {
                lhs: a.to_vec(),
                rhs: b.to_vec(),
            });
        };
    }
    Ok(result)
}

/// Normalizes a possibly negative axis against a tensor of dimension `dim`.
///
/// # Errors
///
/// Returns [`TensorError::AxisOutOfBounds`] when `axis` is outside `[-dim, dim)`.
pub fn normalize_axis(axis: isize, dim: usize) -> Result<usize, TensorError> {
    let ndim = dim as isize;
    let normalized = if axis < 0 { axis + ndim } else { axis };
    if normalized < 0 || normalized >= ndim {
        return Err(TensorError::axis_out_of_bounds(axis, dim));
    }
    Ok(normalized as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strides_c_and_f() {
        assert_eq!(compute_strides(&[4, 2, 3], Order::C).as_slice(), &[6, 3, 1]);
        assert_eq!(compute_strides(&[4, 2, 3], Order::F).as_slice(), &[1, 4, 8]);
        assert!(compute_strides(&[], Order::C).is_empty());
    }

    #[test]
    fn test_strides_with_zero_extent() {
        // zero extents must not collapse the remaining strides
        assert_eq!(compute_strides(&[2, 0, 3], Order::C).as_slice(), &[3, 3, 1]);
    }

    #[test]
    fn test_adapted_and_back_strides() {
        let shape = [3, 1, 4];
        let strides = compute_strides(&shape, Order::C);
        assert_eq!(adapt_strides(&shape, &strides).as_slice(), &[4, 0, 1]);
        assert_eq!(compute_backstrides(&shape, &strides).as_slice(), &[8, 0, 3]);
    }

    #[test]
    fn test_unravel_ravel() {
        let shape = [4, 2, 3];
        for order in [Order::C, Order::F] {
            for pos in 0..numel(&shape) {
                let index = unravel_index(pos, &shape, order);
                assert_eq!(ravel_index(&index, &shape, order), pos);
            }
        }
        assert_eq!(unravel_index(5, &shape, Order::C).as_slice(), &[0, 1, 2]);
        assert_eq!(unravel_index(5, &shape, Order::F).as_slice(), &[1, 1, 0]);
    }

    #[test]
    fn test_is_contiguous() {
        let shape = [2, 3, 4];
        assert!(is_contiguous(&shape, &[12, 4, 1], Order::C));
        assert!(!is_contiguous(&shape, &[12, 4, 1], Order::F));
        assert!(is_contiguous(&shape, &[1, 2, 6], Order::F));
        assert!(is_contiguous(&[2, 1, 4], &[4, 99, 1], Order::C));
        assert!(!is_contiguous(&shape, &[12, 1, 4], Order::C));
    }

    #[test]
    fn test_broadcast_shapes() -> Result<(), TensorError> {
        assert_eq!(broadcast_shapes(&[2, 1], &[1, 3])?.as_slice(), &[2, 3]);
        assert_eq!(broadcast_shapes(&[3], &[2, 3])?.as_slice(), &[2, 3]);
        assert_eq!(broadcast_shapes(&[], &[2, 3])?.as_slice(), &[2, 3]);
        assert!(broadcast_shapes(&[2, 3], &[2, 4]).is_err());
        Ok(())
    }

    #[test]
    fn test_normalize_axis() {
        assert_eq!(normalize_axis(-1, 3), Ok(2));
        assert_eq!(normalize_axis(0, 3), Ok(0));
        assert_eq!(
            normalize_axis(3, 3),
            Err(TensorError::axis_out_of_bounds(3, 3))
        );
        assert!(normalize_axis(-4, 3).is_err());
        assert!(normalize_axis(0, 0).is_err());
    }
}
