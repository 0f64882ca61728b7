//! Cursors that move through strided memory one axis step at a time.
//!
//! A walker never validates its position: it only applies stride arithmetic.
//! Keeping the cursor inside the tensor is the job of the
//! [`Traverser`](crate::traverser::Traverser) that drives it.

use crate::shape::{adapt_strides, compute_backstrides, Strides};

/// A cursor over an element source that can be moved along logical axes.
///
/// Walkers are created for a logical dimensionality that may be larger than the
/// rank of the underlying source. Steps along the leading axes the source does
/// not have are ignored, and steps along extent-1 axes do not move the cursor,
/// which together give NumPy broadcasting for free.
///
/// Walkers are cheap to clone so that every worker thread can own one.
pub trait Walker: Clone + Send + Sync {
    /// The value produced at the current position.
    type Item;

    /// Moves the cursor `delta` steps along `axis`.
    ///
    /// `walk(axis, d)` followed by `walk(axis, -d)` leaves the cursor unchanged.
    fn walk(&mut self, axis: usize, delta: isize);

    /// Moves the cursor from the last index of `axis` back to index 0.
    fn reset(&mut self, axis: usize);

    /// Moves the cursor from index 0 of `axis` to its last index.
    fn reset_back(&mut self, axis: usize);

    /// Returns the element at the current position.
    fn get(&self) -> Self::Item;
}

/// A walker that tracks a signed element offset and yields it.
///
/// This is the building block of every strided walker, and is used on its own
/// when the traversal must not borrow the data, e.g. to scatter results back
/// into a tensor that is being mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetWalker {
    offset: isize,
    strides: Strides,
    backstrides: Strides,
    correction: usize,
}

impl OffsetWalker {
    /// Creates a walker at `offset` over a source with `shape` and physical `strides`,
    /// walked as a `dim`-dimensional tensor.
    ///
    /// `dim` must be at least `shape.len()`.
    pub fn new(offset: usize, shape: &[usize], strides: &[isize], dim: usize) -> Self {
        debug_assert!(dim >= shape.len(), "walker rank exceeds traversal rank");
        let strides = adapt_strides(shape, strides);
        let backstrides = compute_backstrides(shape, &strides);
        Self {
            offset: offset as isize,
            strides,
            backstrides,
            correction: dim.saturating_sub(shape.len()),
        }
    }

    /// Returns the current element offset.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset as usize
    }

    #[inline]
    fn own_axis(&self, axis: usize) -> Option<usize> {
        axis.checked_sub(self.correction)
            .filter(|&a| a < self.strides.len())
    }
}

impl Walker for OffsetWalker {
    type Item = usize;

    #[inline]
    fn walk(&mut self, axis: usize, delta: isize) {
        if let Some(a) = self.own_axis(axis) {
            self.offset += self.strides[a] * delta;
        }
    }

    #[inline]
    fn reset(&mut self, axis: usize) {
        if let Some(a) = self.own_axis(axis) {
            self.offset -= self.backstrides[a];
        }
    }

    #[inline]
    fn reset_back(&mut self, axis: usize) {
        if let Some(a) = self.own_axis(axis) {
            self.offset += self.backstrides[a];
        }
    }

    #[inline]
    fn get(&self) -> usize {
        self.offset()
    }
}

/// A walker over a strided slice of elements, yielding clones of the elements.
#[derive(Debug)]
pub struct StridedWalker<'a, T> {
    data: &'a [T],
    inner: OffsetWalker,
}

impl<'a, T> StridedWalker<'a, T> {
    /// Creates a walker over `data` starting at `offset`.
    ///
    /// See [`OffsetWalker::new`] for the meaning of `shape`, `strides` and `dim`.
    pub fn new(
        data: &'a [T],
        offset: usize,
        shape: &[usize],
        strides: &[isize],
        dim: usize,
    ) -> Self {
        Self {
            data,
            inner: OffsetWalker::new(offset, shape, strides, dim),
        }
    }

    /// Returns the current element offset into the data.
    #[inline]
    pub fn offset(&self) -> usize {
        self.inner.offset()
    }

    /// Returns a reference to the element under the cursor.
    #[inline]
    pub fn get_ref(&self) -> &'a T {
        &self.data[self.inner.offset()]
    }
}

impl<T> Clone for StridedWalker<'_, T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data,
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + Sync> Walker for StridedWalker<'_, T> {
    type Item = T;

    #[inline]
    fn walk(&mut self, axis: usize, delta: isize) {
        self.inner.walk(axis, delta);
    }

    #[inline]
    fn reset(&mut self, axis: usize) {
        self.inner.reset(axis);
    }

    #[inline]
    fn reset_back(&mut self, axis: usize) {
        self.inner.reset_back(axis);
    }

    #[inline]
    fn get(&self) -> T {
        self.get_ref().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{compute_strides, Order};

    #[test]
    fn test_walk_and_reset_roundtrip() {
        let shape = [4, 2, 3, 4, 5];
        for order in [Order::C, Order::F] {
            let strides = compute_strides(&shape, order);
            let mut walker = OffsetWalker::new(0, &shape, &strides, shape.len());
            for (axis, &extent) in shape.iter().enumerate() {
                let steps = extent as isize - 1;
                let mut forward = walker.clone();
                forward.walk(axis, steps);
                forward.reset(axis);

                let mut backward = walker.clone();
                backward.walk(axis, steps);
                backward.walk(axis, -steps);

                assert_eq!(forward.offset(), 0);
                assert_eq!(backward.offset(), 0);
            }
            walker.walk(1, 1);
            walker.reset_back(4);
            assert_eq!(
                walker.offset() as isize,
                strides[1] + strides[4] * 4,
                "reset_back lands on the last index"
            );
        }
    }

    #[test]
    fn test_broadcast_correction() {
        // a [3] source walked as a [2, 3] tensor
        let mut walker = OffsetWalker::new(0, &[3], &[1], 2);
        walker.walk(0, 1);
        assert_eq!(walker.offset(), 0);
        walker.walk(1, 2);
        assert_eq!(walker.offset(), 2);
        walker.reset(1);
        assert_eq!(walker.offset(), 0);
    }

    #[test]
    fn test_extent_one_axis_does_not_move() {
        let mut walker = OffsetWalker::new(0, &[2, 1], &[1, 1], 2);
        walker.walk(1, 5);
        walker.reset(1);
        assert_eq!(walker.offset(), 0);
        walker.walk(0, 1);
        assert_eq!(walker.offset(), 1);
    }

    #[test]
    fn test_strided_walker_items() {
        let data = [10, 11, 12, 13, 14, 15];
        // transpose of a 2x3 row-major buffer
        let mut walker = StridedWalker::new(&data, 0, &[3, 2], &[1, 3], 2);
        assert_eq!(walker.get(), 10);
        walker.walk(1, 1);
        assert_eq!(walker.get(), 13);
        walker.walk(0, 2);
        assert_eq!(walker.get(), 15);
        walker.reset(0);
        walker.walk(1, -1);
        assert_eq!(walker.get(), 10);
    }
}
