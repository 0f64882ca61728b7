//! Odometer-style traversal of a multi-index space.

use crate::shape::{numel, strides_div, Order, Shape};
use crate::walker::Walker;

/// Drives a [`Walker`] through every multi-index of a shape in a given order.
///
/// The traverser owns its walker and a pristine copy of it (the origin), the
/// traverse extents, and an axes map telling which walker axis each traverse
/// axis moves. Positions range over `[0, size]`, `size` being the end sentinel.
/// Once the last position is passed the walker is back at the origin.
///
/// # Example
///
/// ```
/// use axial_tensor::shape::Order;
/// use axial_tensor::traverser::Traverser;
/// use axial_tensor::walker::OffsetWalker;
///
/// // walk a 2x3 row-major buffer in column-major order
/// let walker = OffsetWalker::new(0, &[2, 3], &[3, 1], 2);
/// let offsets: Vec<usize> = Traverser::new(walker, &[2, 3], Order::F).into_iter().collect();
/// assert_eq!(offsets, vec![0, 3, 1, 4, 2, 5]);
/// ```
#[derive(Debug, Clone)]
pub struct Traverser<W> {
    walker: W,
    origin: W,
    extents: Shape,
    axes: Shape,
    order: Order,
    div: Shape,
    index: Shape,
    position: usize,
    size: usize,
}

impl<W: Walker> Traverser<W> {
    /// Creates a traverser visiting every index of `shape`, axis `k` moving walker axis `k`.
    pub fn new(walker: W, shape: &[usize], order: Order) -> Self {
        Self::with_axes(walker, shape, &(0..shape.len()).collect::<Shape>(), order)
    }

    /// Creates a traverser over `extents` where traverse axis `k` moves walker axis `axes[k]`.
    pub fn with_axes(walker: W, extents: &[usize], axes: &[usize], order: Order) -> Self {
        debug_assert_eq!(extents.len(), axes.len());
        Self {
            origin: walker.clone(),
            walker,
            extents: extents.into(),
            axes: axes.into(),
            order,
            div: strides_div(extents, order),
            index: smallvec::smallvec![0; extents.len()],
            position: 0,
            size: numel(extents),
        }
    }

    /// Advances to the next position in traverse order.
    ///
    /// Calling this at the end sentinel does nothing.
    pub fn next(&mut self) {
        if self.position >= self.size {
            return;
        }
        self.position += 1;
        let dim = self.extents.len();
        for step in 0..dim {
            let k = self.order.fast_axis(step, dim);
            if self.index[k] + 1 < self.extents[k] {
                self.index[k] += 1;
                self.walker.walk(self.axes[k], 1);
                return;
            }
            self.index[k] = 0;
            self.walker.reset(self.axes[k]);
        }
    }

    /// Steps back to the previous position.
    ///
    /// From the end sentinel this moves to the last element; at position 0 it does nothing.
    pub fn prev(&mut self) {
        if self.position == 0 {
            return;
        }
        if self.position >= self.size {
            self.to(self.size - 1);
            return;
        }
        self.position -= 1;
        let dim = self.extents.len();
        for step in 0..dim {
            let k = self.order.fast_axis(step, dim);
            if self.index[k] > 0 {
                self.index[k] -= 1;
                self.walker.walk(self.axes[k], -1);
                return;
            }
            self.index[k] = self.extents[k] - 1;
            self.walker.reset_back(self.axes[k]);
        }
    }

    /// Jumps to the absolute position `pos`; anything at or past `size` is the end sentinel.
    pub fn to(&mut self, pos: usize) {
        self.walker = self.origin.clone();
        self.index.iter_mut().for_each(|i| *i = 0);
        if pos >= self.size {
            self.position = self.size;
            return;
        }
        for k in 0..self.extents.len() {
            let i = (pos / self.div[k]) % self.extents[k];
            self.index[k] = i;
            if i > 0 {
                self.walker.walk(self.axes[k], i as isize);
            }
        }
        self.position = pos;
    }

    /// Returns the element under the cursor.
    #[inline]
    pub fn get(&self) -> W::Item {
        self.walker.get()
    }

    /// Returns the walker at the current position.
    #[inline]
    pub fn walker(&self) -> &W {
        &self.walker
    }

    /// Returns the current multi-index, in traverse axes.
    #[inline]
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Returns the traverse extents.
    #[inline]
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// Returns the traverse order.
    #[inline]
    pub fn order(&self) -> Order {
        self.order
    }

    /// Returns the current position.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of positions.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` at the end sentinel.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.position >= self.size
    }

    /// Yields items from the current position up to, not including, `end`.
    pub fn until(self, end: usize) -> TraverserIter<W> {
        let end = end.min(self.size);
        TraverserIter { inner: self, end }
    }
}

impl<W: Walker> IntoIterator for Traverser<W> {
    type Item = W::Item;
    type IntoIter = TraverserIter<W>;

    fn into_iter(self) -> Self::IntoIter {
        let end = self.size;
        self.until(end)
    }
}

/// Iterator adapter over a [`Traverser`] yielding the walker items.
#[derive(Debug, Clone)]
pub struct TraverserIter<W> {
    inner: Traverser<W>,
    end: usize,
}

impl<W: Walker> Iterator for TraverserIter<W> {
    type Item = W::Item;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.inner.position >= self.end {
            return None;
        }
        let item = self.inner.get();
        self.inner.next();
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end.saturating_sub(self.inner.position);
        (n, Some(n))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        let target = self.inner.position.saturating_add(n);
        if target >= self.end {
            self.inner.to(self.end);
            return None;
        }
        self.inner.to(target);
        self.next()
    }
}

impl<W: Walker> ExactSizeIterator for TraverserIter<W> {}
