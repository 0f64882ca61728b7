//! The capability shared by everything the engine can walk.

use crate::error::TensorError;
use crate::shape::{is_contiguous, numel, Order};
use crate::tensor::Tensor;
use crate::traverser::Traverser;
use crate::view::TensorView;
use crate::walker::{StridedWalker, Walker};

/// How a traversable is visited in a given order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalKind {
    /// Element-by-element through a walker driven by a traverser.
    Walker,
    /// Flat indexing `0..size`, valid when the traversal is equivalent to a dense loop.
    TrivialIndexer,
}

/// An array-like object that can be walked element by element.
///
/// Dense tensors, strided views and lazy expressions all implement this trait,
/// and every operation of the engine is written against it.
pub trait Traversable {
    /// The value produced for each element.
    type Item;

    /// The walker type created by [`create_walker`](Self::create_walker).
    type Walker<'a>: Walker<Item = Self::Item>
    where
        Self: 'a;

    /// Returns the logical shape.
    fn shape(&self) -> &[usize];

    /// Creates a walker at the first element for a `dim`-dimensional traversal.
    ///
    /// `dim` may exceed [`dim`](Self::dim), in which case the missing leading axes
    /// are broadcast.
    fn create_walker(&self, dim: usize) -> Self::Walker<'_>;

    /// Returns `true` when visiting the elements in `order` is a flat dense loop.
    fn is_trivial(&self, order: Order) -> bool;

    /// Returns the element at flat position `index` of a trivial traversal.
    ///
    /// Only meaningful when [`is_trivial`](Self::is_trivial) holds for the order used.
    fn trivial_at(&self, index: usize) -> Self::Item;

    /// Returns the order in which the elements are laid out in memory.
    fn preferred_order(&self) -> Order {
        Order::C
    }

    /// Returns the number of axes.
    fn dim(&self) -> usize {
        self.shape().len()
    }

    /// Returns the number of elements.
    fn size(&self) -> usize {
        numel(self.shape())
    }

    /// Returns how a traversal in `order` would proceed.
    fn traversal_kind(&self, order: Order) -> TraversalKind {
        if self.is_trivial(order) {
            TraversalKind::TrivialIndexer
        } else {
            TraversalKind::Walker
        }
    }

    /// Returns a traverser over all elements in `order`.
    fn traverse(&self, order: Order) -> Traverser<Self::Walker<'_>> {
        Traverser::new(self.create_walker(self.dim()), self.shape(), order)
    }

    /// Collects every element in `order`, taking the flat path when possible.
    fn collect_in(&self, order: Order) -> Vec<Self::Item> {
        match self.traversal_kind(order) {
            TraversalKind::TrivialIndexer => (0..self.size()).map(|i| self.trivial_at(i)).collect(),
            TraversalKind::Walker => self.traverse(order).into_iter().collect(),
        }
    }

    /// Materializes the elements into a dense tensor laid out in `order`.
    fn to_tensor_with_order(&self, order: Order) -> Result<Tensor<Self::Item>, TensorError> {
        Tensor::from_shape_vec_with_order(self.shape(), self.collect_in(order), order)
    }
}

impl<T: Clone + Send + Sync> Traversable for Tensor<T> {
    type Item = T;
    type Walker<'a> = StridedWalker<'a, T> where Self: 'a;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn create_walker(&self, dim: usize) -> StridedWalker<'_, T> {
        StridedWalker::new(self.as_slice(), 0, &self.shape, &self.strides, dim)
    }

    fn is_trivial(&self, order: Order) -> bool {
        is_contiguous(&self.shape, &self.strides, order)
    }

    fn trivial_at(&self, index: usize) -> T {
        self.as_slice()[index].clone()
    }

    fn preferred_order(&self) -> Order {
        self.order
    }
}

impl<T: Clone + Send + Sync> Traversable for TensorView<'_, T> {
    type Item = T;
    type Walker<'a> = StridedWalker<'a, T> where Self: 'a;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn create_walker(&self, dim: usize) -> StridedWalker<'_, T> {
        StridedWalker::new(self.as_slice(), self.offset, &self.shape, &self.strides, dim)
    }

    fn is_trivial(&self, order: Order) -> bool {
        self.is_contiguous(order)
    }

    fn trivial_at(&self, index: usize) -> T {
        self.as_slice()[self.offset + index].clone()
    }

    fn preferred_order(&self) -> Order {
        if !self.is_contiguous(Order::C) && self.is_contiguous(Order::F) {
            Order::F
        } else {
            Order::C
        }
    }
}
