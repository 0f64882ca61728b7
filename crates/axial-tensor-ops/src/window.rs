use std::ops::Range;

use axial_tensor::{Traversable, TraverserIter};

/// The elements of one output cell, handed to a range reduction.
///
/// A window is either a run of flat positions of a trivially indexable input or
/// a walker traversal over the reduced axes. Both yield the elements in the
/// traverse order of the operation.
pub enum Window<'e, E: Traversable + 'e> {
    /// Flat positions of a trivially indexable input.
    Flat {
        /// The input.
        input: &'e E,
        /// Remaining flat positions.
        range: Range<usize>,
    },
    /// A walker traversal.
    Walk(TraverserIter<E::Walker<'e>>),
}

impl<'e, E: Traversable + 'e> Iterator for Window<'e, E> {
    type Item = E::Item;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Flat { input, range } => range.next().map(|i| input.trivial_at(i)),
            Self::Walk(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Flat { range, .. } => range.size_hint(),
            Self::Walk(it) => it.size_hint(),
        }
    }
}

impl<'e, E: Traversable + 'e> ExactSizeIterator for Window<'e, E> {}
