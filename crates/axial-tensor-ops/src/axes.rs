use axial_tensor::shape::{normalize_axis, numel, Order, Shape};
use axial_tensor::{TensorError, Traverser, TraverserIter, Walker};
use smallvec::SmallVec;

/// The axes an operation applies to.
///
/// [`Axes::All`] is the "no axes given" form and selects every axis, which
/// flattens the input. An empty [`Axes::Many`] selects no axis at all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Axes {
    /// Every axis.
    #[default]
    All,
    /// A single, possibly negative, axis.
    One(isize),
    /// A set of possibly negative axes.
    Many(SmallVec<[isize; 6]>),
}

impl Axes {
    /// Resolves the axes against a tensor of dimension `dim`, sorted ascending.
    ///
    /// # Errors
    ///
    /// Returns an error for axes outside `[-dim, dim)` and for duplicates.
    pub fn normalize(&self, dim: usize) -> Result<Shape, TensorError> {
        match self {
            Self::All => Ok((0..dim).collect()),
            Self::One(axis) => Ok(smallvec::smallvec![normalize_axis(*axis, dim)?]),
            Self::Many(axes) => normalize_axes(axes, dim),
        }
    }
}

impl From<isize> for Axes {
    fn from(axis: isize) -> Self {
        Self::One(axis)
    }
}

impl From<i32> for Axes {
    fn from(axis: i32) -> Self {
        Self::One(axis as isize)
    }
}

impl From<usize> for Axes {
    fn from(axis: usize) -> Self {
        Self::One(axis as isize)
    }
}

impl<const N: usize> From<[isize; N]> for Axes {
    fn from(axes: [isize; N]) -> Self {
        Self::Many(axes.into_iter().collect())
    }
}

impl<const N: usize> From<[i32; N]> for Axes {
    fn from(axes: [i32; N]) -> Self {
        Self::Many(axes.into_iter().map(|a| a as isize).collect())
    }
}

impl<const N: usize> From<[usize; N]> for Axes {
    fn from(axes: [usize; N]) -> Self {
        Self::Many(axes.into_iter().map(|a| a as isize).collect())
    }
}

impl From<&[isize]> for Axes {
    fn from(axes: &[isize]) -> Self {
        Self::Many(axes.iter().copied().collect())
    }
}

impl From<&[usize]> for Axes {
    fn from(axes: &[usize]) -> Self {
        Self::Many(axes.iter().map(|&a| a as isize).collect())
    }
}

impl From<Vec<isize>> for Axes {
    fn from(axes: Vec<isize>) -> Self {
        Self::Many(axes.into_iter().collect())
    }
}

impl From<Vec<usize>> for Axes {
    fn from(axes: Vec<usize>) -> Self {
        Self::Many(axes.into_iter().map(|a| a as isize).collect())
    }
}

/// Normalizes possibly negative axes against `dim`, sorted ascending.
///
/// # Errors
///
/// Returns [`TensorError::AxisOutOfBounds`] for axes outside `[-dim, dim)` and
/// [`TensorError::DuplicateAxis`] when an axis appears twice.
pub fn normalize_axes(axes: &[isize], dim: usize) -> Result<Shape, TensorError> {
    let mut out = axes
        .iter()
        .map(|&a| normalize_axis(a, dim))
        .collect::<Result<Shape, _>>()?;
    out.sort_unstable();
    if let Some(w) = out.windows(2).find(|w| w[0] == w[1]) {
        return Err(TensorError::DuplicateAxis(w[0]));
    }
    Ok(out)
}

/// Plans the traversal of an axis operation.
///
/// The selected axes are moved to the front of a *traverse shape*, followed by
/// the remaining (complement) axes, both groups keeping their relative order.
/// Traversers built from the plan visit either group while the other stays
/// fixed, which is how reductions enumerate output cells and their windows.
///
/// # Example
///
/// ```
/// use axial_tensor::shape::Order;
/// use axial_tensor_ops::axes::AxesIteratorMaker;
///
/// let maker = AxesIteratorMaker::new(&[4, 2, 3, 4, 5], &[1, 3], Order::C).unwrap();
/// assert_eq!(maker.axes_map(), &[1, 3, 0, 2, 4]);
/// assert_eq!(maker.traverse_shape(), &[2, 4, 4, 3, 5]);
/// assert_eq!(maker.window_size(), 8);
/// assert_eq!(maker.outer_size(), 60);
/// assert_eq!(maker.result_shape(false).as_slice(), &[4, 3, 5]);
/// assert_eq!(maker.result_shape(true).as_slice(), &[4, 1, 3, 1, 5]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxesIteratorMaker {
    shape: Shape,
    order: Order,
    axes: Shape,
    axes_map: Shape,
    traverse_shape: Shape,
    window_size: usize,
    outer_size: usize,
}

impl AxesIteratorMaker {
    /// Plans an operation over the `axes` of a tensor with `shape`.
    ///
    /// # Errors
    ///
    /// Returns an error if an axis is out of range or repeated.
    pub fn new(shape: &[usize], axes: &[usize], order: Order) -> Result<Self, TensorError> {
        let dim = shape.len();
        let mut selected: Shape = axes.into();
        selected.sort_unstable();
        for (i, &axis) in selected.iter().enumerate() {
            if axis >= dim {
                return Err(TensorError::axis_out_of_bounds(axis as isize, dim));
            }
            if i > 0 && selected[i - 1] == axis {
                return Err(TensorError::DuplicateAxis(axis));
            }
        }
        let mut axes_map = selected.clone();
        axes_map.extend((0..dim).filter(|a| selected.binary_search(a).is_err()));
        Ok(Self::from_parts(shape, selected, axes_map, order))
    }

    /// Plans an operation over the single `axis`.
    ///
    /// # Errors
    ///
    /// Returns an error if the axis is out of range.
    pub fn from_axis(shape: &[usize], axis: usize, order: Order) -> Result<Self, TensorError> {
        let dim = shape.len();
        if axis >= dim {
            return Err(TensorError::axis_out_of_bounds(axis as isize, dim));
        }
        let mut axes_map: Shape = smallvec::smallvec![axis];
        axes_map.extend((0..dim).filter(|&a| a != axis));
        Ok(Self::from_parts(
            shape,
            smallvec::smallvec![axis],
            axes_map,
            order,
        ))
    }

    fn from_parts(shape: &[usize], axes: Shape, axes_map: Shape, order: Order) -> Self {
        let traverse_shape: Shape = axes_map.iter().map(|&a| shape[a]).collect();
        let n = axes.len();
        Self {
            shape: shape.into(),
            order,
            window_size: numel(&traverse_shape[..n]),
            outer_size: numel(&traverse_shape[n..]),
            axes,
            axes_map,
            traverse_shape,
        }
    }

    /// Builds a traverser over the selected axes (`inverse = false`) or over the
    /// complement axes (`inverse = true`), starting from the walker's position.
    pub fn create_forward_traverser<W: Walker>(&self, walker: W, inverse: bool) -> Traverser<W> {
        let n = self.axes.len();
        let group = if inverse {
            n..self.axes_map.len()
        } else {
            0..n
        };
        Traverser::with_axes(
            walker,
            &self.traverse_shape[group.clone()],
            &self.axes_map[group],
            self.order,
        )
    }

    /// Iterates the group complementary to `create_forward_traverser(_, inverse)`
    /// starting from the walker's position.
    ///
    /// With `inverse = true` this yields the window of one output cell when `walker`
    /// was taken from a complement traverser.
    pub fn begin_complement<W: Walker>(&self, walker: W, inverse: bool) -> TraverserIter<W> {
        self.create_forward_traverser(walker, !inverse).into_iter()
    }

    /// Shape of the result of reducing the selected axes.
    pub fn result_shape(&self, keep_dims: bool) -> Shape {
        if keep_dims {
            self.shape
                .iter()
                .enumerate()
                .map(|(a, &e)| if self.is_selected(a) { 1 } else { e })
                .collect()
        } else {
            self.complement().iter().map(|&a| self.shape[a]).collect()
        }
    }

    /// Returns `true` if `axis` is selected.
    pub fn is_selected(&self, axis: usize) -> bool {
        self.axes.binary_search(&axis).is_ok()
    }

    /// The input shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The traverse order.
    pub fn order(&self) -> Order {
        self.order
    }

    /// The selected axes, sorted.
    pub fn axes(&self) -> &[usize] {
        &self.axes
    }

    /// The axes that are not selected, ascending.
    pub fn complement(&self) -> &[usize] {
        &self.axes_map[self.axes.len()..]
    }

    /// Traverse axis to input axis.
    pub fn axes_map(&self) -> &[usize] {
        &self.axes_map
    }

    /// Input extents permuted by the axes map.
    pub fn traverse_shape(&self) -> &[usize] {
        &self.traverse_shape
    }

    /// Number of elements per output cell.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Number of output cells.
    pub fn outer_size(&self) -> usize {
        self.outer_size
    }

    /// Returns `true` when the selected axes are the fastest-varying ones of the traverse
    /// order: trailing axes for [`Order::C`], leading axes for [`Order::F`].
    ///
    /// Each output cell is then a contiguous run of positions of a full traversal.
    pub fn is_leading(&self) -> bool {
        let dim = self.shape.len();
        let n = self.axes.len();
        match self.order {
            Order::C => self.axes.iter().copied().eq(dim - n..dim),
            Order::F => self.axes.iter().copied().eq(0..n),
        }
    }
}
