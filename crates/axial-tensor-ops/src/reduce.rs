use std::ops::Range;

use axial_tensor::{Order, Shape, Tensor, Traversable};

use crate::axes::{Axes, AxesIteratorMaker};
use crate::error::TensorOpsError;
use crate::parallel::{dispatch, ExecutionPolicy};
use crate::window::Window;

/// Options of [`reduce_binary`].
#[derive(Debug, Clone)]
pub struct ReduceOptions<T> {
    /// Keep the reduced axes as extent-1 axes.
    pub keep_dims: bool,
    /// Value every window is folded into; required for zero-size windows.
    pub initial: Option<T>,
    /// Traverse order, which is also the memory order of the result.
    pub order: Order,
}

impl<T> Default for ReduceOptions<T> {
    fn default() -> Self {
        Self {
            keep_dims: false,
            initial: None,
            order: Order::C,
        }
    }
}

impl<T> ReduceOptions<T> {
    /// Default options: drop the reduced axes, no initial value, row-major traversal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the reduced axes are kept.
    pub fn keep_dims(mut self, keep_dims: bool) -> Self {
        self.keep_dims = keep_dims;
        self
    }

    /// Sets the initial value.
    pub fn initial(mut self, initial: T) -> Self {
        self.initial = Some(initial);
        self
    }

    /// Sets the traverse order.
    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }
}

/// Options of [`reduce_range`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeOptions {
    /// Keep the reduced axes as extent-1 axes.
    pub keep_dims: bool,
    /// Traverse in the memory order of the input instead of `order`.
    pub any_order: bool,
    /// Traverse order, which is also the memory order of the result.
    pub order: Order,
}

impl RangeOptions {
    /// Default options: drop the reduced axes, row-major traversal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the reduced axes are kept.
    pub fn keep_dims(mut self, keep_dims: bool) -> Self {
        self.keep_dims = keep_dims;
        self
    }

    /// Lets the engine pick the input's memory order.
    pub fn any_order(mut self, any_order: bool) -> Self {
        self.any_order = any_order;
        self
    }

    /// Sets the traverse order.
    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReducePath {
    /// A single output cell holding the whole input.
    Flatten,
    /// Every output cell is a contiguous run of the full traversal.
    Leading,
    /// Output cells over the complement axes, windows over the selected axes.
    General,
}

#[derive(Debug, Clone)]
pub(crate) struct ReducePlan {
    pub(crate) maker: AxesIteratorMaker,
    pub(crate) path: ReducePath,
    pub(crate) result_shape: Shape,
}

impl ReducePlan {
    pub(crate) fn new(
        shape: &[usize],
        axes: &Axes,
        keep_dims: bool,
        order: Order,
    ) -> Result<Self, TensorOpsError> {
        let selected = axes.normalize(shape.len())?;
        let maker = AxesIteratorMaker::new(shape, &selected, order)?;
        let path = if maker.outer_size() == 1 {
            ReducePath::Flatten
        } else if maker.is_leading() {
            ReducePath::Leading
        } else {
            ReducePath::General
        };
        log::debug!(
            "reduce over axes {:?} of shape {:?} in {:?} order: {:?} path",
            selected.as_slice(),
            shape,
            order,
            path
        );
        Ok(Self {
            result_shape: maker.result_shape(keep_dims),
            maker,
            path,
        })
    }
}

/// Elements at positions `range` of the full traversal of `input` in `order`.
pub(crate) fn window_of<'e, E: Traversable>(
    input: &'e E,
    trivial: bool,
    order: Order,
    range: Range<usize>,
) -> Window<'e, E> {
    if trivial {
        Window::Flat { input, range }
    } else {
        let mut t = input.traverse(order);
        t.to(range.start);
        Window::Walk(t.until(range.end))
    }
}

fn fold<T, I, F>(mut items: I, initial: Option<&T>, f: &F) -> Option<T>
where
    T: Clone,
    I: Iterator<Item = T>,
    F: Fn(T, T) -> T,
{
    let first = match initial {
        Some(init) => init.clone(),
        None => items.next()?,
    };
    Some(items.fold(first, |acc, x| f(acc, x)))
}

/// Reduces `input` over `axes` by folding every window with the binary functor `f`.
///
/// Each output cell is `f(...f(f(initial, x0), x1)..., xn)`, or starts from the
/// first element when no initial value is given. [`Axes::All`] reduces to a
/// 0-dimensional tensor.
///
/// # Errors
///
/// - Axis errors for axes out of range, value errors for duplicated axes.
/// - [`TensorOpsError::EmptyReduction`] when the windows are empty, the result is
///   not, and no initial value was given.
///
/// # Example
///
/// ```
/// use axial_tensor::Tensor;
/// use axial_tensor_ops::{reduce_binary, ExecutionPolicy, ReduceOptions};
///
/// let t = Tensor::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
/// let rows = reduce_binary(ExecutionPolicy::Serial, &t, 1, |a, b| a + b, ReduceOptions::new()).unwrap();
/// assert_eq!(rows.as_slice(), &[6, 15]);
///
/// let all = reduce_binary(ExecutionPolicy::Serial, &t, [0, 1], |a, b| a.max(b), ReduceOptions::new().keep_dims(true)).unwrap();
/// assert_eq!(all.shape.as_slice(), &[1, 1]);
/// assert_eq!(all.as_slice(), &[6]);
/// ```
pub fn reduce_binary<E, F>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    axes: impl Into<Axes>,
    f: F,
    options: ReduceOptions<E::Item>,
) -> Result<Tensor<E::Item>, TensorOpsError>
where
    E: Traversable + Sync,
    E::Item: Clone + Send + Sync,
    F: Fn(E::Item, E::Item) -> E::Item + Sync,
{
    let plan = ReducePlan::new(
        input.shape(),
        &axes.into(),
        options.keep_dims,
        options.order,
    )?;
    run_binary(policy, input, &plan, &f, options.initial.as_ref())
}

pub(crate) fn run_binary<E, F>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    plan: &ReducePlan,
    f: &F,
    initial: Option<&E::Item>,
) -> Result<Tensor<E::Item>, TensorOpsError>
where
    E: Traversable + Sync,
    E::Item: Clone + Send + Sync,
    F: Fn(E::Item, E::Item) -> E::Item + Sync,
{
    let maker = &plan.maker;
    let order = maker.order();
    let window = maker.window_size();
    let outer = maker.outer_size();

    if outer == 0 {
        return Ok(Tensor::from_shape_vec_with_order(
            &plan.result_shape,
            Vec::new(),
            order,
        )?);
    }
    if window == 0 {
        let init = initial.ok_or(TensorOpsError::EmptyReduction)?;
        return Ok(Tensor::from_shape_vec_with_order(
            &plan.result_shape,
            vec![init.clone(); outer],
            order,
        )?);
    }

    let trivial = input.is_trivial(order);
    let cells = match plan.path {
        ReducePath::Flatten => {
            let partials = dispatch(policy, input.size(), |r| {
                Ok(vec![fold(window_of(input, trivial, order, r), None, f)])
            })?;
            let total = partials.into_iter().flatten().reduce(f);
            let value = match (initial, total) {
                (Some(init), Some(total)) => f(init.clone(), total),
                (Some(init), None) => init.clone(),
                (None, Some(total)) => total,
                (None, None) => return Err(TensorOpsError::EmptyReduction),
            };
            vec![value]
        }
        ReducePath::Leading => dispatch(policy, outer, |cells| {
            let mut items = window_of(
                input,
                trivial,
                order,
                cells.start * window..cells.end * window,
            );
            cells
                .map(|_| {
                    fold(items.by_ref().take(window), initial, f)
                        .ok_or(TensorOpsError::EmptyReduction)
                })
                .collect()
        })?,
        ReducePath::General => dispatch(policy, outer, |cells| {
            let mut outer_t = maker.create_forward_traverser(input.create_walker(input.dim()), true);
            outer_t.to(cells.start);
            let mut out = Vec::with_capacity(cells.len());
            for _ in cells {
                let items = maker.begin_complement(outer_t.walker().clone(), true);
                out.push(fold(items, initial, f).ok_or(TensorOpsError::EmptyReduction)?);
                outer_t.next();
            }
            Ok(out)
        })?,
    };

    Ok(Tensor::from_shape_vec_with_order(
        &plan.result_shape,
        cells,
        order,
    )?)
}

/// Reduces `input` over `axes` by handing every whole window to `f`.
///
/// `f` receives an exact-size iterator over the elements of one output cell, in
/// traverse order, and may see an empty window when a reduced axis has extent 0.
/// Extra arguments (weights, quantiles, ...) are captured by the closure.
///
/// # Errors
///
/// Axis errors for axes out of range, value errors for duplicated axes.
///
/// # Example
///
/// ```
/// use axial_tensor::Tensor;
/// use axial_tensor_ops::{reduce_range, ExecutionPolicy, RangeOptions};
///
/// let t = Tensor::from_shape_vec(&[2, 3], vec![3, 1, 2, 9, 7, 8]).unwrap();
/// let spread = reduce_range(ExecutionPolicy::Serial, &t, 1, |w| {
///     let v: Vec<i32> = w.collect();
///     v.iter().max().unwrap() - v.iter().min().unwrap()
/// }, RangeOptions::new()).unwrap();
/// assert_eq!(spread.as_slice(), &[2, 2]);
/// ```
pub fn reduce_range<'e, E, R, F>(
    policy: ExecutionPolicy<'_>,
    input: &'e E,
    axes: impl Into<Axes>,
    f: F,
    options: RangeOptions,
) -> Result<Tensor<R>, TensorOpsError>
where
    E: Traversable + Sync,
    R: Send,
    F: Fn(Window<'e, E>) -> R + Sync,
{
    let order = if options.any_order {
        input.preferred_order()
    } else {
        options.order
    };
    let plan = ReducePlan::new(input.shape(), &axes.into(), options.keep_dims, order)?;
    run_range(policy, input, &plan, &f)
}

pub(crate) fn run_range<'e, E, R, F>(
    policy: ExecutionPolicy<'_>,
    input: &'e E,
    plan: &ReducePlan,
    f: &F,
) -> Result<Tensor<R>, TensorOpsError>
where
    E: Traversable + Sync,
    R: Send,
    F: Fn(Window<'e, E>) -> R + Sync,
{
    let maker = &plan.maker;
    let order = maker.order();
    let window = maker.window_size();
    let trivial = input.is_trivial(order);

    let cells = match plan.path {
        ReducePath::Flatten | ReducePath::Leading => dispatch(policy, maker.outer_size(), |cells| {
            Ok(cells
                .map(|j| f(window_of(input, trivial, order, j * window..(j + 1) * window)))
                .collect())
        })?,
        ReducePath::General => dispatch(policy, maker.outer_size(), |cells| {
            let mut outer_t = maker.create_forward_traverser(input.create_walker(input.dim()), true);
            outer_t.to(cells.start);
            let mut out = Vec::with_capacity(cells.len());
            for _ in cells {
                out.push(f(Window::Walk(
                    maker.begin_complement(outer_t.walker().clone(), true),
                )));
                outer_t.next();
            }
            Ok(out)
        })?,
    };

    Ok(Tensor::from_shape_vec_with_order(
        &plan.result_shape,
        cells,
        order,
    )?)
}
