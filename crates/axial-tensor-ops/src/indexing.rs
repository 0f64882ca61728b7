use axial_tensor::shape::{broadcast_shapes, normalize_axis, numel, Order, Shape};
use axial_tensor::{Tensor, TensorError, Traversable, Traverser};
use num_traits::ToPrimitive;

use crate::error::TensorOpsError;
use crate::parallel::{dispatch, ExecutionPolicy};
use crate::reduce::window_of;

fn resolve_index(index: isize, size: usize) -> Result<usize, TensorError> {
    let wrapped = if index < 0 { index + size as isize } else { index };
    if wrapped < 0 || wrapped >= size as isize {
        return Err(TensorError::index_out_of_bounds(index, size));
    }
    Ok(wrapped as usize)
}

/// Picks elements by position, from the flattened input or along `axis`.
///
/// Negative indices count from the end.
///
/// # Arguments
///
/// * `input` - The tensor, view or expression to pick from.
/// * `indices` - The positions to pick.
/// * `axis` - The axis the positions refer to, or `None` for the row-major flattened input.
///
/// # Returns
///
/// A 1-D tensor for `axis = None`, otherwise the input shape with the extent of
/// `axis` replaced by `indices.len()`.
///
/// # Errors
///
/// Returns an index error when a position is out of range.
///
/// # Example
///
/// ```
/// use axial_tensor::Tensor;
/// use axial_tensor_ops::indexing::take;
///
/// let t = Tensor::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
/// assert_eq!(take(&t, &[0, -1], None).unwrap().as_slice(), &[1, 6]);
/// assert_eq!(take(&t, &[2, 0], Some(1)).unwrap().as_slice(), &[3, 1, 6, 4]);
/// ```
pub fn take<E>(
    input: &E,
    indices: &[isize],
    axis: Option<isize>,
) -> Result<Tensor<E::Item>, TensorOpsError>
where
    E: Traversable,
    E::Item: Clone,
{
    let data = input.collect_in(Order::C);
    let Some(axis) = axis else {
        let picked = indices
            .iter()
            .map(|&i| Ok(data[resolve_index(i, data.len())?].clone()))
            .collect::<Result<Vec<_>, TensorError>>()?;
        return Ok(Tensor::from_shape_vec(&[picked.len()], picked)?);
    };

    let shape = input.shape();
    let axis = normalize_axis(axis, shape.len())?;
    let n = shape[axis];
    let resolved = indices
        .iter()
        .map(|&i| resolve_index(i, n))
        .collect::<Result<Vec<_>, _>>()?;
    let outer = numel(&shape[..axis]);
    let inner = numel(&shape[axis + 1..]);

    let mut out = Vec::with_capacity(outer * resolved.len() * inner);
    for o in 0..outer {
        for &i in &resolved {
            let start = (o * n + i) * inner;
            out.extend_from_slice(&data[start..start + inner]);
        }
    }
    let mut out_shape: Shape = shape.iter().copied().collect();
    out_shape[axis] = resolved.len();
    Ok(Tensor::from_shape_vec(&out_shape, out)?)
}

/// Picks one element per position of `indices` along `axis`.
///
/// `indices` has the dimension of `input` and the same extents on every other
/// axis; the result has the shape of `indices`.
///
/// # Errors
///
/// - [`TensorOpsError::ShapeMismatch`] when the shapes do not line up.
/// - An index error when a position is out of range.
///
/// # Example
///
/// ```
/// use axial_tensor::Tensor;
/// use axial_tensor_ops::indexing::take_along_axis;
///
/// let t = Tensor::from_shape_vec(&[2, 3], vec![10, 30, 20, 60, 40, 50]).unwrap();
/// let idx = Tensor::from_shape_vec(&[2, 1], vec![1isize, 0]).unwrap();
/// let picked = take_along_axis(&t, &idx, 1).unwrap();
/// assert_eq!(picked.as_slice(), &[30, 60]);
/// ```
pub fn take_along_axis<E, I>(
    input: &E,
    indices: &I,
    axis: isize,
) -> Result<Tensor<E::Item>, TensorOpsError>
where
    E: Traversable,
    E::Item: Clone,
    I: Traversable<Item = isize>,
{
    let shape = input.shape();
    let idx_shape = indices.shape();
    let axis = normalize_axis(axis, shape.len())?;
    let aligned = idx_shape.len() == shape.len()
        && idx_shape
            .iter()
            .zip(shape)
            .enumerate()
            .all(|(i, (a, b))| i == axis || a == b);
    if !aligned {
        return Err(TensorOpsError::ShapeMismatch(
            shape.to_vec(),
            idx_shape.to_vec(),
        ));
    }

    let data = input.collect_in(Order::C);
    let idx = indices.collect_in(Order::C);
    let n = shape[axis];
    let m = idx_shape[axis];
    let outer = numel(&shape[..axis]);
    let inner = numel(&shape[axis + 1..]);

    let mut out = Vec::with_capacity(idx.len());
    for o in 0..outer {
        for j in 0..m {
            for i in 0..inner {
                let k = resolve_index(idx[(o * m + j) * inner + i], n)?;
                out.push(data[(o * n + k) * inner + i].clone());
            }
        }
    }
    Ok(Tensor::from_shape_vec(idx_shape, out)?)
}

/// Selects the elements of `input` where `mask` is `true`, in row-major order.
///
/// `mask` is broadcast against the shape of `input`.
///
/// # Errors
///
/// Returns [`TensorOpsError::ShapeMismatch`] when `mask` does not broadcast to the input shape.
///
/// # Example
///
/// ```
/// use axial_tensor::Tensor;
/// use axial_tensor_ops::indexing::masked_select;
///
/// let t = Tensor::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
/// let mask = Tensor::from_shape_vec(&[3], vec![true, false, true]).unwrap();
/// assert_eq!(masked_select(&t, &mask).unwrap().as_slice(), &[1, 3, 4, 6]);
/// ```
pub fn masked_select<E, M>(input: &E, mask: &M) -> Result<Tensor<E::Item>, TensorOpsError>
where
    E: Traversable,
    M: Traversable<Item = bool>,
{
    let shape = input.shape();
    let fits = mask.dim() <= shape.len()
        && broadcast_shapes(shape, mask.shape()).is_ok_and(|b| b.as_slice() == shape);
    if !fits {
        return Err(TensorOpsError::ShapeMismatch(
            shape.to_vec(),
            mask.shape().to_vec(),
        ));
    }

    let mask_t = Traverser::new(mask.create_walker(shape.len()), shape, Order::C);
    let picked: Vec<E::Item> = input
        .traverse(Order::C)
        .into_iter()
        .zip(mask_t)
        .filter_map(|(x, keep)| keep.then_some(x))
        .collect();
    Ok(Tensor::from_shape_vec(&[picked.len()], picked)?)
}

fn finite_range<E>(input: &E) -> (f64, f64)
where
    E: Traversable,
    E::Item: ToPrimitive,
{
    let trivial = input.is_trivial(Order::C);
    let (lo, hi) = window_of(input, trivial, Order::C, 0..input.size())
        .filter_map(|x| x.to_f64())
        .filter(|x| x.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        });
    if lo > hi {
        (0.0, 1.0)
    } else {
        (lo, hi)
    }
}

/// Counts the elements of `input` falling in `bins` equal-width bins.
///
/// # Arguments
///
/// * `policy` - How the counting is executed.
/// * `input` - The values to count.
/// * `bins` - The number of bins.
/// * `range` - The `(lower, upper)` bounds; the finite minimum and maximum of the input when `None`.
///
/// # Returns
///
/// The counts, of shape `[bins]`, and the `bins + 1` bin edges. The last bin
/// includes the upper bound; values outside the range and `NaN` are not counted.
///
/// # Errors
///
/// Returns a value error when `bins` is zero or the range is not finite and ordered.
///
/// # Example
///
/// ```
/// use axial_tensor::Tensor;
/// use axial_tensor_ops::{indexing::histogram, ExecutionPolicy};
///
/// let t = Tensor::from_shape_vec(&[5], vec![0.0, 0.5, 1.0, 1.5, 2.0]).unwrap();
/// let (counts, edges) = histogram(ExecutionPolicy::Serial, &t, 2, None).unwrap();
/// assert_eq!(counts.as_slice(), &[2, 3]);
/// assert_eq!(edges.as_slice(), &[0.0, 1.0, 2.0]);
/// ```
pub fn histogram<E>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    bins: usize,
    range: Option<(f64, f64)>,
) -> Result<(Tensor<usize>, Tensor<f64>), TensorOpsError>
where
    E: Traversable + Sync,
    E::Item: ToPrimitive,
{
    if bins == 0 {
        return Err(TensorError::InvalidArgument("histogram needs at least one bin".to_string()).into());
    }
    let (mut lo, mut hi) = match range {
        Some(r) => r,
        None => finite_range(input),
    };
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return Err(
            TensorError::InvalidArgument(format!("invalid histogram range ({lo}, {hi})")).into(),
        );
    }
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    // halves keep the span finite for ranges wider than f64::MAX
    let half_width = hi / 2.0 - lo / 2.0;

    let trivial = input.is_trivial(Order::C);
    let partials = dispatch(policy, input.size(), |r| {
        let mut counts = vec![0usize; bins];
        for v in window_of(input, trivial, Order::C, r).filter_map(|x| x.to_f64()) {
            if !(lo..=hi).contains(&v) {
                continue;
            }
            let b = ((v / 2.0 - lo / 2.0) / half_width * bins as f64) as usize;
            counts[b.min(bins - 1)] += 1;
        }
        Ok(vec![counts])
    })?;
    let counts = partials.into_iter().fold(vec![0usize; bins], |mut acc, part| {
        acc.iter_mut().zip(part).for_each(|(a, p)| *a += p);
        acc
    });
    let edges = (0..=bins)
        .map(|k| {
            let t = k as f64 / bins as f64;
            lo * (1.0 - t) + hi * t
        })
        .collect::<Vec<_>>();

    Ok((
        Tensor::from_shape_vec(&[bins], counts)?,
        Tensor::from_shape_vec(&[bins + 1], edges)?,
    ))
}
