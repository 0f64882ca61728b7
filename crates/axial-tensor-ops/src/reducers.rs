use std::cmp::Ordering;

use axial_tensor::shape::{normalize_axis, Order};
use axial_tensor::{Tensor, TensorError, Traversable};
use num_traits::{One, ToPrimitive, Zero};

use crate::axes::Axes;
use crate::error::TensorOpsError;
use crate::parallel::ExecutionPolicy;
use crate::reduce::{reduce_binary, reduce_range, RangeOptions, ReduceOptions};
use crate::slide::slide;
use crate::transform::{accumulate, transform};

/// Compute the sum of the elements over `axes`.
///
/// # Arguments
///
/// * `policy` - How the work is executed.
/// * `input` - The tensor, view or expression to reduce.
/// * `axes` - The axes to sum over.
/// * `keep_dims` - Keep the reduced axes with extent 1.
///
/// # Returns
///
/// A new `Tensor` with the sums. Empty windows sum to zero.
///
/// # Example
///
/// ```
/// use axial_tensor::Tensor;
/// use axial_tensor_ops::{reducers::sum, ExecutionPolicy};
///
/// let t = Tensor::from_shape_vec(&[2, 3], vec![1, 1, 1, 1, 1, 1]).unwrap();
/// let agg = sum(ExecutionPolicy::Serial, &t, 1, true).unwrap();
/// assert_eq!(agg.shape.as_slice(), &[2, 1]);
/// assert_eq!(agg.as_slice(), &[3, 3]);
/// ```
pub fn sum<E>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    axes: impl Into<Axes>,
    keep_dims: bool,
) -> Result<Tensor<E::Item>, TensorOpsError>
where
    E: Traversable + Sync,
    E::Item: Zero + Clone + Send + Sync,
{
    reduce_binary(
        policy,
        input,
        axes,
        |a, b| a + b,
        ReduceOptions::new()
            .keep_dims(keep_dims)
            .initial(E::Item::zero()),
    )
}

/// Compute the product of the elements over `axes`. Empty windows multiply to one.
pub fn prod<E>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    axes: impl Into<Axes>,
    keep_dims: bool,
) -> Result<Tensor<E::Item>, TensorOpsError>
where
    E: Traversable + Sync,
    E::Item: One + Clone + Send + Sync,
{
    reduce_binary(
        policy,
        input,
        axes,
        |a, b| a * b,
        ReduceOptions::new().keep_dims(keep_dims).initial(E::Item::one()),
    )
}

/// Compute the minimum over `axes`.
///
/// # Errors
///
/// Returns [`TensorOpsError::EmptyReduction`] when a window is empty.
pub fn amin<E>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    axes: impl Into<Axes>,
    keep_dims: bool,
) -> Result<Tensor<E::Item>, TensorOpsError>
where
    E: Traversable + Sync,
    E::Item: PartialOrd + Clone + Send + Sync,
{
    reduce_binary(
        policy,
        input,
        axes,
        |a, b| if b < a { b } else { a },
        ReduceOptions::new().keep_dims(keep_dims),
    )
}

/// Compute the maximum over `axes`.
///
/// # Errors
///
/// Returns [`TensorOpsError::EmptyReduction`] when a window is empty.
pub fn amax<E>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    axes: impl Into<Axes>,
    keep_dims: bool,
) -> Result<Tensor<E::Item>, TensorOpsError>
where
    E: Traversable + Sync,
    E::Item: PartialOrd + Clone + Send + Sync,
{
    reduce_binary(
        policy,
        input,
        axes,
        |a, b| if b > a { b } else { a },
        ReduceOptions::new().keep_dims(keep_dims),
    )
}

/// Compute the arithmetic mean over `axes` in double precision.
///
/// Empty windows produce `NaN`.
///
/// # Example
///
/// ```
/// use axial_tensor::Tensor;
/// use axial_tensor_ops::{reducers::mean, Axes, ExecutionPolicy};
///
/// let t = Tensor::from_shape_vec(&[2, 2], vec![1u8, 2, 3, 4]).unwrap();
/// let m = mean(ExecutionPolicy::Serial, &t, Axes::All, false).unwrap();
/// assert_eq!(m.as_slice(), &[2.5]);
/// ```
pub fn mean<E>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    axes: impl Into<Axes>,
    keep_dims: bool,
) -> Result<Tensor<f64>, TensorOpsError>
where
    E: Traversable + Sync,
    E::Item: ToPrimitive,
{
    reduce_range(
        policy,
        input,
        axes,
        |w| {
            let n = w.len();
            w.map(to_f64).sum::<f64>() / n as f64
        },
        RangeOptions::new().keep_dims(keep_dims).any_order(true),
    )
}

/// Compute the median over `axes`; an even count averages the two middle values.
pub fn median<E>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    axes: impl Into<Axes>,
    keep_dims: bool,
) -> Result<Tensor<f64>, TensorOpsError>
where
    E: Traversable + Sync,
    E::Item: ToPrimitive,
{
    quantile(policy, input, 0.5, axes, keep_dims)
}

/// Compute the `q`-th quantile over `axes` with linear interpolation.
///
/// # Arguments
///
/// * `q` - The quantile, in `[0, 1]`.
///
/// # Errors
///
/// Returns a value error when `q` is outside `[0, 1]`.
///
/// # Example
///
/// ```
/// use axial_tensor::Tensor;
/// use axial_tensor_ops::{reducers::quantile, ExecutionPolicy};
///
/// let t = Tensor::from_shape_vec(&[1, 5], vec![5, 1, 4, 2, 3]).unwrap();
/// let q = quantile(ExecutionPolicy::Serial, &t, 0.25, 1, false).unwrap();
/// assert_eq!(q.as_slice(), &[2.0]);
/// ```
pub fn quantile<E>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    q: f64,
    axes: impl Into<Axes>,
    keep_dims: bool,
) -> Result<Tensor<f64>, TensorOpsError>
where
    E: Traversable + Sync,
    E::Item: ToPrimitive,
{
    if !(0.0..=1.0).contains(&q) {
        return Err(TensorError::InvalidArgument(format!("quantile {q} is outside [0, 1]")).into());
    }
    reduce_range(
        policy,
        input,
        axes,
        |w| {
            let mut values: Vec<f64> = w.map(to_f64).collect();
            values.sort_by(f64::total_cmp);
            quantile_sorted(&values, q)
        },
        RangeOptions::new().keep_dims(keep_dims).any_order(true),
    )
}

fn quantile_sorted(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let pos = q * (values.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    values[lo] + (values[hi] - values[lo]) * (pos - lo as f64)
}

fn to_f64<T: ToPrimitive>(x: T) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

/// Compute the weighted average along `axis`.
///
/// # Arguments
///
/// * `weights` - One weight per element of `axis`.
///
/// # Errors
///
/// - [`TensorOpsError::ShapeMismatch`] when `weights` does not match the axis extent.
/// - A value error when the weights sum to zero.
pub fn average<E>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    weights: &[f64],
    axis: isize,
    keep_dims: bool,
) -> Result<Tensor<f64>, TensorOpsError>
where
    E: Traversable + Sync,
    E::Item: ToPrimitive,
{
    let axis_size = input.shape()[normalize_axis(axis, input.dim())?];
    if weights.len() != axis_size {
        return Err(TensorOpsError::ShapeMismatch(
            vec![weights.len()],
            vec![axis_size],
        ));
    }
    let total: f64 = weights.iter().sum();
    if total == 0.0 {
        return Err(TensorError::InvalidArgument("weights sum to zero".to_string()).into());
    }
    reduce_range(
        policy,
        input,
        axis,
        |w| {
            w.zip(weights)
                .map(|(x, &wt)| to_f64(x) * wt)
                .sum::<f64>()
                / total
        },
        RangeOptions::new().keep_dims(keep_dims),
    )
}

fn arg_extreme<E>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    axis: isize,
    wanted: Ordering,
) -> Result<Tensor<usize>, TensorOpsError>
where
    E: Traversable + Sync,
    E::Item: PartialOrd,
{
    let axis = normalize_axis(axis, input.dim())?;
    if input.shape()[axis] == 0 {
        return Err(TensorOpsError::EmptyReduction);
    }
    reduce_range(
        policy,
        input,
        axis as isize,
        |w| {
            let mut best: Option<(usize, E::Item)> = None;
            for (i, x) in w.enumerate() {
                let better = match &best {
                    Some((_, b)) => x.partial_cmp(b) == Some(wanted),
                    None => true,
                };
                if better {
                    best = Some((i, x));
                }
            }
            best.map_or(0, |(i, _)| i)
        },
        RangeOptions::new(),
    )
}

/// Index of the first minimum along `axis`.
///
/// # Errors
///
/// Returns [`TensorOpsError::EmptyReduction`] when `axis` has extent 0.
pub fn argmin<E>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    axis: isize,
) -> Result<Tensor<usize>, TensorOpsError>
where
    E: Traversable + Sync,
    E::Item: PartialOrd,
{
    arg_extreme(policy, input, axis, Ordering::Less)
}

/// Index of the first maximum along `axis`.
///
/// # Errors
///
/// Returns [`TensorOpsError::EmptyReduction`] when `axis` has extent 0.
pub fn argmax<E>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    axis: isize,
) -> Result<Tensor<usize>, TensorOpsError>
where
    E: Traversable + Sync,
    E::Item: PartialOrd,
{
    arg_extreme(policy, input, axis, Ordering::Greater)
}

/// Cumulative sum along `axis`, or over the flattened input when `axis` is `None`.
///
/// # Example
///
/// ```
/// use axial_tensor::Tensor;
/// use axial_tensor_ops::{reducers::cumsum, ExecutionPolicy};
///
/// let t = Tensor::from_shape_vec(&[2, 2], vec![1, 2, 3, 4]).unwrap();
/// let c = cumsum(ExecutionPolicy::Serial, &t, None).unwrap();
/// assert_eq!(c.as_slice(), &[1, 3, 6, 10]);
/// ```
pub fn cumsum<E>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    axis: Option<isize>,
) -> Result<Tensor<E::Item>, TensorOpsError>
where
    E: Traversable + Sync,
    E::Item: Zero + Clone + Send + Sync,
{
    accumulate(policy, input, axis, |a, b| a + b)
}

/// Cumulative product along `axis`, or over the flattened input when `axis` is `None`.
pub fn cumprod<E>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    axis: Option<isize>,
) -> Result<Tensor<E::Item>, TensorOpsError>
where
    E: Traversable + Sync,
    E::Item: One + Clone + Send + Sync,
{
    accumulate(policy, input, axis, |a, b| a * b)
}

/// Sum of every `window_size` consecutive elements along `axis`.
///
/// # Errors
///
/// Returns [`TensorOpsError::InvalidWindow`] unless `0 < window_size <= axis size`.
pub fn moving_sum<E>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    axis: isize,
    window_size: usize,
) -> Result<Tensor<E::Item>, TensorOpsError>
where
    E: Traversable + Sync,
    E::Item: Zero + Default + Clone + Send + Sync,
{
    slide(
        policy,
        input,
        axis,
        |lane: &[E::Item], out: &mut [E::Item]| {
            for (k, o) in out.iter_mut().enumerate() {
                *o = lane[k..k + window_size]
                    .iter()
                    .cloned()
                    .fold(E::Item::zero(), |a, b| a + b);
            }
        },
        window_size,
        1,
    )
}

/// Sort every lane along `axis` in place, ascending.
///
/// Values that do not compare equal to themselves (`NaN`) are placed last.
pub fn sort<T>(
    policy: ExecutionPolicy<'_>,
    tensor: &mut Tensor<T>,
    axis: isize,
) -> Result<(), TensorOpsError>
where
    T: PartialOrd + Clone + Send + Sync,
{
    transform(policy, tensor, axis, |lane| {
        lane.sort_by(nan_last)
    })
}

fn nan_last<T: PartialOrd>(a: &T, b: &T) -> Ordering {
    a.partial_cmp(b).unwrap_or_else(|| {
        let a_nan = a.partial_cmp(a).is_none();
        let b_nan = b.partial_cmp(b).is_none();
        a_nan.cmp(&b_nan)
    })
}

/// Return a sorted copy of `input` along `axis`, laid out row-major.
pub fn sorted<E>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    axis: isize,
) -> Result<Tensor<E::Item>, TensorOpsError>
where
    E: Traversable,
    E::Item: PartialOrd + Clone + Send + Sync,
{
    let mut out = input.to_tensor_with_order(Order::C)?;
    sort(policy, &mut out, axis)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::ThreadPool;
    use approx::assert_relative_eq;

    #[test]
    fn test_sum_prod() -> Result<(), TensorOpsError> {
        let t = Tensor::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6])?;
        assert_eq!(sum(ExecutionPolicy::Serial, &t, 0, false)?.as_slice(), &[5, 7, 9]);
        assert_eq!(sum(ExecutionPolicy::Serial, &t, Axes::All, false)?.as_slice(), &[21]);
        assert_eq!(prod(ExecutionPolicy::Serial, &t, -1, false)?.as_slice(), &[6, 120]);

        let empty = Tensor::<i32>::from_shape_vec(&[2, 0], vec![])?;
        assert_eq!(sum(ExecutionPolicy::Serial, &empty, 1, false)?.as_slice(), &[0, 0]);
        assert_eq!(prod(ExecutionPolicy::Serial, &empty, 1, false)?.as_slice(), &[1, 1]);
        Ok(())
    }

    #[test]
    fn test_min_max() -> Result<(), TensorOpsError> {
        let t = Tensor::from_shape_vec(&[2, 3], vec![4.0, -1.0, 3.5, 0.0, 8.0, 2.0])?;
        assert_eq!(amin(ExecutionPolicy::Serial, &t, 1, false)?.as_slice(), &[-1.0, 0.0]);
        assert_eq!(amax(ExecutionPolicy::Serial, &t, 0, true)?.as_slice(), &[4.0, 8.0, 3.5]);
        assert_eq!(argmin(ExecutionPolicy::Serial, &t, 1)?.as_slice(), &[1, 0]);
        assert_eq!(argmax(ExecutionPolicy::Serial, &t, 0)?.as_slice(), &[0, 1, 0]);

        let empty = Tensor::<f32>::from_shape_vec(&[3, 0], vec![])?;
        assert_eq!(
            amax(ExecutionPolicy::Serial, &empty, 1, false).err(),
            Some(TensorOpsError::EmptyReduction)
        );
        assert_eq!(
            argmax(ExecutionPolicy::Serial, &empty, 1).err(),
            Some(TensorOpsError::EmptyReduction)
        );
        Ok(())
    }

    #[test]
    fn test_argmin_keeps_first() -> Result<(), TensorOpsError> {
        let t = Tensor::from_shape_vec(&[5], vec![3, 1, 2, 1, 7])?;
        assert_eq!(argmin(ExecutionPolicy::Serial, &t, 0)?.as_slice(), &[1]);
        Ok(())
    }

    #[test]
    fn test_mean_median_quantile() -> Result<(), TensorOpsError> {
        let t = Tensor::from_shape_vec(&[2, 4], vec![4, 1, 3, 2, 10, 0, 0, 6])?;
        let m = mean(ExecutionPolicy::Serial, &t, 1, false)?;
        assert_relative_eq!(m.as_slice()[0], 2.5);
        assert_relative_eq!(m.as_slice()[1], 4.0);

        let med = median(ExecutionPolicy::Serial, &t, 1, false)?;
        assert_relative_eq!(med.as_slice()[0], 2.5);
        assert_relative_eq!(med.as_slice()[1], 3.0);

        let q = quantile(ExecutionPolicy::Serial, &t, 1.0, Axes::All, true)?;
        assert_eq!(q.shape.as_slice(), &[1, 1]);
        assert_relative_eq!(q.as_slice()[0], 10.0);

        assert!(quantile(ExecutionPolicy::Serial, &t, 1.5, 0, false).is_err());

        let empty = Tensor::<f32>::from_shape_vec(&[2, 0], vec![])?;
        assert!(mean(ExecutionPolicy::Serial, &empty, 1, false)?.as_slice()[0].is_nan());
        Ok(())
    }

    #[test]
    fn test_average() -> Result<(), TensorOpsError> {
        let t = Tensor::from_shape_vec(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
        let avg = average(ExecutionPolicy::Serial, &t, &[1.0, 0.0, 3.0], 1, false)?;
        assert_relative_eq!(avg.as_slice()[0], 2.5);
        assert_relative_eq!(avg.as_slice()[1], 5.5);

        assert_eq!(
            average(ExecutionPolicy::Serial, &t, &[1.0, 1.0], 1, false).err(),
            Some(TensorOpsError::ShapeMismatch(vec![2], vec![3]))
        );
        assert!(average(ExecutionPolicy::Serial, &t, &[1.0, -1.0], 0, false).is_err());
        Ok(())
    }

    #[test]
    fn test_cumulative_and_moving() -> Result<(), TensorOpsError> {
        let t = Tensor::from_shape_vec(&[2, 4], vec![1, 2, 3, 4, 5, 6, 7, 8])?;
        assert_eq!(
            cumsum(ExecutionPolicy::Serial, &t, Some(0))?.as_slice(),
            &[1, 2, 3, 4, 6, 8, 10, 12]
        );
        assert_eq!(
            cumprod(ExecutionPolicy::Serial, &t, Some(1))?.as_slice(),
            &[1, 2, 6, 24, 5, 30, 210, 1680]
        );
        let ms = moving_sum(ExecutionPolicy::Serial, &t, 1, 3)?;
        assert_eq!(ms.shape.as_slice(), &[2, 2]);
        assert_eq!(ms.as_slice(), &[6, 9, 18, 21]);
        Ok(())
    }

    #[test]
    fn test_sort_parallel() -> Result<(), TensorOpsError> {
        let pool = ThreadPool::with_threads(2)?;
        let policy = ExecutionPolicy::parallel(&pool);
        let t = Tensor::from_shape_vec(&[2, 3], vec![3.0, f64::NAN, 1.0, 0.5, -2.0, 9.0])?;
        let s = sorted(policy, &t.transpose(), 0)?;
        assert_eq!(s.shape.as_slice(), &[3, 2]);
        assert_eq!(s.get(&[0, 0]), Some(&1.0));
        assert_eq!(s.get(&[1, 0]), Some(&3.0));
        assert!(s.get(&[2, 0]).is_some_and(|x| x.is_nan()));
        assert_eq!(s.get(&[0, 1]), Some(&-2.0));
        assert_eq!(s.get(&[1, 1]), Some(&0.5));
        assert_eq!(s.get(&[2, 1]), Some(&9.0));

        let mut ints = Tensor::from_shape_vec(&[2, 3], vec![3, 2, 1, 6, 4, 5])?;
        sort(policy, &mut ints, -1)?;
        assert_eq!(ints.as_slice(), &[1, 2, 3, 4, 5, 6]);
        Ok(())
    }
}
