use axial_tensor::shape::{is_contiguous, normalize_axis, Order};
use axial_tensor::{OffsetWalker, Tensor, Traversable};
use rayon::prelude::*;

use crate::axes::AxesIteratorMaker;
use crate::error::TensorOpsError;
use crate::parallel::{par_task_size, ExecutionPolicy};
use crate::slide::map_lanes;

/// Transforms every lane along `axis` of `tensor` in place.
///
/// When the lanes are contiguous runs of the buffer (the last axis of a row-major
/// tensor, the first axis of a column-major one) they are transformed directly in
/// the buffer. Otherwise lanes are gathered and transformed according to `policy`,
/// then written back through the tensor's own strides.
///
/// # Errors
///
/// Returns an axis error if `axis` is out of range.
///
/// # Example
///
/// ```
/// use axial_tensor::Tensor;
/// use axial_tensor_ops::{transform, ExecutionPolicy};
///
/// let mut t = Tensor::from_shape_vec(&[2, 3], vec![3, 1, 2, 6, 5, 4]).unwrap();
/// transform(ExecutionPolicy::Serial, &mut t, 0, |lane: &mut [i32]| lane.reverse()).unwrap();
/// assert_eq!(t.as_slice(), &[6, 5, 4, 3, 1, 2]);
/// ```
pub fn transform<T, F>(
    policy: ExecutionPolicy<'_>,
    tensor: &mut Tensor<T>,
    axis: isize,
    f: F,
) -> Result<(), TensorOpsError>
where
    T: Clone + Send + Sync,
    F: Fn(&mut [T]) + Sync,
{
    let axis = normalize_axis(axis, tensor.dim())?;
    if tensor.numel() == 0 {
        return Ok(());
    }
    let fastest = |order: Order| match order {
        Order::C => axis + 1 == tensor.dim(),
        Order::F => axis == 0,
    };
    if [Order::C, Order::F]
        .into_iter()
        .any(|order| fastest(order) && is_contiguous(&tensor.shape, &tensor.strides, order))
    {
        let lane_len = tensor.shape[axis];
        transform_contiguous(policy, tensor.as_slice_mut(), lane_len, &f);
        return Ok(());
    }

    let maker = AxesIteratorMaker::from_axis(&tensor.shape, axis, Order::C)?;
    let lanes = map_lanes(policy, &*tensor, &maker, |mut lane| {
        f(&mut lane);
        Ok(lane)
    })?;

    let walker = OffsetWalker::new(0, &tensor.shape, &tensor.strides, tensor.dim());
    let mut outer_t = maker.create_forward_traverser(walker, true);
    let mut values = lanes.into_iter();
    let data = tensor.as_slice_mut();
    while !outer_t.is_end() {
        for offset in maker.begin_complement(outer_t.walker().clone(), true) {
            if let Some(v) = values.next() {
                data[offset] = v;
            }
        }
        outer_t.next();
    }
    Ok(())
}

fn transform_contiguous<T, F>(policy: ExecutionPolicy<'_>, data: &mut [T], lane_len: usize, f: &F)
where
    T: Send,
    F: Fn(&mut [T]) + Sync,
{
    match policy {
        ExecutionPolicy::Serial => data.chunks_mut(lane_len).for_each(f),
        ExecutionPolicy::Parallel {
            pool,
            max_par_tasks,
        } => {
            let chunk = par_task_size(data.len() / lane_len, max_par_tasks) * lane_len;
            pool.install(|| {
                data.par_chunks_mut(chunk)
                    .for_each(|lanes| lanes.chunks_mut(lane_len).for_each(f));
            });
        }
    }
}

/// Scans `input` with `f` along `axis`, or over the row-major flattened input when
/// `axis` is `None`.
///
/// Element `i` of every lane becomes `f(out[i - 1], in[i])`.
///
/// # Errors
///
/// Returns an axis error if `axis` is out of range.
pub fn accumulate<E, F>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    axis: Option<isize>,
    f: F,
) -> Result<Tensor<E::Item>, TensorOpsError>
where
    E: Traversable + Sync,
    E::Item: Clone + Send + Sync,
    F: Fn(E::Item, E::Item) -> E::Item + Sync,
{
    let (mut out, axis) = match axis {
        Some(axis) => {
            normalize_axis(axis, input.dim())?;
            (input.to_tensor_with_order(Order::C)?, axis)
        }
        None => (
            Tensor::from_shape_vec(&[input.size()], input.collect_in(Order::C))?,
            0,
        ),
    };
    transform(policy, &mut out, axis, |lane| {
        for i in 1..lane.len() {
            lane[i] = f(lane[i - 1].clone(), lane[i].clone());
        }
    })?;
    Ok(out)
}
