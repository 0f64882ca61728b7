use axial_tensor::shape::{normalize_axis, Order, Shape};
use axial_tensor::{Tensor, Traversable};

use crate::axes::AxesIteratorMaker;
use crate::error::TensorOpsError;
use crate::parallel::{dispatch, ExecutionPolicy};

/// Gathers every lane of a single-axis plan and maps it with `f`.
///
/// Lanes are visited in the traverse order of the complement axes and the outputs
/// are concatenated lane after lane.
pub(crate) fn map_lanes<E, R, F>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    maker: &AxesIteratorMaker,
    f: F,
) -> Result<Vec<R>, TensorOpsError>
where
    E: Traversable + Sync,
    R: Send,
    F: Fn(Vec<E::Item>) -> Result<Vec<R>, TensorOpsError> + Sync,
{
    dispatch(policy, maker.outer_size(), |lanes| {
        let mut outer_t = maker.create_forward_traverser(input.create_walker(input.dim()), true);
        outer_t.to(lanes.start);
        let mut out = Vec::new();
        for _ in lanes {
            let lane = maker
                .begin_complement(outer_t.walker().clone(), true)
                .collect();
            out.extend(f(lane)?);
            outer_t.next();
        }
        Ok(out)
    })
}

/// Builds a row-major tensor from a lane-major buffer produced by [`map_lanes`]
/// over a row-major plan, each lane now holding `lane_len` elements along `axis`.
pub(crate) fn from_lanes<T>(
    data: Vec<T>,
    maker: &AxesIteratorMaker,
    axis: usize,
    lane_len: usize,
) -> Result<Tensor<T>, TensorOpsError>
where
    T: Clone + Send + Sync,
{
    let mut moved: Shape = maker.complement().iter().map(|&a| maker.shape()[a]).collect();
    moved.push(lane_len);
    let dim = moved.len();
    let lanes = Tensor::from_shape_vec(&moved, data)?;
    let perm: Shape = (0..dim)
        .map(|i| match i.cmp(&axis) {
            std::cmp::Ordering::Less => i,
            std::cmp::Ordering::Equal => dim - 1,
            std::cmp::Ordering::Greater => i - 1,
        })
        .collect();
    Ok(lanes.permute_axes(&perm)?.to_tensor()?)
}

/// Applies `f` to every lane along `axis`, producing one output lane per input lane.
///
/// `f` receives the input lane and a destination of
/// `(axis_size - window_size) / window_step + 1` default-initialized elements,
/// which is the number of windows of `window_size` elements taken every
/// `window_step` elements. An input with an empty `axis` yields an empty result.
///
/// # Errors
///
/// - Axis errors for an axis out of range.
/// - [`TensorOpsError::InvalidWindow`] unless `0 < window_size <= axis_size` and
///   `window_step >= 1`.
///
/// # Example
///
/// ```
/// use axial_tensor::Tensor;
/// use axial_tensor_ops::{slide, ExecutionPolicy};
///
/// let t = Tensor::from_shape_vec(&[2, 4], vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
/// let pairs = slide(ExecutionPolicy::Serial, &t, -1, |lane: &[i32], out: &mut [i32]| {
///     for (k, o) in out.iter_mut().enumerate() {
///         *o = lane[k] + lane[k + 1];
///     }
/// }, 2, 1).unwrap();
/// assert_eq!(pairs.shape.as_slice(), &[2, 3]);
/// assert_eq!(pairs.as_slice(), &[3, 5, 7, 11, 13, 15]);
/// ```
pub fn slide<E, R, F>(
    policy: ExecutionPolicy<'_>,
    input: &E,
    axis: isize,
    f: F,
    window_size: usize,
    window_step: usize,
) -> Result<Tensor<R>, TensorOpsError>
where
    E: Traversable + Sync,
    R: Default + Clone + Send + Sync,
    F: Fn(&[E::Item], &mut [R]) + Sync,
{
    let axis = normalize_axis(axis, input.dim())?;
    let axis_size = input.shape()[axis];
    if axis_size == 0 {
        return Ok(Tensor::from_shape_vec(input.shape(), Vec::new())?);
    }
    if window_size == 0 || window_size > axis_size || window_step == 0 {
        return Err(TensorOpsError::InvalidWindow {
            window_size,
            window_step,
            axis_size,
        });
    }
    let out_len = (axis_size - window_size) / window_step + 1;
    let maker = AxesIteratorMaker::from_axis(input.shape(), axis, Order::C)?;
    log::debug!(
        "slide along axis {axis}: {} lanes, {out_len} windows each",
        maker.outer_size()
    );
    let data = map_lanes(policy, input, &maker, |lane| {
        let mut out = vec![R::default(); out_len];
        f(&lane, &mut out);
        Ok(out)
    })?;
    from_lanes(data, &maker, axis, out_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::ThreadPool;

    fn lane_head(lane: &[usize], out: &mut [usize]) {
        out.copy_from_slice(&lane[..out.len()]);
    }

    #[test]
    fn test_window_count_law() -> Result<(), TensorOpsError> {
        let t = Tensor::from_shape_fn(&[3, 10], |idx| idx[1]);
        for (w, s, expected) in [(1, 1, 10), (3, 1, 8), (3, 2, 4), (10, 3, 1), (4, 3, 3)] {
            let r = slide(
                ExecutionPolicy::Serial,
                &t,
                1,
                |lane: &[usize], out: &mut [usize]| {
                    for (k, o) in out.iter_mut().enumerate() {
                        *o = lane[k * s];
                    }
                },
                w,
                s,
            )?;
            assert_eq!(r.shape.as_slice(), &[3, expected]);
            assert_eq!(r.get(&[2, expected - 1]), Some(&((expected - 1) * s)));
        }
        Ok(())
    }

    #[test]
    fn test_invalid_windows() -> Result<(), TensorOpsError> {
        let t = Tensor::from_shape_vec(&[5], vec![0usize; 5])?;
        for (w, s) in [(6, 1), (0, 1), (2, 0)] {
            let r = slide(ExecutionPolicy::Serial, &t, 0, lane_head, w, s);
            assert_eq!(
                r.err(),
                Some(TensorOpsError::InvalidWindow {
                    window_size: w,
                    window_step: s,
                    axis_size: 5
                })
            );
        }
        let empty = Tensor::<usize>::from_shape_vec(&[2, 0], vec![])?;
        let r = slide(ExecutionPolicy::Serial, &empty, 1, lane_head, 3, 1)?;
        assert_eq!(r.shape.as_slice(), &[2, 0]);
        Ok(())
    }

    #[test]
    fn test_slide_middle_axis_parallel() -> Result<(), TensorOpsError> {
        let t = Tensor::from_shape_fn(&[2, 5, 3], |idx| idx[0] * 100 + idx[1] * 10 + idx[2]);
        let pool = ThreadPool::with_threads(2)?;
        let policy = ExecutionPolicy::parallel(&pool).with_max_par_tasks(4)?;
        let serial = slide(ExecutionPolicy::Serial, &t, 1, lane_head, 2, 2)?;
        let parallel = slide(policy, &t, 1, lane_head, 2, 2)?;
        assert_eq!(serial.shape.as_slice(), &[2, 2, 3]);
        assert_eq!(serial.as_slice(), parallel.as_slice());
        assert_eq!(serial.get(&[1, 1, 2]), Some(&112));
        Ok(())
    }
}
