use axial_tensor::shape::{normalize_axis, numel, Order, Shape};
use axial_tensor::{Tensor, Traversable};

use crate::error::TensorOpsError;

/// Joins equally shaped inputs along a new axis inserted at `axis`.
///
/// # Arguments
///
/// * `inputs` - The tensors, views or expressions to stack.
/// * `axis` - Position of the new axis, in `[-dim - 1, dim]`.
///
/// # Errors
///
/// - [`TensorOpsError::EmptyInput`] when `inputs` is empty.
/// - [`TensorOpsError::ShapeMismatch`] when the input shapes differ.
///
/// # Example
///
/// ```
/// use axial_tensor::Tensor;
/// use axial_tensor_ops::manipulation::stack;
///
/// let a = Tensor::from_shape_vec(&[2], vec![1, 2]).unwrap();
/// let b = Tensor::from_shape_vec(&[2], vec![3, 4]).unwrap();
/// let s = stack(&[&a, &b], 1).unwrap();
/// assert_eq!(s.shape.as_slice(), &[2, 2]);
/// assert_eq!(s.as_slice(), &[1, 3, 2, 4]);
/// ```
pub fn stack<E>(inputs: &[&E], axis: isize) -> Result<Tensor<E::Item>, TensorOpsError>
where
    E: Traversable,
    E::Item: Clone,
{
    let first = inputs.first().ok_or(TensorOpsError::EmptyInput("stack"))?;
    let shape = first.shape();
    if let Some(other) = inputs.iter().find(|t| t.shape() != shape) {
        return Err(TensorOpsError::ShapeMismatch(
            shape.to_vec(),
            other.shape().to_vec(),
        ));
    }
    let axis = normalize_axis(axis, shape.len() + 1)?;
    let outer = numel(&shape[..axis]);
    let inner = numel(&shape[axis..]);

    let parts: Vec<Vec<E::Item>> = inputs.iter().map(|t| t.collect_in(Order::C)).collect();
    let mut data = Vec::with_capacity(inner * outer * parts.len());
    for o in 0..outer {
        for part in &parts {
            data.extend_from_slice(&part[o * inner..(o + 1) * inner]);
        }
    }

    let mut out_shape: Shape = shape.iter().copied().collect();
    out_shape.insert(axis, inputs.len());
    Ok(Tensor::from_shape_vec(&out_shape, data)?)
}

/// Joins inputs along the existing `axis`.
///
/// Every input must have the same number of axes and the same extents on all
/// axes but `axis`.
///
/// # Errors
///
/// - [`TensorOpsError::EmptyInput`] when `inputs` is empty.
/// - [`TensorOpsError::ShapeMismatch`] when the shapes cannot be joined.
pub fn concatenate<E>(inputs: &[&E], axis: isize) -> Result<Tensor<E::Item>, TensorOpsError>
where
    E: Traversable,
    E::Item: Clone,
{
    let first = inputs.first().ok_or(TensorOpsError::EmptyInput("concatenate"))?;
    let shape = first.shape();
    let axis = normalize_axis(axis, shape.len())?;
    for t in inputs {
        let joinable = t.dim() == shape.len()
            && t.shape()
                .iter()
                .zip(shape)
                .enumerate()
                .all(|(i, (a, b))| i == axis || a == b);
        if !joinable {
            return Err(TensorOpsError::ShapeMismatch(
                shape.to_vec(),
                t.shape().to_vec(),
            ));
        }
    }

    let outer = numel(&shape[..axis]);
    let parts: Vec<(usize, Vec<E::Item>)> = inputs
        .iter()
        .map(|t| (numel(&t.shape()[axis..]), t.collect_in(Order::C)))
        .collect();
    let mut data = Vec::with_capacity(parts.iter().map(|(_, p)| p.len()).sum());
    for o in 0..outer {
        for (inner, part) in &parts {
            data.extend_from_slice(&part[o * inner..(o + 1) * inner]);
        }
    }

    let mut out_shape: Shape = shape.iter().copied().collect();
    out_shape[axis] = inputs.iter().map(|t| t.shape()[axis]).sum();
    Ok(Tensor::from_shape_vec(&out_shape, data)?)
}
