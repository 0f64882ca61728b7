use approx::assert_relative_eq;
use axial_tensor::shape::{compute_strides, numel, unravel_index};
use axial_tensor::{Expr, Order, OffsetWalker, Tensor, TensorError, Traversable, Traverser};

fn modular_tensor(order: Order) -> Result<Tensor<i64>, TensorError> {
    let shape = [4, 2, 3, 4, 5];
    let c = Tensor::from_shape_fn(&shape, |idx| {
        let i = idx
            .iter()
            .zip(compute_strides(&shape, Order::C).iter())
            .map(|(&i, &s)| i as i64 * s as i64)
            .sum::<i64>();
        (5 * i) % 11 - 1
    });
    c.to_tensor_with_order(order)
}

#[test]
fn storage_orders_hold_the_same_values() -> Result<(), TensorError> {
    let c = modular_tensor(Order::C)?;
    let f = modular_tensor(Order::F)?;
    assert_eq!(f.order, Order::F);
    for pos in 0..c.numel() {
        let idx = unravel_index(pos, &c.shape, Order::C);
        assert_eq!(c.get(&idx), f.get(&idx));
    }
    let total: i64 = c.collect_in(Order::F).into_iter().sum();
    assert_eq!(total, 1924);
    Ok(())
}

#[test]
fn every_traverse_order_visits_every_element_once() -> Result<(), TensorError> {
    let shape = [3, 1, 4, 2];
    for storage in [Order::C, Order::F] {
        for order in [Order::C, Order::F] {
            let strides = compute_strides(&shape, storage);
            let walker = OffsetWalker::new(0, &shape, &strides, shape.len());
            let mut offsets: Vec<usize> = Traverser::new(walker, &shape, order)
                .into_iter()
                .collect();
            offsets.sort_unstable();
            assert_eq!(offsets, (0..numel(&shape)).collect::<Vec<_>>());
        }
    }
    Ok(())
}

#[test]
fn strided_view_matches_dense_copy() -> Result<(), TensorError> {
    let t = Tensor::from_shape_vec(&[6, 5], (0..30).collect::<Vec<i32>>())?;
    let v = t
        .view()
        .slice_axis(0, 1, 6, 2)?
        .slice_axis(1, 0, 5, -1)?
        .transpose();
    let dense = v.to_tensor()?;
    assert_eq!(dense.shape.as_slice(), &[5, 3]);
    for order in [Order::C, Order::F] {
        assert_eq!(v.collect_in(order), dense.collect_in(order));
    }
    assert_eq!(dense.get(&[0, 0]), Some(&9));
    assert_eq!(dense.get(&[4, 2]), Some(&25));
    Ok(())
}

#[test]
fn float_expression_over_broadcast_views() -> Result<(), TensorError> {
    let x = Tensor::from_shape_fn(&[3, 4], |idx| idx[0] as f64 + 0.25 * idx[1] as f64);
    let scale = Tensor::from_shape_vec(&[3, 1], vec![1.0, 0.5, 0.1])?;
    let e = Expr::from(&x)
        .mul(Expr::from(&scale))?
        .map(|v| v.sqrt());
    let out = e.eval()?;
    for i in 0..3 {
        for j in 0..4 {
            let expected = ((i as f64 + 0.25 * j as f64) * [1.0, 0.5, 0.1][i]).sqrt();
            let got = out.get(&[i, j]).copied().unwrap_or(f64::NAN);
            assert_relative_eq!(got, expected, epsilon = 1e-12);
        }
    }
    Ok(())
}
