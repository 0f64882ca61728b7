use approx::assert_relative_eq;
use axial_tensor::{Expr, Order, Tensor, Traversable};
use axial_tensor_ops::reducers::{amax, sum};
use axial_tensor_ops::{
    reduce_binary, reduce_range, slide, Axes, ExecutionPolicy, RangeOptions, ReduceOptions,
    TensorOpsError, ThreadPool,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A 4x2x3x4x5 tensor holding `(5 * i) % 11 - 1` at row-major position `i`.
fn modular_tensor(storage: Order) -> Result<Tensor<i64>, TensorOpsError> {
    let data = (0..480i64).map(|i| (5 * i) % 11 - 1).collect();
    let c = Tensor::from_shape_vec(&[4, 2, 3, 4, 5], data)?;
    Ok(c.to_tensor_with_order(storage)?)
}

#[test]
fn full_reduction_is_order_independent() -> Result<(), TensorOpsError> {
    init_logger();
    let pool = ThreadPool::with_threads(4)?;
    let policies = [
        ExecutionPolicy::Serial,
        ExecutionPolicy::parallel(&pool),
        ExecutionPolicy::parallel(&pool).with_max_par_tasks(7)?,
    ];
    for storage in [Order::C, Order::F] {
        let t = modular_tensor(storage)?;
        for order in [Order::C, Order::F] {
            for policy in policies {
                let plain = reduce_binary(
                    policy,
                    &t,
                    Axes::All,
                    |a, b| a + b,
                    ReduceOptions::new().order(order),
                )?;
                assert_eq!(plain.dim(), 0);
                assert_eq!(plain.as_slice(), &[1924]);

                let shifted = reduce_binary(
                    policy,
                    &t,
                    Axes::All,
                    |a, b| a + b,
                    ReduceOptions::new().order(order).initial(-24),
                )?;
                assert_eq!(shifted.as_slice(), &[1900]);
            }
        }
    }
    Ok(())
}

#[test]
fn reduced_axes_shape_law() -> Result<(), TensorOpsError> {
    init_logger();
    let t = modular_tensor(Order::C)?;
    let dropped = sum(ExecutionPolicy::Serial, &t, [3, 4], false)?;
    assert_eq!(dropped.shape.as_slice(), &[4, 2, 3]);
    let kept = sum(ExecutionPolicy::Serial, &t, [-1, -2], true)?;
    assert_eq!(kept.shape.as_slice(), &[4, 2, 3, 1, 1]);
    assert_eq!(dropped.as_slice(), kept.as_slice());

    let all_kept = sum(ExecutionPolicy::Serial, &t, Axes::All, true)?;
    assert_eq!(all_kept.shape.as_slice(), &[1, 1, 1, 1, 1]);
    assert_eq!(all_kept.as_slice(), &[1924]);

    let none = sum(ExecutionPolicy::Serial, &t, Axes::Many(Default::default()), false)?;
    assert_eq!(none.shape, t.shape);
    assert_eq!(none.as_slice(), t.as_slice());
    Ok(())
}

#[test]
fn multi_axis_equals_repeated_single_axis() -> Result<(), TensorOpsError> {
    init_logger();
    let pool = ThreadPool::with_threads(3)?;
    let policy = ExecutionPolicy::parallel(&pool).with_max_par_tasks(5)?;
    for storage in [Order::C, Order::F] {
        let t = modular_tensor(storage)?;
        for a in 0..5isize {
            for b in a + 1..5 {
                for order in [Order::C, Order::F] {
                    let opts = || ReduceOptions::new().order(order);
                    let both = reduce_binary(policy, &t, [a, b], |x, y| x + y, opts())?;
                    let inner = reduce_binary(policy, &t, b, |x, y| x + y, opts())?;
                    let outer = reduce_binary(policy, &inner, a, |x, y| x + y, opts())?;
                    assert_eq!(both.shape, outer.shape);
                    assert_eq!(both.collect_in(Order::C), outer.collect_in(Order::C));
                }
            }
        }
    }
    Ok(())
}

#[test]
fn strided_view_matches_dense_tensor() -> Result<(), TensorOpsError> {
    init_logger();
    let dense = Tensor::from_shape_fn(&[6, 5], |idx| (idx[0] * 5 + idx[1]) as i32 % 7);
    // every other column of `wide` holds the dense values
    let wide = Tensor::from_shape_fn(&[6, 10], |idx| {
        if idx[1] % 2 == 0 {
            (idx[0] * 5 + idx[1] / 2) as i32 % 7
        } else {
            -100
        }
    });
    let strided = wide.view().slice_axis(1, 0, 10, 2)?;
    assert!(!strided.is_trivial(Order::C));

    for axes in [Axes::All, Axes::from(0), Axes::from(1), Axes::from([0, 1])] {
        let lhs = amax(ExecutionPolicy::Serial, &dense, axes.clone(), false)?;
        let rhs = amax(ExecutionPolicy::Serial, &strided, axes.clone(), false)?;
        assert_eq!(lhs.as_slice(), rhs.as_slice());
        let lhs = sum(ExecutionPolicy::Serial, &dense, axes.clone(), true)?;
        let rhs = sum(ExecutionPolicy::Serial, &strided, axes, true)?;
        assert_eq!(lhs.as_slice(), rhs.as_slice());
    }
    Ok(())
}

#[test]
fn zero_size_axes() -> Result<(), TensorOpsError> {
    init_logger();
    let t = Tensor::<i64>::from_shape_vec(&[2, 0, 3], vec![])?;
    let add = |a: i64, b: i64| a + b;

    let err = reduce_binary(ExecutionPolicy::Serial, &t, [1, 2], add, ReduceOptions::new());
    assert_eq!(err.err(), Some(TensorOpsError::EmptyReduction));

    let filled = reduce_binary(
        ExecutionPolicy::Serial,
        &t,
        1,
        add,
        ReduceOptions::new().initial(5).keep_dims(true),
    )?;
    assert_eq!(filled.shape.as_slice(), &[2, 1, 3]);
    assert_eq!(filled.as_slice(), &[5; 6]);

    let empty = reduce_binary(ExecutionPolicy::Serial, &t, 2, add, ReduceOptions::new())?;
    assert_eq!(empty.shape.as_slice(), &[2, 0]);
    assert_eq!(empty.numel(), 0);
    Ok(())
}

#[test]
fn slide_window_count_law() -> Result<(), TensorOpsError> {
    init_logger();
    let t = modular_tensor(Order::F)?;
    for axis in 0..5 {
        let n = t.shape[axis];
        for window_size in 1..=n {
            for window_step in 1..=n {
                let r = slide(
                    ExecutionPolicy::Serial,
                    &t,
                    axis as isize,
                    |_: &[i64], out: &mut [i64]| out.fill(1),
                    window_size,
                    window_step,
                )?;
                assert_eq!(r.shape[axis], (n - window_size) / window_step + 1);
            }
        }
        let too_wide = slide(
            ExecutionPolicy::Serial,
            &t,
            axis as isize,
            |_: &[i64], _: &mut [i64]| {},
            n + 1,
            1,
        );
        assert!(matches!(too_wide, Err(TensorOpsError::InvalidWindow { .. })));
    }
    Ok(())
}

#[test]
fn parallel_float_sum_matches_serial() -> Result<(), TensorOpsError> {
    init_logger();
    let mut rng = StdRng::seed_from_u64(7);
    let data: Vec<f64> = (0..64 * 33).map(|_| rng.random_range(-1.0..1.0)).collect();
    let t = Tensor::from_shape_vec(&[64, 33], data)?;
    let pool = ThreadPool::with_threads(4)?;

    for axes in [Axes::All, Axes::from(0), Axes::from(1)] {
        let serial = sum(ExecutionPolicy::Serial, &t, axes.clone(), false)?;
        let parallel = sum(ExecutionPolicy::parallel(&pool), &t, axes, false)?;
        for (s, p) in serial.as_slice().iter().zip(parallel.as_slice()) {
            assert_relative_eq!(*s, *p, epsilon = 1e-9);
        }
    }

    let view = t.transpose();
    let cols = sum(ExecutionPolicy::parallel(&pool), &view, 1, false)?;
    for j in 0..33 {
        let expected: f64 = (0..64).map(|i| t.as_slice()[i * 33 + j]).sum();
        assert_relative_eq!(cols.as_slice()[j], expected, epsilon = 1e-9);
    }
    Ok(())
}

#[test]
fn broadcast_expression_reduces_like_its_evaluation() -> Result<(), TensorOpsError> {
    init_logger();
    let a = Tensor::from_shape_fn(&[3, 4, 5], |idx| {
        ((idx[0] * 20 + idx[1] * 5 + idx[2]) as i64 * 5) % 11 - 1
    });
    let b = Tensor::from_shape_vec(&[4, 1], vec![2i64, -1, 3, 1])?;
    let broadcast = Expr::from(&a).mul(Expr::from(&b))?.map(|x| x + 1);
    // equal shapes over dense leaves take the flat indexing path
    let flat = Expr::from(&a).add(Expr::from(&a))?;
    assert!(!broadcast.is_trivial(Order::C));
    assert!(flat.is_trivial(Order::C));

    let pool = ThreadPool::with_threads(3)?;
    let policies = [
        ExecutionPolicy::Serial,
        ExecutionPolicy::parallel(&pool).with_max_par_tasks(5)?,
    ];
    let axis_sets = [
        Axes::All,
        Axes::from(0),
        Axes::from(1),
        Axes::from(-1),
        Axes::from([0, 1]),
        Axes::from([1, 2]),
        Axes::from([0, 2]),
    ];
    for e in [&broadcast, &flat] {
        let dense = e.eval()?;
        for policy in policies {
            for order in [Order::C, Order::F] {
                for keep_dims in [false, true] {
                    for axes in axis_sets.iter() {
                        let opts = || ReduceOptions::new().order(order).keep_dims(keep_dims);
                        let lhs = reduce_binary(policy, e, axes.clone(), |x, y| x * 3 + y, opts())?;
                        let rhs = reduce_binary(policy, &dense, axes.clone(), |x, y| x * 3 + y, opts())?;
                        assert_eq!(lhs.shape, rhs.shape);
                        assert_eq!(lhs.as_slice(), rhs.as_slice());

                        let opts = || RangeOptions::new().order(order).keep_dims(keep_dims);
                        let lhs = reduce_range(policy, e, axes.clone(), |w| w.collect::<Vec<_>>(), opts())?;
                        let rhs =
                            reduce_range(policy, &dense, axes.clone(), |w| w.collect::<Vec<_>>(), opts())?;
                        assert_eq!(lhs.shape, rhs.shape);
                        assert_eq!(lhs.as_slice(), rhs.as_slice());
                    }
                }
            }

            for axis in [0, 1, 2] {
                let diffs = |lane: &[i64], out: &mut [i64]| {
                    for (k, o) in out.iter_mut().enumerate() {
                        *o = lane[k + 1] - lane[k];
                    }
                };
                let lhs = slide(policy, e, axis, diffs, 2, 1)?;
                let rhs = slide(policy, &dense, axis, diffs, 2, 1)?;
                assert_eq!(lhs.shape, rhs.shape);
                assert_eq!(lhs.as_slice(), rhs.as_slice());
            }
        }
    }
    Ok(())
}
