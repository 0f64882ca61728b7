#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `axial-tensor` provides dynamically ranked, strided N-dimensional arrays and the
//! machinery to walk them: any array-like object (dense tensor, strided view or lazy
//! elementwise expression) can be visited element by element, in row-major or
//! column-major order, with broadcasting of lower-rank operands.
//!
//! # Architecture
//!
//! - **Shape model**: [`shape`] computes physical, adapted and reset strides.
//! - **Walker**: a cursor applying stride arithmetic along logical axes.
//! - **Traverser**: an odometer driving a walker over a multi-index space, with
//!   forward, backward and random-access moves.
//! - **Traversable**: the capability trait shared by [`Tensor`], [`TensorView`] and
//!   [`Expr`], choosing between a flat loop and a walker traversal.
//!
//! # Quick Start
//!
//! ```rust
//! use axial_tensor::{shape::Order, Expr, Tensor, Traversable};
//!
//! let a = Tensor::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
//!
//! // column-major visit of a row-major tensor
//! let items: Vec<i32> = a.traverse(Order::F).into_iter().collect();
//! assert_eq!(items, vec![1, 4, 2, 5, 3, 6]);
//!
//! // broadcast a row against the tensor
//! let row = Tensor::from_shape_vec(&[3], vec![1, 1, 1]).unwrap();
//! let sum = Expr::from(&a).add(Expr::from(&row)).unwrap().eval().unwrap();
//! assert_eq!(sum.as_slice(), &[2, 3, 4, 5, 6, 7]);
//! ```

/// Error types for tensor construction and views.
pub mod error;
pub mod expr;
pub mod shape;
pub mod storage;

/// Dense owned tensors.
///
/// This module provides the core [`tensor::Tensor`] struct.
pub mod tensor;

pub mod traversable;
pub mod traverser;

/// Non-owning strided views.
///
/// This module provides [`view::TensorView`] for zero-copy slicing, transposition
/// and broadcasting of existing tensor data.
pub mod view;

pub mod walker;

pub use crate::error::{ErrorKind, TensorError};
pub use crate::expr::{Expr, ExprWalker};
pub use crate::shape::{Order, Shape, Strides};
pub use crate::storage::TensorStorage;
pub use crate::tensor::Tensor;
pub use crate::traversable::{TraversalKind, Traversable};
pub use crate::traverser::{Traverser, TraverserIter};
pub use crate::view::TensorView;
pub use crate::walker::{OffsetWalker, StridedWalker, Walker};
