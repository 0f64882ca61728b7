//! Lazily evaluated elementwise expressions with broadcasting.
//!
//! An [`Expr`] is a tree whose leaves are strided views or scalars and whose inner
//! nodes apply a unary or binary operator. Nothing is computed until the tree is
//! traversed, either directly by the reduction engine or through [`Expr::eval`].

use std::fmt;
use std::sync::Arc;

use crate::error::TensorError;
use crate::shape::{broadcast_shapes, Order, Shape};
use crate::tensor::Tensor;
use crate::traversable::Traversable;
use crate::view::TensorView;
use crate::walker::{StridedWalker, Walker};

/// A shared unary operator.
pub type UnaryOp<'a, T> = Arc<dyn Fn(T) -> T + Send + Sync + 'a>;

/// A shared binary operator.
pub type BinaryOp<'a, T> = Arc<dyn Fn(T, T) -> T + Send + Sync + 'a>;

/// A node of an elementwise expression tree.
///
/// # Example
///
/// ```
/// use axial_tensor::{Expr, Tensor};
///
/// let a = Tensor::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
/// let b = Tensor::from_shape_vec(&[3], vec![10, 20, 30]).unwrap();
///
/// let e = Expr::from(&a).add(Expr::from(&b)).unwrap().map(|x| x * 2);
/// assert_eq!(e.shape(), &[2, 3]);
/// assert_eq!(e.eval().unwrap().as_slice(), &[22, 44, 66, 28, 50, 72]);
/// ```
pub enum Expr<'a, T> {
    /// A strided view of existing data.
    Leaf(TensorView<'a, T>),
    /// A 0-dimensional constant.
    Scalar(T),
    /// An operator applied to every element of `arg`.
    Unary {
        /// The operator.
        op: UnaryOp<'a, T>,
        /// The operand.
        arg: Box<Expr<'a, T>>,
        /// The shape of the node.
        shape: Shape,
    },
    /// An operator applied to the broadcast pair of `lhs` and `rhs`.
    Binary {
        /// The operator.
        op: BinaryOp<'a, T>,
        /// The left operand.
        lhs: Box<Expr<'a, T>>,
        /// The right operand.
        rhs: Box<Expr<'a, T>>,
        /// The broadcast shape of the operands.
        shape: Shape,
    },
}

impl<T: Clone> Clone for Expr<'_, T> {
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(view) => Self::Leaf(view.clone()),
            Self::Scalar(value) => Self::Scalar(value.clone()),
            Self::Unary { op, arg, shape } => Self::Unary {
                op: Arc::clone(op),
                arg: arg.clone(),
                shape: shape.clone(),
            },
            Self::Binary { op, lhs, rhs, shape } => Self::Binary {
                op: Arc::clone(op),
                lhs: lhs.clone(),
                rhs: rhs.clone(),
                shape: shape.clone(),
            },
        }
    }
}

impl<T> fmt::Debug for Expr<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(view) => f.debug_tuple("Leaf").field(&view.shape).finish(),
            Self::Scalar(_) => f.write_str("Scalar"),
            Self::Unary { arg, shape, .. } => f
                .debug_struct("Unary")
                .field("arg", arg)
                .field("shape", shape)
                .finish(),
            Self::Binary { lhs, rhs, shape, .. } => f
                .debug_struct("Binary")
                .field("lhs", lhs)
                .field("rhs", rhs)
                .field("shape", shape)
                .finish(),
        }
    }
}

impl<'a, T> From<&'a Tensor<T>> for Expr<'a, T> {
    fn from(tensor: &'a Tensor<T>) -> Self {
        Self::Leaf(tensor.view())
    }
}

impl<'a, T> From<TensorView<'a, T>> for Expr<'a, T> {
    fn from(view: TensorView<'a, T>) -> Self {
        Self::Leaf(view)
    }
}

impl<'a, T: 'a> Expr<'a, T> {
    /// Wraps a constant.
    pub fn scalar(value: T) -> Self {
        Self::Scalar(value)
    }

    /// Returns the shape of the expression.
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Leaf(view) => &view.shape,
            Self::Scalar(_) => &[],
            Self::Unary { shape, .. } | Self::Binary { shape, .. } => shape,
        }
    }

    /// Applies `f` to every element.
    pub fn map<F>(self, f: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'a,
    {
        let shape = self.shape().into();
        Self::Unary {
            op: Arc::new(f),
            arg: Box::new(self),
            shape,
        }
    }

    /// Combines two expressions elementwise after broadcasting them.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::BroadcastError`] if the shapes are incompatible.
    pub fn zip_with<F>(self, other: Self, f: F) -> Result<Self, TensorError>
    where
        F: Fn(T, T) -> T + Send + Sync + 'a,
    {
        let shape = broadcast_shapes(self.shape(), other.shape())?;
        Ok(Self::Binary {
            op: Arc::new(f),
            lhs: Box::new(self),
            rhs: Box::new(other),
            shape,
        })
    }

    /// Elementwise `self + other`.
    pub fn add(self, other: Self) -> Result<Self, TensorError>
    where
        T: std::ops::Add<Output = T>,
    {
        self.zip_with(other, |a, b| a + b)
    }

    /// Elementwise `self - other`.
    pub fn sub(self, other: Self) -> Result<Self, TensorError>
    where
        T: std::ops::Sub<Output = T>,
    {
        self.zip_with(other, |a, b| a - b)
    }

    /// Elementwise `self * other`.
    pub fn mul(self, other: Self) -> Result<Self, TensorError>
    where
        T: std::ops::Mul<Output = T>,
    {
        self.zip_with(other, |a, b| a * b)
    }

    /// Elementwise `self / other`.
    pub fn div(self, other: Self) -> Result<Self, TensorError>
    where
        T: std::ops::Div<Output = T>,
    {
        self.zip_with(other, |a, b| a / b)
    }

    fn leaves_dense(&self, shape: &[usize], order: Order) -> bool {
        match self {
            Self::Leaf(view) => view.shape.as_slice() == shape && view.is_contiguous(order),
            Self::Scalar(_) => true,
            Self::Unary { arg, .. } => arg.leaves_dense(shape, order),
            Self::Binary { lhs, rhs, .. } => {
                lhs.leaves_dense(shape, order) && rhs.leaves_dense(shape, order)
            }
        }
    }
}

impl<T: Clone + Send + Sync> Expr<'_, T> {
    /// Evaluates the expression into a new row-major tensor.
    pub fn eval(&self) -> Result<Tensor<T>, TensorError> {
        self.to_tensor_with_order(Order::C)
    }

    /// Evaluates the expression into a new tensor laid out in `order`.
    pub fn eval_with_order(&self, order: Order) -> Result<Tensor<T>, TensorError> {
        self.to_tensor_with_order(order)
    }
}

/// The walker of an [`Expr`], mirroring the tree with one child walker per leaf.
pub enum ExprWalker<'a, T> {
    /// Walks a leaf view.
    Leaf(StridedWalker<'a, T>),
    /// Yields a constant.
    Scalar(T),
    /// Applies a unary operator to the child's item.
    Unary {
        /// The operator.
        op: UnaryOp<'a, T>,
        /// The child walker.
        arg: Box<ExprWalker<'a, T>>,
    },
    /// Applies a binary operator to the children's items.
    Binary {
        /// The operator.
        op: BinaryOp<'a, T>,
        /// The left child walker.
        lhs: Box<ExprWalker<'a, T>>,
        /// The right child walker.
        rhs: Box<ExprWalker<'a, T>>,
    },
}

impl<T: Clone> Clone for ExprWalker<'_, T> {
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(w) => Self::Leaf(w.clone()),
            Self::Scalar(value) => Self::Scalar(value.clone()),
            Self::Unary { op, arg } => Self::Unary {
                op: Arc::clone(op),
                arg: arg.clone(),
            },
            Self::Binary { op, lhs, rhs } => Self::Binary {
                op: Arc::clone(op),
                lhs: lhs.clone(),
                rhs: rhs.clone(),
            },
        }
    }
}

impl<'a, T: Clone + Send + Sync> ExprWalker<'a, T> {
    fn new(expr: &Expr<'a, T>, dim: usize) -> Self {
        match expr {
            Expr::Leaf(view) => Self::Leaf(StridedWalker::new(
                view.as_slice(),
                view.offset,
                &view.shape,
                &view.strides,
                dim,
            )),
            Expr::Scalar(value) => Self::Scalar(value.clone()),
            Expr::Unary { op, arg, .. } => Self::Unary {
                op: Arc::clone(op),
                arg: Box::new(Self::new(arg, dim)),
            },
            Expr::Binary { op, lhs, rhs, .. } => Self::Binary {
                op: Arc::clone(op),
                lhs: Box::new(Self::new(lhs, dim)),
                rhs: Box::new(Self::new(rhs, dim)),
            },
        }
    }
}

impl<T: Clone + Send + Sync> Walker for ExprWalker<'_, T> {
    type Item = T;

    fn walk(&mut self, axis: usize, delta: isize) {
        match self {
            Self::Leaf(w) => w.walk(axis, delta),
            Self::Scalar(_) => {}
            Self::Unary { arg, .. } => arg.walk(axis, delta),
            Self::Binary { lhs, rhs, .. } => {
                lhs.walk(axis, delta);
                rhs.walk(axis, delta);
            }
        }
    }

    fn reset(&mut self, axis: usize) {
        match self {
            Self::Leaf(w) => w.reset(axis),
            Self::Scalar(_) => {}
            Self::Unary { arg, .. } => arg.reset(axis),
            Self::Binary { lhs, rhs, .. } => {
                lhs.reset(axis);
                rhs.reset(axis);
            }
        }
    }

    fn reset_back(&mut self, axis: usize) {
        match self {
            Self::Leaf(w) => w.reset_back(axis),
            Self::Scalar(_) => {}
            Self::Unary { arg, .. } => arg.reset_back(axis),
            Self::Binary { lhs, rhs, .. } => {
                lhs.reset_back(axis);
                rhs.reset_back(axis);
            }
        }
    }

    fn get(&self) -> T {
        match self {
            Self::Leaf(w) => w.get(),
            Self::Scalar(value) => value.clone(),
            Self::Unary { op, arg } => op(arg.get()),
            Self::Binary { op, lhs, rhs } => op(lhs.get(), rhs.get()),
        }
    }
}

impl<'e, T: Clone + Send + Sync> Traversable for Expr<'e, T> {
    type Item = T;
    type Walker<'a> = ExprWalker<'e, T> where Self: 'a;

    fn shape(&self) -> &[usize] {
        Expr::shape(self)
    }

    fn create_walker(&self, dim: usize) -> ExprWalker<'e, T> {
        ExprWalker::new(self, dim)
    }

    fn is_trivial(&self, order: Order) -> bool {
        self.leaves_dense(Expr::shape(self), order)
    }

    fn trivial_at(&self, index: usize) -> T {
        match self {
            Self::Leaf(view) => view.trivial_at(index),
            Self::Scalar(value) => value.clone(),
            Self::Unary { op, arg, .. } => op(arg.trivial_at(index)),
            Self::Binary { op, lhs, rhs, .. } => op(lhs.trivial_at(index), rhs.trivial_at(index)),
        }
    }
}
