use axial_tensor::{ErrorKind, TensorError};
use thiserror::Error;

use crate::parallel::ParallelError;

/// An error type for tensor operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TensorOpsError {
    /// Tensor error
    #[error("Error with the tensor: {0}")]
    TensorError(#[from] TensorError),

    /// The thread pool could not be built or configured.
    #[error(transparent)]
    ThreadPoolBuild(#[from] ParallelError),

    /// A reduction window holds no element and no initial value was given.
    #[error("Zero-size reduction window without an initial value")]
    EmptyReduction,

    /// The sliding window does not fit the axis.
    #[error("Invalid window: size {window_size} with step {window_step} over an axis of size {axis_size}")]
    InvalidWindow {
        /// Requested window size
        window_size: usize,
        /// Requested window step
        window_step: usize,
        /// Extent of the slid axis
        axis_size: usize,
    },

    /// The operation needs at least one input.
    #[error("{0} requires at least one input")]
    EmptyInput(&'static str),

    /// Shape mismatch
    #[error("Shape mismatch: {0:?} != {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),
}

impl TensorOpsError {
    /// Returns the error kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TensorError(e) => e.kind(),
            Self::ThreadPoolBuild(_)
            | Self::EmptyReduction
            | Self::InvalidWindow { .. }
            | Self::EmptyInput(_)
            | Self::ShapeMismatch(..) => ErrorKind::Value,
        }
    }

    /// Returns a user-friendly suggestion for resolving the error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::TensorError(e) => e.suggestion(),
            Self::ThreadPoolBuild(_) => "Use a positive thread and task count",
            Self::EmptyReduction => "Pass an initial value with ReduceOptions::initial",
            Self::InvalidWindow { .. } => "Use 0 < window_size <= axis size and window_step >= 1",
            Self::EmptyInput(_) => "Pass a non-empty list of inputs",
            Self::ShapeMismatch(..) => "Make the input shapes agree on every axis but the joined one",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_passthrough() {
        let err: TensorOpsError = TensorError::axis_out_of_bounds(5, 2).into();
        assert_eq!(err.kind(), ErrorKind::Axis);
        let err: TensorOpsError = TensorError::index_out_of_bounds(-9, 3).into();
        assert_eq!(err.kind(), ErrorKind::Index);
        assert_eq!(TensorOpsError::EmptyReduction.kind(), ErrorKind::Value);
        assert_eq!(TensorOpsError::EmptyInput("stack").kind(), ErrorKind::Value);
    }

    #[test]
    fn test_display() {
        let err = TensorOpsError::InvalidWindow {
            window_size: 6,
            window_step: 1,
            axis_size: 5,
        };
        assert_eq!(
            err.to_string(),
            "Invalid window: size 6 with step 1 over an axis of size 5"
        );
        assert_eq!(
            TensorOpsError::EmptyInput("concatenate").to_string(),
            "concatenate requires at least one input"
        );
    }
}
