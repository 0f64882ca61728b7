use thiserror::Error;

/// The coarse category of a failure.
///
/// Every error raised by the engine maps onto one of these kinds so that callers can
/// react to the class of mistake without matching on concrete variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A malformed argument: wrong sizes, duplicate axes, invalid windows, empty inputs.
    Value,
    /// An axis outside `[-dim, dim)`.
    Axis,
    /// An element index outside `[0, size)`.
    Index,
}

/// Error type for tensor creation, view and traversal operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TensorError {
    /// Tensor shape does not match the provided data.
    ///
    /// This error occurs when creating a tensor with data that doesn't match
    /// the specified shape. The shape must match the number of elements exactly.
    ///
    /// # Example
    /// ```ignore
    /// // Error: shape [2, 3] expects 6 elements, but got 5
    /// let tensor = Tensor::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5])?;
    /// ```
    #[error("Shape mismatch: expected {expected} elements for shape, but got {actual} elements in data")]
    InvalidShape {
        /// Expected number of elements based on shape
        expected: usize,
        /// Actual number of elements in the data
        actual: usize,
    },

    /// Index exceeds tensor bounds.
    ///
    /// Negative indices are accepted by the indexing front-ends and wrap from the end,
    /// which is why the offending index is reported as signed.
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index that was attempted
        index: isize,
        /// The size of the dimension being indexed
        size: usize,
    },

    /// Axis outside `[-ndim, ndim)` after negative-axis normalization.
    #[error("Axis {axis} is out of bounds for tensor of dimension {ndim}")]
    AxisOutOfBounds {
        /// The requested axis, as given by the caller
        axis: isize,
        /// Dimensionality of the tensor
        ndim: usize,
    },

    /// The same axis appears more than once in an axis set.
    #[error("Duplicate axis {0} in axis set")]
    DuplicateAxis(usize),

    /// Two shapes cannot be broadcast against each other.
    #[error("Cannot broadcast shapes {lhs:?} and {rhs:?}")]
    BroadcastError {
        /// Left-hand shape
        lhs: Vec<usize>,
        /// Right-hand shape
        rhs: Vec<usize>,
    },

    /// Tensor dimensions incompatible for the requested operation.
    ///
    /// # Examples
    /// - Reshape to a shape with a different number of elements
    /// - Concatenation along incompatible dimensions
    ///
    /// # Recommended Actions
    /// - Verify tensor shapes with `tensor.shape`
    /// - Consider reshaping or transposing tensors
    #[error("Dimension mismatch: {message}. Expected shape: {expected}, got: {actual}")]
    DimensionMismatch {
        /// Human-readable description of the mismatch
        message: String,
        /// Expected shape description
        expected: String,
        /// Actual shape description
        actual: String,
    },

    /// The operation needs a contiguous layout and the view is strided.
    #[error("Operation {operation} requires a contiguous layout")]
    NonContiguous {
        /// Name of the operation that failed
        operation: String,
    },

    /// An argument is outside its accepted domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl TensorError {
    /// Creates an InvalidShape error with clear context.
    pub fn invalid_shape(expected: usize, actual: usize) -> Self {
        Self::InvalidShape { expected, actual }
    }

    /// Creates an IndexOutOfBounds error with clear context.
    pub fn index_out_of_bounds(index: isize, size: usize) -> Self {
        Self::IndexOutOfBounds { index, size }
    }

    /// Creates an AxisOutOfBounds error.
    pub fn axis_out_of_bounds(axis: isize, ndim: usize) -> Self {
        Self::AxisOutOfBounds { axis, ndim }
    }

    /// Creates a DimensionMismatch error with formatted shapes.
    pub fn dimension_mismatch(
        message: impl Into<String>,
        expected: &[usize],
        actual: &[usize],
    ) -> Self {
        Self::DimensionMismatch {
            message: message.into(),
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }
    }

    /// Creates a NonContiguous error for the named operation.
    pub fn non_contiguous(operation: impl Into<String>) -> Self {
        Self::NonContiguous {
            operation: operation.into(),
        }
    }

    /// Returns the error kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IndexOutOfBounds { .. } => ErrorKind::Index,
            Self::AxisOutOfBounds { .. } => ErrorKind::Axis,
            Self::InvalidShape { .. }
            | Self::DuplicateAxis(_)
            | Self::BroadcastError { .. }
            | Self::DimensionMismatch { .. }
            | Self::NonContiguous { .. }
            | Self::InvalidArgument(_) => ErrorKind::Value,
        }
    }

    /// Returns a user-friendly suggestion for resolving the error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::InvalidShape { .. } => {
                "Ensure the product of shape dimensions equals the number of data elements"
            }
            Self::IndexOutOfBounds { .. } => {
                "Verify indices are within bounds (-size <= index < size)"
            }
            Self::AxisOutOfBounds { .. } => "Use an axis in [-ndim, ndim)",
            Self::DuplicateAxis(_) => "List each axis at most once",
            Self::BroadcastError { .. } => {
                "Trailing dimensions must be equal or one of them must be 1"
            }
            Self::DimensionMismatch { .. } => {
                "Check tensor shapes are compatible for the operation. Consider reshaping or broadcasting."
            }
            Self::NonContiguous { .. } => "Call to_tensor() to obtain a contiguous copy first",
            Self::InvalidArgument(_) => "Check the documented domain of the argument",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(TensorError::index_out_of_bounds(5, 3).kind(), ErrorKind::Index);
        assert_eq!(TensorError::axis_out_of_bounds(-4, 3).kind(), ErrorKind::Axis);
        assert_eq!(TensorError::DuplicateAxis(1).kind(), ErrorKind::Value);
        assert_eq!(TensorError::invalid_shape(6, 5).kind(), ErrorKind::Value);
    }

    #[test]
    fn test_error_display() {
        let err = TensorError::axis_out_of_bounds(3, 2);
        assert_eq!(
            err.to_string(),
            "Axis 3 is out of bounds for tensor of dimension 2"
        );
        assert!(!err.suggestion().is_empty());
    }
}
