#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Axis sets and the axes iterator maker.
///
/// Relocates a selected axis set to the front of the traversal so that output
/// cells and reduction windows can be walked independently.
pub mod axes;

/// Error types for tensor operations.
///
/// Defines [`TensorOpsError`] for handling failures during tensor computations.
pub mod error;

/// Element picking: `take`, `take_along_axis`, `masked_select` and `histogram`.
pub mod indexing;

/// Joining inputs with `stack` and `concatenate`.
pub mod manipulation;

/// Thread pool and execution policy shared by every operation.
pub mod parallel;

/// The binary and range reduction engine.
pub mod reduce;

/// Reductions, scans and sorts built on the engine.
pub mod reducers;

/// Sliding windows along one axis.
pub mod slide;

/// In-place lane transforms and scans.
pub mod transform;

/// The per-cell element iterator of range reductions.
pub mod window;

pub use axes::{Axes, AxesIteratorMaker};
pub use error::TensorOpsError;
pub use parallel::{
    par_task_size, ExecutionPolicy, ParallelError, ThreadPool, ThreadPoolConfig,
    DEFAULT_MAX_PAR_TASKS,
};
pub use reduce::{reduce_binary, reduce_range, RangeOptions, ReduceOptions};
pub use slide::slide;
pub use transform::{accumulate, transform};
pub use window::Window;
