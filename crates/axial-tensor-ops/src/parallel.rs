use std::ops::Range;

use rayon::prelude::*;
use thiserror::Error;

use crate::error::TensorOpsError;

/// Upper bound on the number of tasks a single call submits to the pool.
pub const DEFAULT_MAX_PAR_TASKS: usize = 64;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The requested task count is invalid.
    #[error("max parallel task count must be > 0, got {0}")]
    InvalidTaskCount(usize),
}

/// Settings of a [`ThreadPool`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadPoolConfig {
    /// Number of worker threads; `0` lets rayon pick the available parallelism.
    pub num_threads: usize,
    /// Prefix of the worker thread names.
    pub thread_name: Option<String>,
}

/// A pool of worker threads, owned by the caller and passed to the operations by reference.
///
/// Dropping the pool shuts its workers down.
#[derive(Debug)]
pub struct ThreadPool {
    pool: rayon::ThreadPool,
}

impl ThreadPool {
    /// Builds a pool from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::BuildError`] if the operating system refuses the threads.
    pub fn new(config: ThreadPoolConfig) -> Result<Self, ParallelError> {
        let mut builder = rayon::ThreadPoolBuilder::new().num_threads(config.num_threads);
        if let Some(name) = config.thread_name {
            builder = builder.thread_name(move |i| format!("{name}-{i}"));
        }
        let pool = builder
            .build()
            .map_err(|e| ParallelError::BuildError(e.to_string()))?;
        log::debug!("built thread pool with {} threads", pool.current_num_threads());
        Ok(Self { pool })
    }

    /// Builds a pool with exactly `n` threads.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::InvalidThreadCount`] when `n` is zero.
    pub fn with_threads(n: usize) -> Result<Self, ParallelError> {
        if n == 0 {
            return Err(ParallelError::InvalidThreadCount(n));
        }
        Self::new(ThreadPoolConfig {
            num_threads: n,
            ..Default::default()
        })
    }

    /// Returns the number of worker threads.
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs `op` inside the pool and blocks until it returns.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}

/// Controls how an operation is executed.
#[derive(Debug, Clone, Copy, Default)]
pub enum ExecutionPolicy<'p> {
    /// Run sequentially on the current thread.
    #[default]
    Serial,

    /// Split the work into at most `max_par_tasks` contiguous ranges run on `pool`.
    Parallel {
        /// The pool running the tasks.
        pool: &'p ThreadPool,
        /// Upper bound on the number of tasks per call.
        max_par_tasks: usize,
    },
}

impl<'p> ExecutionPolicy<'p> {
    /// Parallel execution on `pool` with [`DEFAULT_MAX_PAR_TASKS`].
    pub fn parallel(pool: &'p ThreadPool) -> Self {
        Self::Parallel {
            pool,
            max_par_tasks: DEFAULT_MAX_PAR_TASKS,
        }
    }

    /// Sets the task bound of a parallel policy; a serial policy is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::InvalidTaskCount`] when `max_par_tasks` is zero.
    pub fn with_max_par_tasks(self, max_par_tasks: usize) -> Result<Self, ParallelError> {
        if max_par_tasks == 0 {
            return Err(ParallelError::InvalidTaskCount(max_par_tasks));
        }
        Ok(match self {
            Self::Serial => Self::Serial,
            Self::Parallel { pool, .. } => Self::Parallel {
                pool,
                max_par_tasks,
            },
        })
    }

    /// Returns `true` for a parallel policy.
    pub fn is_parallel(&self) -> bool {
        matches!(self, Self::Parallel { .. })
    }
}

/// Number of units per task when splitting `n_units` into at most `max_tasks` tasks.
///
/// # Example
///
/// ```
/// use axial_tensor_ops::parallel::par_task_size;
///
/// assert_eq!(par_task_size(100, 64), 2);
/// assert_eq!(par_task_size(10, 64), 1);
/// assert_eq!(par_task_size(0, 8), 1);
/// ```
pub fn par_task_size(n_units: usize, max_tasks: usize) -> usize {
    n_units.div_ceil(max_tasks.max(1)).max(1)
}

/// Runs `f` over `0..n_units` according to `policy` and concatenates the outputs in order.
///
/// Each task receives a disjoint contiguous range. The first error wins and the
/// outputs of the other tasks are discarded.
pub(crate) fn dispatch<R, F>(
    policy: ExecutionPolicy<'_>,
    n_units: usize,
    f: F,
) -> Result<Vec<R>, TensorOpsError>
where
    R: Send,
    F: Fn(Range<usize>) -> Result<Vec<R>, TensorOpsError> + Sync,
{
    match policy {
        ExecutionPolicy::Serial => f(0..n_units),
        ExecutionPolicy::Parallel {
            pool,
            max_par_tasks,
        } => {
            let task_size = par_task_size(n_units, max_par_tasks);
            let n_tasks = n_units.div_ceil(task_size);
            log::debug!("dispatching {n_units} units as {n_tasks} tasks of {task_size}");
            let parts = pool.install(|| {
                (0..n_tasks)
                    .into_par_iter()
                    .map(|t| {
                        let start = t * task_size;
                        f(start..(start + task_size).min(n_units))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })?;
            Ok(parts.into_iter().flatten().collect())
        }
    }
}
