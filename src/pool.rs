//! Bounded worker pool
//!
//! Runs a batch of independent tasks with at most `limit` of them in flight.
//! Admission is a counting semaphore: the dispatch loop acquires an owned
//! permit before spawning each task, and the task drops it when it finishes,
//! however it finishes. The call returns once every spawned task has been
//! joined. Completion order is unspecified; outputs are returned in input
//! order.
//!
//! Tasks live in a [`JoinSet`], so dropping the `run` future aborts every
//! task still in flight.

use crate::error::{Error, Result};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Semaphore-bounded task runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    limit: usize,
}

impl WorkerPool {
    /// Create a pool admitting at most `limit` concurrent tasks
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `limit` is zero.
    pub fn new(limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(Error::config(
                "concurrency",
                "concurrency ceiling must be at least 1",
            ));
        }
        Ok(Self { limit })
    }

    /// Like [`WorkerPool::new`], for callers holding a signed ceiling
    ///
    /// Zero and negative values are configuration errors.
    pub fn from_signed(limit: i64) -> Result<Self> {
        let limit = usize::try_from(limit).map_err(|_| {
            Error::config(
                "concurrency",
                format!("concurrency ceiling must be at least 1, got {limit}"),
            )
        })?;
        Self::new(limit)
    }

    /// Configured ceiling
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Permits actually handed out for a batch of `tasks`
    pub fn effective_limit(&self, tasks: usize) -> usize {
        self.limit.min(tasks)
    }

    /// Run `work(index, input)` for every input, bounded by the pool limit
    ///
    /// Returns one entry per input, in input order. An entry is `None` only if
    /// its task panicked; the panic is logged and does not affect siblings.
    /// Dropping the returned future aborts the tasks it has spawned.
    pub async fn run<I, O, F, Fut>(&self, inputs: Vec<I>, work: F) -> Vec<Option<O>>
    where
        I: Send + 'static,
        O: Send + 'static,
        F: Fn(usize, I) -> Fut,
        Fut: Future<Output = O> + Send + 'static,
    {
        let total = inputs.len();
        if total == 0 {
            return Vec::new();
        }

        let permits = Arc::new(Semaphore::new(self.effective_limit(total)));
        let mut tasks = JoinSet::new();

        for (index, input) in inputs.into_iter().enumerate() {
            // Blocks the dispatch loop while every slot is taken
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                tracing::error!(index, total, "Admission semaphore closed, stopping dispatch");
                break;
            };

            let task = work(index, input);
            tasks.spawn(async move {
                let _permit = permit;
                (index, AssertUnwindSafe(task).catch_unwind().await)
            });
        }

        let mut outputs: Vec<Option<O>> = std::iter::repeat_with(|| None).take(total).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(output))) => outputs[index] = Some(output),
                Ok((index, Err(_))) => tracing::error!(index, "Pool task panicked"),
                Err(e) => tracing::error!(error = %e, "Pool task did not complete"),
            }
        }
        outputs
    }
}
