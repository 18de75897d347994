//! Bounded parallel dispatch.
//!
//! Fans a batch of tasks out over a fixed number of OS threads, each
//! blocking on one agent at a time. Results are returned in completion
//! order. The dispatcher holds no state: recording results is the caller's
//! concern.

use crate::agent::dispatch::AgentRunner;
use crate::agent::types::{AgentResult, TaskRequest};
use std::sync::{Mutex, PoisonError, mpsc};
use std::thread;
use std::time::Duration;
use tracing::info;

/// Default per-task timeout for batch dispatch.
pub const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default cap on simultaneous agent processes.
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Settings for one dispatch batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Timeout applied to each task independently.
    pub timeout: Duration,
    /// Upper bound on concurrently running tasks.
    pub max_workers: usize,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_BATCH_TIMEOUT,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl DispatchOptions {
    /// Number of worker threads for a batch of `task_count` tasks.
    pub fn worker_count(&self, task_count: usize) -> usize {
        task_count.min(self.max_workers.max(1))
    }
}

/// Run every task through `runner`, at most `max_workers` at a time.
///
/// Blocks until all tasks have finished or timed out. One task's failure
/// never cancels or delays its siblings. The returned list has one result
/// per task, in completion order.
pub fn dispatch_many<R>(
    runner: &R,
    tasks: Vec<TaskRequest>,
    options: &DispatchOptions,
) -> Vec<AgentResult>
where
    R: AgentRunner + ?Sized,
{
    if tasks.is_empty() {
        return Vec::new();
    }

    let workers = options.worker_count(tasks.len());
    info!(tasks = tasks.len(), workers, "dispatching batch");

    let queue = Mutex::new(tasks.into_iter());
    let (tx, rx) = mpsc::channel();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let queue = &queue;
            scope.spawn(move || {
                loop {
                    // The guard is dropped before the task runs.
                    let next = queue.lock().unwrap_or_else(PoisonError::into_inner).next();
                    let Some(task) = next else {
                        break;
                    };
                    if tx.send(runner.run(&task, options.timeout)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        rx.iter().collect()
    })
}
