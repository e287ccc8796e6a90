//! Worker pool: many tasks at once, one chain executor.

use crate::{ChainExecutor, PoolConfig};
use std::sync::Arc;
use taglink_core::{IssueKind, Task, TaskIssue, TaskResult};
use taglink_error::TaglinkResult;
use taglink_interface::{PromptExecutor, ResultSink};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Runs tasks concurrently on the tokio runtime.
///
/// Steps inside one chain stay sequential; parallelism is across tasks only,
/// bounded by a semaphore. Results come back in submission order.
#[derive(Debug)]
pub struct WorkerPool<E: PromptExecutor + 'static> {
    executor: Arc<ChainExecutor<E>>,
    permits: Arc<Semaphore>,
    max_concurrent: usize,
    cancel: CancellationToken,
}

impl<E: PromptExecutor + 'static> WorkerPool<E> {
    /// Create a pool sized by `config`.
    pub fn new(executor: ChainExecutor<E>, config: &PoolConfig) -> Self {
        Self::with_max_concurrent(executor, *config.max_concurrent_tasks())
    }

    /// Create a pool running at most `max_concurrent` tasks at once.
    /// A bound of zero is raised to one.
    pub fn with_max_concurrent(executor: ChainExecutor<E>, max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            executor: Arc::new(executor),
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            cancel: CancellationToken::new(),
        }
    }

    /// The shared chain executor.
    pub fn executor(&self) -> &ChainExecutor<E> {
        &self.executor
    }

    /// Concurrency bound.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Token observed by every execution started by this pool.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop every running task before its next step. Tasks not yet started
    /// finish immediately as cancelled.
    pub fn cancel(&self) {
        tracing::warn!("Cancelling worker pool");
        self.cancel.cancel();
    }

    /// Execute every task, returning each enriched task with its result in
    /// submission order.
    #[tracing::instrument(skip(self, tasks), fields(tasks = tasks.len(), max_concurrent = self.max_concurrent))]
    pub async fn run_all(&self, tasks: Vec<Task>) -> Vec<(Task, TaskResult)> {
        // Each task lives in a shared slot so a panicking execution leaves it
        // recoverable.
        let slots: Vec<Arc<Mutex<Task>>> = tasks
            .into_iter()
            .map(|task| Arc::new(Mutex::new(task)))
            .collect();
        let mut results: Vec<Option<TaskResult>> = slots.iter().map(|_| None).collect();
        let mut set = JoinSet::new();

        for (index, slot) in slots.iter().enumerate() {
            let slot = Arc::clone(slot);
            let executor = Arc::clone(&self.executor);
            let permits = Arc::clone(&self.permits);
            let cancel = self.cancel.clone();

            set.spawn(async move {
                let mut task = slot.lock().await;
                let result = match permits.acquire_owned().await {
                    Ok(_permit) => executor.execute_with_cancel(&mut task, &cancel).await,
                    Err(_) => TaskResult::failed(TaskIssue::new(
                        IssueKind::Cancelled,
                        "Worker pool closed before the task started",
                    )),
                };
                (index, result)
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => tracing::error!(error = %e, "Task execution aborted"),
            }
        }

        let mut finished = Vec::with_capacity(slots.len());
        for (slot, result) in slots.into_iter().zip(results) {
            let mut task = match Arc::try_unwrap(slot) {
                Ok(task) => task.into_inner(),
                Err(shared) => shared.lock().await.clone(),
            };
            let result = match result {
                Some(result) => result,
                None => {
                    let issue = TaskIssue::new(
                        IssueKind::Collaborator,
                        "Task execution aborted unexpectedly",
                    );
                    task.errors.push(issue.clone());
                    TaskResult::failed(issue)
                }
            };
            finished.push((task, result));
        }
        finished
    }

    /// Execute every task and hand each result to `sink` in submission
    /// order. Returns the number of results delivered.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the sink.
    pub async fn run_into<S: ResultSink + ?Sized>(
        &self,
        tasks: Vec<Task>,
        sink: &S,
    ) -> TaglinkResult<usize> {
        let finished = self.run_all(tasks).await;
        for (task, result) in &finished {
            sink.accept(task, result).await?;
        }
        tracing::info!(delivered = finished.len(), "Results delivered");
        Ok(finished.len())
    }
}
