//! Worker Pool Implementation
//!
//! Spawns a fixed number of workers that drain one shared FIFO queue.
//!
//! ## Responsibilities
//! - **Dispatch**: each worker pulls the oldest queued task and runs it to completion.
//! - **Isolation**: a task that errors or panics is logged; the worker moves on.
//! - **Shutdown**: closing the queue lets workers drain what is left, then exit.

use super::types::*;
use crate::error::{Result, StoreError};

use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// The engine that drives task execution.
pub struct TaskExecutor {
    /// Submission side of the queue. `None` once shutdown has begun.
    sender: Mutex<Option<mpsc::UnboundedSender<QueuedTask>>>,
    /// Join handles of the spawned workers, taken by the first `shutdown`.
    workers: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
    /// Tasks submitted but not yet picked up by a worker.
    queued: Arc<AtomicUsize>,
    worker_count: usize,
}

impl TaskExecutor {
    /// Spawns `worker_count` workers on the current tokio runtime and returns
    /// the executor handle.
    pub fn start(worker_count: usize) -> Result<Arc<Self>> {
        if worker_count == 0 {
            return Err(StoreError::InvalidConfig(
                "worker_count must be at least 1".to_string(),
            ));
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));
        let queued = Arc::new(AtomicUsize::new(0));

        tracing::info!("Starting {} task workers", worker_count);

        let workers = (0..worker_count)
            .map(|worker_id| {
                let worker = Worker {
                    id: worker_id,
                    receiver: receiver.clone(),
                    queued: queued.clone(),
                };
                tokio::spawn(worker.run())
            })
            .collect();

        tracing::info!("Task executor started with {} workers", worker_count);

        Ok(Arc::new(Self {
            sender: Mutex::new(Some(sender)),
            workers: tokio::sync::Mutex::new(workers),
            queued,
            worker_count,
        }))
    }

    /// Enqueues a task and returns immediately.
    ///
    /// # Returns
    /// * `Ok(TaskId)` once the task is queued.
    /// * `Err(StoreError::TaskRejected)` if `shutdown` has been called.
    pub fn submit<F>(&self, task: F) -> Result<TaskId>
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let task_id = TaskId::new();
        self.enqueue(task_id.clone(), Box::pin(task))?;
        Ok(task_id)
    }

    /// Enqueues a task whose outcome is delivered to the returned
    /// `PendingResult`. Failures are also reported at the worker boundary.
    pub fn submit_with_result<T, F>(&self, task: F) -> Result<PendingResult<T>>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let task_id = TaskId::new();
        let (sink, pending) = result_channel(task_id.clone());

        let wrapped = async move {
            let result = task.await;
            let failure = result.as_ref().err().cloned();
            sink.deliver(result);
            match failure {
                Some(err) => Err(anyhow::Error::new(err)),
                None => Ok(()),
            }
        };

        self.enqueue(task_id, Box::pin(wrapped))?;
        Ok(pending)
    }

    fn enqueue(&self, id: TaskId, task: Task) -> Result<()> {
        let guard = self.sender.lock();
        let Some(sender) = guard.as_ref() else {
            tracing::warn!("Rejected task {}: executor is shut down", id);
            return Err(StoreError::TaskRejected);
        };

        self.queued.fetch_add(1, Ordering::SeqCst);
        if sender.send(QueuedTask { id, task }).is_err() {
            self.queued.fetch_sub(1, Ordering::SeqCst);
            return Err(StoreError::TaskRejected);
        }
        Ok(())
    }

    /// Stops accepting tasks, waits for queued and in-flight tasks to finish,
    /// then waits for every worker to exit. Calling it again is a no-op.
    pub async fn shutdown(&self) {
        let sender = self.sender.lock().take();
        if sender.is_some() {
            tracing::info!(
                "Shutting down executor, draining {} queued tasks",
                self.queued()
            );
        }
        // Dropping the last sender closes the queue once it is drained.
        drop(sender);

        let mut workers = self.workers.lock().await;
        for handle in workers.drain(..) {
            if let Err(e) = handle.await {
                tracing::error!("Worker exited abnormally: {}", e);
            }
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    pub fn is_shut_down(&self) -> bool {
        self.sender.lock().is_none()
    }
}

/// State owned by a single worker loop.
struct Worker {
    id: usize,
    receiver: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<QueuedTask>>>,
    queued: Arc<AtomicUsize>,
}

impl Worker {
    /// Pulls one task at a time until the queue is closed and empty.
    async fn run(self) {
        tracing::debug!("Worker {} started", self.id);

        loop {
            // Only one idle worker waits on the queue; the rest wait on the lock.
            let next = { self.receiver.lock().await.recv().await };

            let Some(QueuedTask { id, task }) = next else {
                break;
            };
            self.queued.fetch_sub(1, Ordering::SeqCst);

            tracing::trace!("Worker {} picked task {}", self.id, id);

            // Run on a child task so a panic surfaces as a JoinError here
            // instead of unwinding through the worker.
            match tokio::spawn(task).await {
                Ok(Ok(())) => {
                    tracing::trace!("Task {} completed", id);
                }
                Ok(Err(e)) => {
                    tracing::error!("Task {} failed: {:#}", id, e);
                }
                Err(e) if e.is_panic() => {
                    tracing::error!("Task {} panicked", id);
                }
                Err(e) => {
                    tracing::error!("Task {} aborted: {}", id, e);
                }
            }
        }

        tracing::debug!("Worker {} stopped", self.id);
    }
}
