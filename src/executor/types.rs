use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// Unique identifier for a submitted task.
///
/// Wrapper around a UUID string; only used for log correlation and for
/// pairing a caller's `PendingResult` with the task that fills it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generates a new random UUID v4-based TaskId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A type-erased unit of work. The future captures everything it needs;
/// the executor owns it from submission until it finishes.
pub type Task = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// A task sitting in the executor queue.
pub(crate) struct QueuedTask {
    pub(crate) id: TaskId,
    pub(crate) task: Task,
}

/// Creates a connected sink/pending pair for a single operation result.
pub(crate) fn result_channel<T>(task_id: TaskId) -> (ResultSink<T>, PendingResult<T>) {
    let (sender, receiver) = oneshot::channel();
    (
        ResultSink { sender },
        PendingResult { task_id, receiver },
    )
}

/// Write side of an operation's result slot. Consumed on delivery.
pub(crate) struct ResultSink<T> {
    sender: oneshot::Sender<Result<T>>,
}

impl<T> ResultSink<T> {
    pub(crate) fn deliver(self, result: Result<T>) {
        if self.sender.send(result).is_err() {
            tracing::trace!("Result receiver dropped before delivery");
        }
    }
}

/// Read side of an operation's result slot.
///
/// Callers either `wait` for the result or poll it with `try_result`.
/// If the task ends without delivering (panic, executor torn down), the
/// result resolves to `StoreError::ResultDropped`.
pub struct PendingResult<T> {
    task_id: TaskId,
    receiver: oneshot::Receiver<Result<T>>,
}

impl<T> PendingResult<T> {
    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    pub async fn wait(self) -> Result<T> {
        match self.receiver.await {
            Ok(result) => result,
            Err(_) => Err(StoreError::ResultDropped),
        }
    }

    /// Non-blocking poll. `None` means the task has not finished yet.
    pub fn try_result(&mut self) -> Option<Result<T>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(StoreError::ResultDropped)),
        }
    }
}
