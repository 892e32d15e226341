//! Task Executor Module
//!
//! A fixed-size pool of workers draining one shared FIFO queue. Every store
//! operation runs as a task on this pool.
//!
//! ## Architecture Overview
//! 1. **Submission**: `TaskExecutor::submit` enqueues a future and returns at once.
//!    Submission never blocks; the queue is unbounded.
//! 2. **Execution**: each worker pulls the oldest task and runs it to completion
//!    before pulling the next one, so at most `worker_count` tasks run at a time.
//! 3. **Results**: `submit_with_result` pairs a task with a one-shot sink; the
//!    caller holds the matching `PendingResult`.
//! 4. **Shutdown**: the queue is closed, remaining tasks drain, workers exit.
//!
//! ## Submodules
//! - **`executor`**: the worker pool and its lifecycle.
//! - **`types`**: task ids, the task type, and the result sink/pending pair.

pub mod executor;
pub mod types;

pub use executor::TaskExecutor;
pub use types::{PendingResult, Task, TaskId};
