//! Replicated Object Store Library
//!
//! An in-memory object store that keeps whole-object replicas on several nodes
//! and runs every operation on a bounded worker pool.
//!
//! ## Architecture Modules
//! - **`executor`**: fixed-size worker pool draining one FIFO queue; operations
//!   report their outcome through a one-shot result sink.
//! - **`storage`**: the nodes themselves, the registry that owns them, and the
//!   metadata index mapping object ids to their primary node.
//! - **`replication`**: deterministic placement, fan-out writes and node health
//!   tracking via resource checks.
//! - **`service`**: the `StorageService` façade (upload, download, admin).
//! - **`error`**: the `StoreError` kinds surfaced to callers.

pub mod error;
pub mod executor;
pub mod replication;
pub mod service;
pub mod storage;

pub use error::{Result, StoreError};
pub use service::{ServiceConfig, StorageService};
