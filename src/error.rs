//! Error types shared by every layer of the store.

use thiserror::Error;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Errors surfaced to callers of the store, either synchronously (submission)
/// or through an operation's result sink.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No metadata exists for the object.
    #[error("object not found: {id}")]
    NotFound { id: String },

    /// Metadata points at a node whose store does not hold the object.
    #[error("object {id} recorded on node {node} but missing from its store")]
    Inconsistent { id: String, node: usize },

    /// The node holding the object is flagged unhealthy and no healthy
    /// replica could serve the request.
    #[error("node {node} unavailable")]
    NodeUnavailable { node: usize },

    /// The executor has been shut down.
    #[error("task rejected: executor is shut down")]
    TaskRejected,

    /// Administrative call referenced a node index outside the registry.
    #[error("unknown node index {node}")]
    UnknownNode { node: usize },

    /// The registry is empty, so no placement can be computed.
    #[error("no nodes registered")]
    NoNodes,

    /// The task owning the result sink ended without reporting a result.
    #[error("task ended without delivering a result")]
    ResultDropped,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
