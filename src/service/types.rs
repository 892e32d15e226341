use crate::replication::{ReplicationReport, ReplicationStats};

use serde::{Deserialize, Serialize};

/// Result of a completed upload task.
#[derive(Debug, Clone)]
pub struct UploadReport {
    pub id: String,
    /// Node that took the primary write and is recorded in metadata.
    pub primary_node: usize,
    pub replication: ReplicationReport,
}

impl UploadReport {
    pub fn is_fully_replicated(&self) -> bool {
        self.replication.is_fully_replicated()
    }
}

/// Point-in-time view of the service for operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStats {
    pub worker_count: usize,
    pub queued_tasks: usize,
    pub node_count: usize,
    pub healthy_nodes: usize,
    /// Objects held by each node, indexed by node.
    pub node_objects: Vec<usize>,
    /// Distinct object ids with a metadata record.
    pub indexed_objects: usize,
    pub replication: ReplicationStats,
}
