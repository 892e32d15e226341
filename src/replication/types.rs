use super::health::CheckOutcome;
use super::placement::PlacementSet;
use crate::error::StoreError;

use serde::{Deserialize, Serialize};

/// A placement target that did not receive a copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaFailure {
    pub node: usize,
    pub error: StoreError,
}

/// Outcome of one replication pass for one object.
#[derive(Debug, Clone)]
pub struct ReplicationReport {
    pub id: String,
    /// The placement the pass was computed against.
    pub placement: PlacementSet,
    /// Nodes that now hold the payload, in placement order.
    pub written: Vec<usize>,
    pub failed: Vec<ReplicaFailure>,
    pub requested_factor: usize,
}

impl ReplicationReport {
    pub fn copies(&self) -> usize {
        self.written.len()
    }

    pub fn is_fully_replicated(&self) -> bool {
        self.written.len() >= self.requested_factor
    }
}

/// Aggregated node health after a health pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub healthy: Vec<usize>,
    pub unhealthy: Vec<usize>,
    /// Every check that was over its threshold during the pass.
    pub breaches: Vec<CheckOutcome>,
}

impl HealthReport {
    pub fn all_healthy(&self) -> bool {
        self.unhealthy.is_empty()
    }
}

/// Counters kept under the coordinator's replication lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationStats {
    pub passes: u64,
    pub copies_written: u64,
    pub under_replicated: u64,
}
