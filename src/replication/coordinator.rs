//! Replication Coordinator
//!
//! Decides where copies of an object live and pushes them there.
//!
//! ## Responsibilities
//! - **Placement**: deterministic placement sets derived from the current node count.
//! - **Fan-out**: writes a payload to every healthy placement member, one object at a time.
//! - **Health**: runs resource checks and aggregates node health flags.

use super::health::ResourceCheck;
use super::placement::PlacementSet;
use super::types::*;
use crate::error::{Result, StoreError};
use crate::storage::registry::NodeRegistry;

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

pub struct ReplicationCoordinator {
    registry: Arc<NodeRegistry>,
    replication_factor: usize,
    /// Serializes replication passes. Guards the pass counters so that two
    /// objects never interleave their fan-out.
    replication_lock: Mutex<ReplicationStats>,
    checks: RwLock<Vec<ResourceCheck>>,
}

impl ReplicationCoordinator {
    pub fn new(registry: Arc<NodeRegistry>, replication_factor: usize) -> Result<Self> {
        if replication_factor == 0 {
            return Err(StoreError::InvalidConfig(
                "replication_factor must be at least 1".to_string(),
            ));
        }

        if replication_factor > registry.len() {
            tracing::warn!(
                "Replication factor {} exceeds node count {}; objects will be under-replicated",
                replication_factor,
                registry.len()
            );
        }

        Ok(Self {
            registry,
            replication_factor,
            replication_lock: Mutex::new(ReplicationStats::default()),
            checks: RwLock::new(Vec::new()),
        })
    }

    pub fn replication_factor(&self) -> usize {
        self.replication_factor
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    /// Placement for `id` against the node count at the time of the call.
    pub fn placement_for(&self, id: &str) -> Result<PlacementSet> {
        PlacementSet::compute(id, self.registry.len(), self.replication_factor)
    }

    /// The node that should take the primary write for `id`: the first
    /// healthy member of its placement set.
    pub fn primary_for(&self, id: &str) -> Result<usize> {
        let placement = self.placement_for(id)?;

        for &index in placement.nodes() {
            if self.registry.get(index)?.is_healthy() {
                if index != placement.primary() {
                    tracing::warn!(
                        "Designated primary {} for {} is unhealthy, using node {}",
                        placement.primary(),
                        id,
                        index
                    );
                }
                return Ok(index);
            }
        }

        Err(StoreError::NodeUnavailable {
            node: placement.primary(),
        })
    }

    /// Writes `payload` to every healthy member of the placement set.
    ///
    /// Unhealthy members are skipped and listed in `failed`, and any copy they
    /// still hold from an earlier write is dropped so a later read cannot be
    /// rerouted to it. Nothing is retried or rolled back; a short pass is
    /// logged as under-replication.
    pub fn replicate(&self, id: &str, payload: &Bytes) -> Result<ReplicationReport> {
        let mut stats = self.replication_lock.lock();

        let placement = self.placement_for(id)?;
        let mut written = Vec::with_capacity(placement.len());
        let mut failed = Vec::new();

        for &index in placement.nodes() {
            match self.registry.get(index) {
                Ok(node) if node.is_healthy() => {
                    node.put(id, payload.clone());
                    written.push(index);
                }
                Ok(node) => {
                    if node.remove(id).is_some() {
                        tracing::debug!("Dropped stale copy of {} on unhealthy node {}", id, index);
                    } else {
                        tracing::debug!("Skipping unhealthy replica node {} for {}", index, id);
                    }
                    failed.push(ReplicaFailure {
                        node: index,
                        error: StoreError::NodeUnavailable { node: index },
                    });
                }
                Err(error) => {
                    failed.push(ReplicaFailure { node: index, error });
                }
            }
        }

        stats.passes += 1;
        stats.copies_written += written.len() as u64;

        let report = ReplicationReport {
            id: id.to_string(),
            placement,
            written,
            failed,
            requested_factor: self.replication_factor,
        };

        if !report.is_fully_replicated() {
            stats.under_replicated += 1;
            tracing::warn!(
                "Object {} under-replicated: {}/{} copies (placement {:?})",
                id,
                report.copies(),
                report.requested_factor,
                report.placement.nodes()
            );
        } else {
            tracing::debug!("Replicated {} to nodes {:?}", id, report.written);
        }

        Ok(report)
    }

    pub fn register_check(&self, check: ResourceCheck) {
        tracing::info!(
            "Registered {} health check (threshold {})",
            check.kind(),
            check.threshold()
        );
        self.checks.write().push(check);
    }

    pub fn check_count(&self) -> usize {
        self.checks.read().len()
    }

    /// Runs a health pass over every node.
    ///
    /// With checks registered, each node's flag becomes "no check breached".
    /// Without checks the flags are left untouched and only aggregated.
    pub fn check_health(&self) -> HealthReport {
        let checks = self.checks.read().clone();
        let mut report = HealthReport::default();

        for node in self.registry.snapshot() {
            if !checks.is_empty() {
                let breaches: Vec<_> = checks
                    .iter()
                    .map(|check| check.evaluate(node.index()))
                    .filter(|outcome| outcome.breached)
                    .collect();

                if breaches.is_empty() {
                    node.mark_healthy();
                } else {
                    for outcome in &breaches {
                        tracing::warn!(
                            "Node {} breached {} check: {:.2} > {:.2}",
                            outcome.node,
                            outcome.kind,
                            outcome.value,
                            outcome.threshold
                        );
                    }
                    node.mark_unhealthy();
                    report.breaches.extend(breaches);
                }
            }

            if node.is_healthy() {
                report.healthy.push(node.index());
            } else {
                report.unhealthy.push(node.index());
            }
        }

        tracing::debug!(
            "Health pass: {} healthy, {} unhealthy",
            report.healthy.len(),
            report.unhealthy.len()
        );

        report
    }

    pub fn stats(&self) -> ReplicationStats {
        *self.replication_lock.lock()
    }
}
