//! Storage Service
//!
//! The entry point of the store. Every upload and download becomes a task on
//! the executor; the caller gets a `PendingResult` for the outcome.
//!
//! ## Write path
//! 1. Pick the primary: first healthy member of the object's placement set.
//! 2. Write the payload to the primary.
//! 3. Record `(id, primary)` in the metadata index.
//! 4. Replicate to the placement set.
//!
//! ## Read path
//! 1. Look up the primary in the metadata index.
//! 2. Read it if healthy; otherwise try the other healthy placement members.

use super::config::ServiceConfig;
use super::types::{ServiceStats, UploadReport};
use crate::error::{Result, StoreError};
use crate::executor::{PendingResult, TaskExecutor};
use crate::replication::{HealthReport, PlacementSet, ReplicationCoordinator, ResourceCheck};
use crate::storage::{MetadataIndex, NodeRegistry};

use bytes::Bytes;
use std::sync::Arc;

pub struct StorageService {
    config: ServiceConfig,
    executor: Arc<TaskExecutor>,
    registry: Arc<NodeRegistry>,
    metadata: Arc<MetadataIndex>,
    coordinator: Arc<ReplicationCoordinator>,
}

impl StorageService {
    /// Builds the registries and coordinator and starts the worker pool.
    /// Must be called from within a tokio runtime.
    pub fn start(config: ServiceConfig) -> Result<Self> {
        config.validate()?;

        let registry = NodeRegistry::new(config.node_count);
        let metadata = Arc::new(MetadataIndex::new());
        let coordinator = Arc::new(ReplicationCoordinator::new(
            registry.clone(),
            config.replication_factor,
        )?);
        let executor = TaskExecutor::start(config.worker_count)?;

        tracing::info!(
            "Storage service started: {} workers, {} nodes, replication factor {}",
            config.worker_count,
            config.node_count,
            config.replication_factor
        );

        Ok(Self {
            config,
            executor,
            registry,
            metadata,
            coordinator,
        })
    }

    /// Queues an upload. Only submission can fail here; the write itself is
    /// reported through the returned `PendingResult`.
    pub fn upload_object(
        &self,
        id: impl Into<String>,
        payload: impl Into<Bytes>,
    ) -> Result<PendingResult<UploadReport>> {
        let id = id.into();
        let payload = payload.into();
        let registry = self.registry.clone();
        let metadata = self.metadata.clone();
        let coordinator = self.coordinator.clone();

        tracing::debug!("Queueing upload of {} ({} bytes)", id, payload.len());

        self.executor.submit_with_result(async move {
            store_object(&registry, &metadata, &coordinator, id, payload)
        })
    }

    /// Queues a download. The result is the payload, or `NotFound`,
    /// `Inconsistent` or `NodeUnavailable`.
    pub fn download_object(&self, id: impl Into<String>) -> Result<PendingResult<Bytes>> {
        let id = id.into();
        let registry = self.registry.clone();
        let metadata = self.metadata.clone();
        let coordinator = self.coordinator.clone();

        self.executor.submit_with_result(async move {
            fetch_object(&registry, &metadata, &coordinator, &id)
        })
    }

    pub fn add_node(&self) -> usize {
        self.registry.add_node()
    }

    pub fn mark_node_unhealthy(&self, index: usize) -> Result<()> {
        self.registry.mark_unhealthy(index)
    }

    pub fn mark_node_healthy(&self, index: usize) -> Result<()> {
        self.registry.mark_healthy(index)
    }

    pub fn register_check(&self, check: ResourceCheck) {
        self.coordinator.register_check(check);
    }

    pub fn check_health(&self) -> HealthReport {
        self.coordinator.check_health()
    }

    pub fn placement_for(&self, id: &str) -> Result<PlacementSet> {
        self.coordinator.placement_for(id)
    }

    pub fn stats(&self) -> ServiceStats {
        let nodes = self.registry.snapshot();
        ServiceStats {
            worker_count: self.executor.worker_count(),
            queued_tasks: self.executor.queued(),
            node_count: nodes.len(),
            healthy_nodes: self.registry.healthy_count(),
            node_objects: nodes.iter().map(|n| n.object_count()).collect(),
            indexed_objects: self.metadata.len(),
            replication: self.coordinator.stats(),
        }
    }

    /// Stops accepting operations and waits for queued ones to finish.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down storage service");
        self.executor.shutdown().await;
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    pub fn metadata(&self) -> &Arc<MetadataIndex> {
        &self.metadata
    }

    pub fn coordinator(&self) -> &Arc<ReplicationCoordinator> {
        &self.coordinator
    }
}

fn store_object(
    registry: &NodeRegistry,
    metadata: &MetadataIndex,
    coordinator: &ReplicationCoordinator,
    id: String,
    payload: Bytes,
) -> Result<UploadReport> {
    let primary = coordinator.primary_for(&id)?;

    registry.get(primary)?.put(&id, payload.clone());
    metadata.record(&id, primary);

    // A short replication pass is reported, never rolled back.
    let replication = coordinator.replicate(&id, &payload)?;

    tracing::info!(
        "Stored {} on primary node {} ({}/{} copies)",
        id,
        primary,
        replication.copies(),
        replication.requested_factor
    );

    Ok(UploadReport {
        id,
        primary_node: primary,
        replication,
    })
}

fn fetch_object(
    registry: &NodeRegistry,
    metadata: &MetadataIndex,
    coordinator: &ReplicationCoordinator,
    id: &str,
) -> Result<Bytes> {
    let primary = metadata.locate(id)?;
    let node = registry.get(primary)?;

    if node.is_healthy() {
        return node.get(id).map_err(|_| {
            tracing::error!(
                "Metadata points {} at node {} but the node does not hold it",
                id,
                primary
            );
            StoreError::Inconsistent {
                id: id.to_string(),
                node: primary,
            }
        });
    }

    tracing::warn!(
        "Primary node {} for {} is unhealthy, trying replicas",
        primary,
        id
    );

    let placement = coordinator.placement_for(id)?;
    for &index in placement.nodes().iter().filter(|&&index| index != primary) {
        if let Ok(replica) = registry.get(index)
            && replica.is_healthy()
            && let Ok(payload) = replica.get(id)
        {
            tracing::debug!("Served {} from replica node {}", id, index);
            return Ok(payload);
        }
    }

    Err(StoreError::NodeUnavailable { node: primary })
}
