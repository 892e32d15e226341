use crate::error::{Result, StoreError};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Where the primary copy of an object lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub id: String,
    pub primary_node: usize,
}

/// Maps object ids to their primary node. Last writer wins; no history.
#[derive(Default)]
pub struct MetadataIndex {
    records: DashMap<String, MetadataRecord>,
}

impl MetadataIndex {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Inserts or overwrites the record for `id`.
    pub fn record(&self, id: &str, node_index: usize) {
        let record = MetadataRecord {
            id: id.to_string(),
            primary_node: node_index,
        };
        if let Some(previous) = self.records.insert(id.to_string(), record)
            && previous.primary_node != node_index
        {
            tracing::debug!(
                "Primary for {} moved: node {} -> node {}",
                id,
                previous.primary_node,
                node_index
            );
        }
    }

    /// Returns the primary node index for `id`.
    pub fn locate(&self, id: &str) -> Result<usize> {
        self.records
            .get(id)
            .map(|entry| entry.primary_node)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    pub(crate) fn get(&self, id: &str) -> Option<MetadataRecord> {
        self.records.get(id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Snapshot of all records, in no particular order.
    pub(crate) fn records(&self) -> Vec<MetadataRecord> {
        self.records
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}
