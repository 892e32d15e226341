use crate::error::{Result, StoreError};

use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Hashes an object id. `DefaultHasher::new()` uses fixed keys, so the value
/// is stable across calls and across coordinators in the same build.
pub fn hash_id(id: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    hasher.finish()
}

/// The ordered, duplicate-free list of nodes that should hold an object.
///
/// Computed from `(id, node_count, replication_factor)` alone and never
/// stored. The first entry is the designated primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementSet {
    nodes: Vec<usize>,
    requested_factor: usize,
}

impl PlacementSet {
    /// Walks `(hash(id) + k) mod node_count` for `k = 0..replication_factor`,
    /// keeping the first occurrence of each index.
    ///
    /// When `replication_factor > node_count` the set holds every node once
    /// and `is_degraded()` reports the shortfall. A factor of 0 is treated as 1
    /// so the set always has a primary.
    pub fn compute(id: &str, node_count: usize, replication_factor: usize) -> Result<Self> {
        if node_count == 0 {
            return Err(StoreError::NoNodes);
        }

        let requested_factor = replication_factor.max(1);
        let base = (hash_id(id) % node_count as u64) as usize;

        let mut nodes = Vec::with_capacity(requested_factor.min(node_count));
        for k in 0..requested_factor {
            let index = (base + k) % node_count;
            if nodes.contains(&index) {
                break;
            }
            nodes.push(index);
        }

        Ok(Self {
            nodes,
            requested_factor,
        })
    }

    /// Only built by `compute`, which never returns an empty set.
    pub fn primary(&self) -> usize {
        self.nodes[0]
    }

    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.nodes.contains(&index)
    }

    pub fn requested_factor(&self) -> usize {
        self.requested_factor
    }

    /// True when fewer distinct nodes exist than the factor asks for.
    pub fn is_degraded(&self) -> bool {
        self.nodes.len() < self.requested_factor
    }
}
