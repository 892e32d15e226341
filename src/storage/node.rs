use crate::error::{Result, StoreError};

use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// A single storage node: an in-memory object store plus a health flag.
///
/// Store access is serialized by one mutex per node, so writers targeting
/// different nodes proceed in parallel. The health flag is an atomic and never
/// contends with store access.
#[derive(Debug)]
pub struct Node {
    index: usize,
    store: Mutex<HashMap<String, Bytes>>,
    healthy: AtomicBool,
}

impl Node {
    /// Creates an empty, healthy node.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            store: Mutex::new(HashMap::new()),
            healthy: AtomicBool::new(true),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Stores the payload, replacing any previous payload for `id`.
    pub fn put(&self, id: &str, payload: Bytes) {
        let previous = self.store.lock().insert(id.to_string(), payload);
        tracing::trace!(
            "Node {} stored {} (overwrite: {})",
            self.index,
            id,
            previous.is_some()
        );
    }

    pub fn get(&self, id: &str) -> Result<Bytes> {
        self.store
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.store.lock().contains_key(id)
    }

    pub fn remove(&self, id: &str) -> Option<Bytes> {
        self.store.lock().remove(id)
    }

    pub fn object_count(&self) -> usize {
        self.store.lock().len()
    }

    pub fn mark_healthy(&self) {
        if !self.healthy.swap(true, Ordering::SeqCst) {
            tracing::info!("Node {} marked healthy", self.index);
        }
    }

    pub fn mark_unhealthy(&self) {
        if self.healthy.swap(false, Ordering::SeqCst) {
            tracing::warn!("Node {} marked unhealthy", self.index);
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}
