//! Node Registry
//!
//! The single owner of every `Node` in the service. Built once at startup and
//! shared by reference with the coordinator and the service; nodes are only
//! ever appended, so an index stays valid for the registry's lifetime.

use super::node::Node;
use crate::error::{Result, StoreError};

use parking_lot::RwLock;
use std::sync::Arc;

pub struct NodeRegistry {
    nodes: RwLock<Vec<Arc<Node>>>,
}

impl NodeRegistry {
    /// Creates a registry with `node_count` healthy, empty nodes
    /// indexed `0..node_count`.
    pub fn new(node_count: usize) -> Arc<Self> {
        let nodes = (0..node_count).map(|i| Arc::new(Node::new(i))).collect();
        Arc::new(Self {
            nodes: RwLock::new(nodes),
        })
    }

    /// Appends a new node and returns its index.
    ///
    /// Growing the registry changes `len()`, and with it every placement
    /// computed afterwards.
    pub fn add_node(&self) -> usize {
        let mut nodes = self.nodes.write();
        let index = nodes.len();
        nodes.push(Arc::new(Node::new(index)));
        tracing::info!("Added node {} (cluster size now {})", index, nodes.len());
        index
    }

    pub fn get(&self, index: usize) -> Result<Arc<Node>> {
        self.nodes
            .read()
            .get(index)
            .cloned()
            .ok_or(StoreError::UnknownNode { node: index })
    }

    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Point-in-time copy of the node list.
    pub fn snapshot(&self) -> Vec<Arc<Node>> {
        self.nodes.read().clone()
    }

    pub fn mark_healthy(&self, index: usize) -> Result<()> {
        self.get(index)?.mark_healthy();
        Ok(())
    }

    pub fn mark_unhealthy(&self, index: usize) -> Result<()> {
        self.get(index)?.mark_unhealthy();
        Ok(())
    }

    pub fn healthy_count(&self) -> usize {
        self.nodes.read().iter().filter(|n| n.is_healthy()).count()
    }
}
