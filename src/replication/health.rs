//! Resource Checks
//!
//! One uniform probe type for every monitored resource. A check samples a
//! value for a node and compares it against a threshold; the coordinator
//! runs every registered check on every node during a health pass.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Cpu,
    Memory,
    Flash,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Cpu => f.write_str("cpu"),
            ResourceKind::Memory => f.write_str("memory"),
            ResourceKind::Flash => f.write_str("flash"),
        }
    }
}

/// Produces the current reading for a node index. Supplied by the host
/// environment (real probe, simulation, test fixture).
pub type Sampler = Arc<dyn Fn(usize) -> f64 + Send + Sync>;

/// A threshold check on one resource kind.
///
/// A node breaches the check when its sampled value is strictly above
/// `threshold`.
#[derive(Clone)]
pub struct ResourceCheck {
    kind: ResourceKind,
    threshold: f64,
    sampler: Sampler,
}

impl ResourceCheck {
    pub fn new<F>(kind: ResourceKind, threshold: f64, sampler: F) -> Self
    where
        F: Fn(usize) -> f64 + Send + Sync + 'static,
    {
        Self {
            kind,
            threshold,
            sampler: Arc::new(sampler),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn sample(&self, node: usize) -> f64 {
        (self.sampler)(node)
    }

    pub fn evaluate(&self, node: usize) -> CheckOutcome {
        let value = self.sample(node);
        CheckOutcome {
            node,
            kind: self.kind,
            value,
            threshold: self.threshold,
            breached: value > self.threshold,
        }
    }
}

impl fmt::Debug for ResourceCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCheck")
            .field("kind", &self.kind)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

/// The result of evaluating one check against one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub node: usize,
    pub kind: ResourceKind,
    pub value: f64,
    pub threshold: f64,
    pub breached: bool,
}
