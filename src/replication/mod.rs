//! Replication Module
//!
//! Whole-object replication across the node registry.
//!
//! ## Core Concepts
//! - **Placement**: `hash(id) mod node_count` picks the primary; the next
//!   `replication_factor - 1` indices (wrapping) hold the copies.
//! - **Fan-out**: the coordinator writes every healthy placement member under a
//!   single lock, so replication passes never interleave.
//! - **Health**: `ResourceCheck`s sample per-node readings; the coordinator flips
//!   health flags from them and reports the aggregate.

pub mod coordinator;
pub mod health;
pub mod placement;
pub mod types;

pub use coordinator::ReplicationCoordinator;
pub use health::{CheckOutcome, ResourceCheck, ResourceKind};
pub use placement::{PlacementSet, hash_id};
pub use types::{HealthReport, ReplicaFailure, ReplicationReport, ReplicationStats};
