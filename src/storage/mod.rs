//! Local Storage Module
//!
//! The in-memory state of the store.
//!
//! ## Core Concepts
//! - **Node**: an addressable object store with its own lock and a health flag.
//! - **Registry**: the owned list of nodes, shared by reference across components.
//! - **Metadata**: the id -> primary node index consulted on every read.

pub mod metadata;
pub mod node;
pub mod registry;

pub use metadata::{MetadataIndex, MetadataRecord};
pub use node::Node;
pub use registry::NodeRegistry;
