//! Storage Service Module
//!
//! The façade tying the executor, the node registry, the metadata index and
//! the replication coordinator together.
//!
//! ## Submodules
//! - **`service`**: `StorageService` with the upload/download and admin operations.
//! - **`config`**: construction-time settings and flag parsing.
//! - **`types`**: upload reports and operator stats.

pub mod config;
pub mod service;
pub mod types;

pub use config::ServiceConfig;
pub use service::StorageService;
pub use types::{ServiceStats, UploadReport};

#[cfg(test)]
mod tests;
