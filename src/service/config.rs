use crate::error::{Result, StoreError};

use serde::{Deserialize, Serialize};

/// Construction-time settings for a `StorageService`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Number of executor workers. Must be at least 1.
    pub worker_count: usize,
    /// Nodes created at startup. Must be at least 1.
    pub node_count: usize,
    /// Copies kept per object. Values above `node_count` are accepted but
    /// leave every object under-replicated.
    pub replication_factor: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            node_count: 3,
            replication_factor: 2,
        }
    }
}

impl ServiceConfig {
    pub fn new(worker_count: usize, node_count: usize, replication_factor: usize) -> Self {
        Self {
            worker_count,
            node_count,
            replication_factor,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(StoreError::InvalidConfig(
                "worker_count must be at least 1".to_string(),
            ));
        }
        if self.node_count == 0 {
            return Err(StoreError::InvalidConfig(
                "node_count must be at least 1".to_string(),
            ));
        }
        if self.replication_factor == 0 {
            return Err(StoreError::InvalidConfig(
                "replication_factor must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses `--workers`, `--nodes` and `--replication` flags on top of the
    /// defaults. The first item is the program name and is skipped.
    pub fn from_args<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();
        let mut config = Self::default();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--workers" => {
                    config.worker_count = flag_value(&args, i)?.parse()?;
                    i += 2;
                }
                "--nodes" => {
                    config.node_count = flag_value(&args, i)?.parse()?;
                    i += 2;
                }
                "--replication" => {
                    config.replication_factor = flag_value(&args, i)?.parse()?;
                    i += 2;
                }
                other => {
                    tracing::warn!("Ignoring unknown argument {}", other);
                    i += 1;
                }
            }
        }

        config.validate()?;
        Ok(config)
    }
}

fn flag_value(args: &[String], i: usize) -> anyhow::Result<&str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("{} requires a value", args[i]))
}
