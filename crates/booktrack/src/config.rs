//! Environment-driven configuration.

use booktrack_core::storage::{RepositoryError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub storage: StorageConfig,
}

/// Which storage backend to run against, chosen once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// DynamoDB with the given table name.
    DynamoDb { table_name: String },
    /// Process-local in-memory storage for local development and tests.
    InMemory,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// `LOCAL_DEV=1` (or `true`) forces in-memory storage; otherwise
    /// `TABLE_NAME` selects DynamoDB. With neither set, local development
    /// is assumed and the in-memory backend is used.
    pub fn from_env() -> Result<Self> {
        let storage = storage_from(
            std::env::var("LOCAL_DEV").ok(),
            std::env::var("TABLE_NAME").ok(),
        )?;
        Ok(Self { storage })
    }
}

fn storage_from(local_dev: Option<String>, table_name: Option<String>) -> Result<StorageConfig> {
    if matches!(local_dev.as_deref(), Some("1") | Some("true")) {
        return Ok(StorageConfig::InMemory);
    }
    match table_name {
        Some(name) if !name.trim().is_empty() => Ok(StorageConfig::DynamoDb { table_name: name }),
        Some(_) => Err(RepositoryError::InvalidData(
            "TABLE_NAME is set but empty".to_string(),
        )),
        None => Ok(StorageConfig::InMemory),
    }
}
