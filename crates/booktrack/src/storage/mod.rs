//! Storage composition root.
//!
//! Key generation is in [`keys`], the entity mapper in [`conversions`],
//! the backends in [`dynamodb`] and [`inmemory`], and the repository that
//! ties them together in [`repository`]. Which backend backs the
//! repository is decided once at startup from configuration; everything
//! above this module only ever sees `Repository`.

use std::sync::Arc;

use tracing::info;

use booktrack_core::storage::{Result, StorageBackend};

use crate::config::StorageConfig;

pub mod conversions;
pub mod dynamodb;
pub mod inmemory;
pub mod keys;
mod repository;

pub use repository::{ListBooksOptions, ListEventsOptions, Repository, DEFAULT_EVENT_LIMIT};

/// Build the storage backend named by the configuration.
pub async fn backend_from_config(config: &StorageConfig) -> Result<Arc<dyn StorageBackend>> {
    match config {
        StorageConfig::DynamoDb { table_name } => {
            info!(table_name, "using DynamoDB storage");
            let backend = dynamodb::DynamoBackend::connect(table_name.clone()).await?;
            Ok(Arc::new(backend))
        }
        StorageConfig::InMemory => {
            info!("using in-memory storage");
            Ok(Arc::new(inmemory::MemoryBackend::new()))
        }
    }
}
