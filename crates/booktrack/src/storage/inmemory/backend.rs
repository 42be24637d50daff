use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use booktrack_core::storage::{Item, ItemKey, QueryOptions, Result, StorageBackend};

use crate::storage::conversions;

/// Map-based storage backend, behaviorally equivalent to the persistent one.
///
/// Partitions map to ordered range-key maps, so prefix queries return items
/// in range-key order for free, the same ordering contract the persistent
/// backend provides. Data is lost when the process exits. Single-process
/// development use only; the lock is the only synchronization.
///
/// Unlike the persistent backend there is no batch-size limit here, but the
/// repository chunks delete sets identically in both modes.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    partitions: Arc<RwLock<BTreeMap<String, BTreeMap<String, Item>>>>,
}

impl MemoryBackend {
    /// Creates a new empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored items across all partitions (test helper).
    pub async fn len(&self) -> usize {
        let partitions = self.partitions.read().await;
        partitions.values().map(|rows| rows.len()).sum()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>> {
        let partitions = self.partitions.read().await;
        Ok(partitions
            .get(&key.pk)
            .and_then(|rows| rows.get(&key.sk))
            .cloned())
    }

    async fn put_item(&self, item: Item) -> Result<()> {
        let key = conversions::item_key(&item)?;
        let mut partitions = self.partitions.write().await;
        partitions.entry(key.pk).or_default().insert(key.sk, item);
        Ok(())
    }

    async fn query_prefix(
        &self,
        pk: &str,
        sk_prefix: &str,
        options: QueryOptions,
    ) -> Result<Vec<Item>> {
        let partitions = self.partitions.read().await;
        let Some(rows) = partitions.get(pk) else {
            return Ok(Vec::new());
        };

        // Range scan from the prefix, in key order.
        let mut items: Vec<Item> = rows
            .range(sk_prefix.to_string()..)
            .take_while(|(sk, _)| sk.starts_with(sk_prefix))
            .map(|(_, item)| item.clone())
            .collect();

        if !options.scan_forward {
            items.reverse();
        }
        if let Some(limit) = options.limit {
            items.truncate(limit);
        }
        Ok(items)
    }

    async fn delete_batch(&self, keys: &[ItemKey]) -> Result<()> {
        let mut partitions = self.partitions.write().await;
        for key in keys {
            if let Some(rows) = partitions.get_mut(&key.pk) {
                rows.remove(&key.sk);
            }
        }
        Ok(())
    }
}
