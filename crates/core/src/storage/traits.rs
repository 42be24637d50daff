use async_trait::async_trait;

use super::{Item, ItemKey, QueryOptions, Result};

/// A single-table key-value store: point gets, full-item puts, prefix range
/// queries and bounded batched deletes.
///
/// Exactly one implementation is chosen at process start and injected into
/// the repository; operations never branch on the deployment mode
/// themselves. The repository is the sole writer; no other component puts
/// or deletes items directly.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Point get by composite key. Absence is `Ok(None)`, not an error.
    async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>>;

    /// Writes an item, fully overwriting any existing item with the same
    /// key. No partial update exists at this layer.
    async fn put_item(&self, item: Item) -> Result<()>;

    /// Returns all items whose partition key equals `pk` and whose range
    /// key starts with `sk_prefix`, in range-key order (reversed when
    /// `options.scan_forward` is false), capped by `options.limit`.
    async fn query_prefix(
        &self,
        pk: &str,
        sk_prefix: &str,
        options: QueryOptions,
    ) -> Result<Vec<Item>>;

    /// Deletes up to [`MAX_BATCH_DELETE`](super::MAX_BATCH_DELETE) items in
    /// one physical call. Larger delete sets must be chunked by the caller;
    /// an oversized batch is rejected with `InvalidData`. An empty batch is
    /// a no-op.
    async fn delete_batch(&self, keys: &[ItemKey]) -> Result<()>;
}
