use serde_json::Value;

/// The maximum number of delete requests a single `delete_batch` call may
/// carry. DynamoDB's BatchWriteItem rejects larger batches, so callers must
/// chunk bigger delete sets into sequential batches of at most this size.
pub const MAX_BATCH_DELETE: usize = 25;

/// A stored item: the camelCase JSON projection of an entity plus the
/// `pk`, `sk` and `entityType` attributes.
pub type Item = serde_json::Map<String, Value>;

/// The composite key addressing a single item.
///
/// `pk` co-locates all rows of one owner; `sk` orders and distinguishes
/// rows within the partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemKey {
    pub pk: String,
    pub sk: String,
}

impl ItemKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

/// Options for a prefix range query.
#[derive(Debug, Clone, Copy)]
pub struct QueryOptions {
    /// Caps the number of returned items. `None` returns all matches.
    pub limit: Option<usize>,
    /// Scan direction over the range key: `true` is ascending key order.
    pub scan_forward: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            limit: None,
            scan_forward: true,
        }
    }
}
