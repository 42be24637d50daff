//! DynamoDB-backed storage.
//!
//! One table, generic `pk`/`sk` string keys. Prefix reads use
//! `begins_with(sk, ...)` against the partition so results come back in
//! lexicographic key order, which for events is chronological order.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, DeleteRequest, WriteRequest};
use aws_sdk_dynamodb::Client;
use tracing::warn;

use booktrack_core::storage::{
    Item, ItemKey, QueryOptions, RepositoryError, Result, StorageBackend, MAX_BATCH_DELETE,
};

use super::error::{
    map_batch_write_error, map_connection_error, map_get_item_error, map_put_item_error,
    map_query_error,
};
use super::marshall::{attributes_to_item, item_to_attributes};

#[derive(Debug, Clone)]
pub struct DynamoBackend {
    client: Client,
    table_name: String,
}

impl DynamoBackend {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Build a backend from the ambient AWS environment (profile, region,
    /// credentials) and verify the table is reachable.
    pub async fn connect(table_name: impl Into<String>) -> Result<Self> {
        let config =
            aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&config);
        let backend = Self::new(client, table_name);
        backend
            .client
            .describe_table()
            .table_name(&backend.table_name)
            .send()
            .await
            .map_err(map_connection_error)?;
        Ok(backend)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl StorageBackend for DynamoBackend {
    async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("pk", AttributeValue::S(key.pk.clone()))
            .key("sk", AttributeValue::S(key.sk.clone()))
            .send()
            .await
            .map_err(map_get_item_error)?;

        match output.item {
            Some(attributes) => Ok(Some(attributes_to_item(&attributes)?)),
            None => Ok(None),
        }
    }

    async fn put_item(&self, item: Item) -> Result<()> {
        let attributes = item_to_attributes(&item);
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(attributes))
            .send()
            .await
            .map_err(map_put_item_error)?;
        Ok(())
    }

    async fn query_prefix(
        &self,
        pk: &str,
        sk_prefix: &str,
        options: QueryOptions,
    ) -> Result<Vec<Item>> {
        let mut request = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("pk = :pk AND begins_with(sk, :sk)")
            .expression_attribute_values(":pk", AttributeValue::S(pk.to_string()))
            .expression_attribute_values(":sk", AttributeValue::S(sk_prefix.to_string()))
            .scan_index_forward(options.scan_forward);

        if let Some(limit) = options.limit {
            request = request.limit(i32::try_from(limit).unwrap_or(i32::MAX));
        }

        let output = request.send().await.map_err(map_query_error)?;

        output
            .items()
            .iter()
            .map(attributes_to_item)
            .collect::<Result<Vec<_>>>()
    }

    async fn delete_batch(&self, keys: &[ItemKey]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        if keys.len() > MAX_BATCH_DELETE {
            return Err(RepositoryError::InvalidData(format!(
                "delete_batch accepts at most {} keys, got {}",
                MAX_BATCH_DELETE,
                keys.len()
            )));
        }

        let requests = keys
            .iter()
            .map(|key| {
                let delete = DeleteRequest::builder()
                    .key("pk", AttributeValue::S(key.pk.clone()))
                    .key("sk", AttributeValue::S(key.sk.clone()))
                    .build()
                    .map_err(|err| {
                        RepositoryError::InvalidData(format!(
                            "Failed to build delete request: {}",
                            err
                        ))
                    })?;
                Ok(WriteRequest::builder().delete_request(delete).build())
            })
            .collect::<Result<Vec<_>>>()?;

        let output = self
            .client
            .batch_write_item()
            .request_items(&self.table_name, requests)
            .send()
            .await
            .map_err(map_batch_write_error)?;

        if let Some(unprocessed) = output.unprocessed_items() {
            let pending: usize = unprocessed.values().map(Vec::len).sum();
            if pending > 0 {
                warn!(pending, table = %self.table_name, "batch delete left unprocessed items");
                return Err(RepositoryError::QueryFailed(format!(
                    "{} delete requests were not processed",
                    pending
                )));
            }
        }

        Ok(())
    }
}
