//! DynamoDB storage backend.
//!
//! Implements the [`StorageBackend`](booktrack_core::storage::StorageBackend)
//! contract on top of `aws-sdk-dynamodb`: point gets, full-item puts,
//! `begins_with` prefix queries and BatchWriteItem deletes.

mod backend;
mod error;
mod marshall;

pub use backend::DynamoBackend;
