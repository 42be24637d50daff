use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    /// A cascade delete committed some batches before a later one failed.
    ///
    /// The store has no multi-item transactions, so the rows deleted by
    /// earlier batches stay gone. Callers must not treat this as a clean
    /// failure: `deleted` child rows (and possibly the parent) are already
    /// removed while `remaining` rows survive.
    #[error(
        "Cascade delete of {entity_type} {id} incomplete: \
         {deleted} rows deleted, {remaining} remaining ({reason})"
    )]
    CascadeIncomplete {
        entity_type: &'static str,
        id: String,
        deleted: usize,
        remaining: usize,
        reason: String,
    },
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
