mod error;
mod http_mapping;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use http_mapping::repository_error_to_status_code;
pub use traits::StorageBackend;
pub use types::{Item, ItemKey, QueryOptions, MAX_BATCH_DELETE};
