mod error;
mod functions;
mod http_mapping;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use functions::{
    collection_link, database_link, document_link, document_partition, generate_document_id,
    partition_matches, stamp_system_metadata, validate_document_id, MAX_ID_LENGTH,
};
pub use http_mapping::repository_error_to_status_code;
pub use traits::DocumentStore;
pub use types::{
    CollectionRef, CollectionSpec, DatabaseRef, DocumentAddress, StoreSettings, DEFAULT_THROUGHPUT,
};
