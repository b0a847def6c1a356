use async_trait::async_trait;

use crate::document::{PartitionKey, StoredDocument};

use super::{CollectionRef, CollectionSpec, DatabaseRef, DocumentAddress, Result};

/// Client for a document database.
///
/// Creation calls are idempotent: when the resource already exists, whether
/// it was there before the call or was created concurrently, the existing
/// resource is returned rather than an error.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Gets the database with this id, creating it if needed.
    async fn create_database_if_absent(&self, id: &str) -> Result<DatabaseRef>;

    /// Gets a collection, creating it from `spec` if needed.
    async fn create_collection_if_absent(
        &self,
        database: &DatabaseRef,
        spec: &CollectionSpec,
    ) -> Result<CollectionRef>;

    /// Reads one document.
    ///
    /// Returns `Ok(None)` when the database, the collection or the document
    /// does not exist, or when the document lives in another partition.
    async fn read_document(
        &self,
        address: &DocumentAddress,
        partition_key: Option<&PartitionKey>,
    ) -> Result<Option<StoredDocument>>;

    /// Creates a document and returns it with store metadata populated.
    ///
    /// The document must carry an `id`; an id already present in the
    /// collection fails with `AlreadyExists`.
    async fn write_document(
        &self,
        collection: &CollectionRef,
        document: StoredDocument,
    ) -> Result<StoredDocument>;
}
