//! In-memory document store implementation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use dyndoc_core::document::{PartitionKey, StoredDocument};
use dyndoc_core::storage::{
    document_partition, partition_matches, stamp_system_metadata, CollectionRef, CollectionSpec,
    DatabaseRef, DocumentAddress, DocumentStore, RepositoryError, Result,
};

/// A stored document together with the partition it was written to.
#[derive(Debug, Clone)]
struct Entry {
    partition: Option<String>,
    document: StoredDocument,
}

/// In-memory document store.
///
/// Uses HashMaps wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Data is not persisted and will be lost when the store is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryDocumentStore {
    databases: Arc<RwLock<HashSet<String>>>,
    collections: Arc<RwLock<HashMap<(String, String), CollectionRef>>>,
    documents: Arc<RwLock<HashMap<DocumentAddress, Entry>>>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            databases: Arc::new(RwLock::new(HashSet::new())),
            collections: Arc::new(RwLock::new(HashMap::new())),
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[cfg(test)]
    pub async fn database_count(&self) -> usize {
        self.databases.read().await.len()
    }

    #[cfg(test)]
    pub async fn collection_count(&self) -> usize {
        self.collections.read().await.len()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn create_database_if_absent(&self, id: &str) -> Result<DatabaseRef> {
        let mut databases = self.databases.write().await;
        if databases.insert(id.to_string()) {
            tracing::debug!(database_id = %id, "Created database");
        }
        Ok(DatabaseRef::new(id))
    }

    async fn create_collection_if_absent(
        &self,
        database: &DatabaseRef,
        spec: &CollectionSpec,
    ) -> Result<CollectionRef> {
        if !self.databases.read().await.contains(&database.id) {
            return Err(RepositoryError::NotFound {
                entity_type: "Database",
                id: database.id.clone(),
            });
        }

        let mut collections = self.collections.write().await;
        let collection = collections
            .entry((database.id.clone(), spec.id.clone()))
            .or_insert_with(|| {
                tracing::debug!(
                    database_id = %database.id,
                    collection_id = %spec.id,
                    partition_path = ?spec.partition_path,
                    throughput = spec.throughput,
                    "Created collection"
                );
                CollectionRef::new(&database.id, spec)
            });
        Ok(collection.clone())
    }

    async fn read_document(
        &self,
        address: &DocumentAddress,
        partition_key: Option<&PartitionKey>,
    ) -> Result<Option<StoredDocument>> {
        let partitioned = {
            let collections = self.collections.read().await;
            match collections.get(&(address.database_id.clone(), address.collection_id.clone())) {
                Some(collection) => collection.is_partitioned(),
                None => return Ok(None),
            }
        };

        let documents = self.documents.read().await;
        let Some(entry) = documents.get(address) else {
            return Ok(None);
        };

        if partition_matches(partitioned, entry.partition.as_deref(), partition_key)? {
            Ok(Some(entry.document.clone()))
        } else {
            Ok(None)
        }
    }

    async fn write_document(
        &self,
        collection: &CollectionRef,
        mut document: StoredDocument,
    ) -> Result<StoredDocument> {
        let id = document
            .id()
            .ok_or_else(|| RepositoryError::InvalidData("document has no id".to_string()))?
            .to_string();

        // Partitioning follows the collection as stored, not the caller's copy.
        let partition_path = {
            let collections = self.collections.read().await;
            collections
                .get(&(collection.database_id.clone(), collection.id.clone()))
                .ok_or_else(|| RepositoryError::NotFound {
                    entity_type: "Collection",
                    id: collection.id.clone(),
                })?
                .partition_path
                .clone()
        };
        let partition = document_partition(&document, partition_path.as_deref())?;

        let address = collection.document_address(&id);
        let mut documents = self.documents.write().await;
        if documents.contains_key(&address) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Document",
                id,
            });
        }

        stamp_system_metadata(&mut document, &address, Utc::now());
        documents.insert(
            address,
            Entry {
                partition,
                document: document.clone(),
            },
        );
        Ok(document)
    }
}
