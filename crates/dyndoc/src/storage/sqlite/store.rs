//! SQLite document store implementation.
//!
//! Implements `dyndoc_core::storage::DocumentStore` using SQLite.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use dyndoc_core::document::{PartitionKey, StoredDocument};
use dyndoc_core::storage::{
    collection_link, document_partition, partition_matches, stamp_system_metadata, CollectionRef,
    CollectionSpec, DatabaseRef, DocumentAddress, DocumentStore, RepositoryError, Result,
};

use super::error::map_tokio_rusqlite_error;
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

fn row_to_collection(row: &Row) -> rusqlite::Result<CollectionRef> {
    let database_id: String = row.get(0)?;
    let id: String = row.get(1)?;
    let partition_path: Option<String> = row.get(2)?;
    let throughput: u32 = row.get(3)?;

    Ok(CollectionRef {
        self_link: collection_link(&database_id, &id),
        database_id,
        id,
        partition_path,
        throughput,
    })
}

fn select_collection(
    conn: &rusqlite::Connection,
    database_id: &str,
    collection_id: &str,
) -> rusqlite::Result<Option<CollectionRef>> {
    conn.query_row(
        schema::SELECT_COLLECTION,
        params![database_id, collection_id],
        row_to_collection,
    )
    .optional()
}

/// SQLite-based document store.
pub struct SqliteDocumentStore {
    conn: Connection,
}

impl SqliteDocumentStore {
    /// Creates a new store backed by a database file.
    ///
    /// The file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new store with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES).map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    async fn collection(&self, database_id: &str, collection_id: &str) -> Result<Option<CollectionRef>> {
        let database_id = database_id.to_string();
        let collection_id = collection_id.to_string();
        let id = collection_id.clone();

        self.conn
            .call(move |conn| select_collection(conn, &database_id, &collection_id).map_err(wrap_err))
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Collection", id))
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn create_database_if_absent(&self, id: &str) -> Result<DatabaseRef> {
        let database_id = id.to_string();
        let now = Utc::now().timestamp();

        let inserted = self
            .conn
            .call(move |conn| {
                conn.execute(schema::INSERT_DATABASE, params![database_id, now])
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Database", id))?;

        if inserted > 0 {
            tracing::debug!(database_id = %id, "Created database");
        }
        Ok(DatabaseRef::new(id))
    }

    async fn create_collection_if_absent(
        &self,
        database: &DatabaseRef,
        spec: &CollectionSpec,
    ) -> Result<CollectionRef> {
        let database_id = database.id.clone();
        let spec_owned = spec.clone();
        let now = Utc::now().timestamp();

        let created = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;

                let database_exists = tx
                    .query_row(schema::SELECT_DATABASE_EXISTS, [&database_id], |_| Ok(()))
                    .optional()
                    .map_err(wrap_err)?
                    .is_some();
                if !database_exists {
                    return Ok(None);
                }

                let inserted = tx
                    .execute(
                        schema::INSERT_COLLECTION,
                        params![
                            database_id,
                            spec_owned.id,
                            spec_owned.partition_path,
                            spec_owned.throughput,
                            now
                        ],
                    )
                    .map_err(wrap_err)?;
                let collection = select_collection(&tx, &database_id, &spec_owned.id)
                    .map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;

                Ok(collection.map(|c| (c, inserted > 0)))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Collection", &spec.id))?;

        match created {
            Some((collection, inserted)) => {
                if inserted {
                    tracing::debug!(
                        database_id = %collection.database_id,
                        collection_id = %collection.id,
                        partition_path = ?collection.partition_path,
                        throughput = collection.throughput,
                        "Created collection"
                    );
                }
                Ok(collection)
            }
            None => Err(RepositoryError::NotFound {
                entity_type: "Database",
                id: database.id.clone(),
            }),
        }
    }

    async fn read_document(
        &self,
        address: &DocumentAddress,
        partition_key: Option<&PartitionKey>,
    ) -> Result<Option<StoredDocument>> {
        let owned = address.clone();

        let row = self
            .conn
            .call(move |conn| {
                let Some(collection) =
                    select_collection(conn, &owned.database_id, &owned.collection_id)
                        .map_err(wrap_err)?
                else {
                    return Ok(None);
                };

                let document = conn
                    .query_row(
                        schema::SELECT_DOCUMENT,
                        params![owned.database_id, owned.collection_id, owned.document_id],
                        |row| Ok((row.get::<_, Option<String>>(0)?, row.get::<_, String>(1)?)),
                    )
                    .optional()
                    .map_err(wrap_err)?;

                Ok(document.map(|(partition, body)| (collection.is_partitioned(), partition, body)))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Document", &address.document_id))?;

        let Some((partitioned, partition, body)) = row else {
            return Ok(None);
        };

        if !partition_matches(partitioned, partition.as_deref(), partition_key)? {
            return Ok(None);
        }

        StoredDocument::from_json_str(&body).map(Some)
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

        let stored_collection = self
            .collection(&collection.database_id, &collection.id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound {
                entity_type: "Collection",
                id: collection.id.clone(),
            })?;
        let partition = document_partition(&document, stored_collection.partition_path.as_deref())?;

        let address = collection.document_address(&id);
        stamp_system_metadata(&mut document, &address, Utc::now());
        let body = document.to_json_string()?;

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_DOCUMENT,
                    params![
                        address.database_id,
                        address.collection_id,
                        address.document_id,
                        partition,
                        body
                    ],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Document", &id))?;

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn setup(spec: CollectionSpec) -> (SqliteDocumentStore, CollectionRef) {
        let store = SqliteDocumentStore::new_in_memory().await.unwrap();
        let db = store.create_database_if_absent("db").await.unwrap();
        let collection = store.create_collection_if_absent(&db, &spec).await.unwrap();
        (store, collection)
    }

    fn doc(value: serde_json::Value) -> StoredDocument {
        StoredDocument::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_create_database_twice() {
        let store = SqliteDocumentStore::new_in_memory().await.unwrap();

        let first = store.create_database_if_absent("db").await.unwrap();
        let second = store.create_database_if_absent("db").await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_create_collection_requires_database() {
        let store = SqliteDocumentStore::new_in_memory().await.unwrap();

        let result = store
            .create_collection_if_absent(&DatabaseRef::new("db"), &CollectionSpec::new("c"))
            .await;

        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_existing_collection_keeps_original_spec() {
        let (store, original) =
            setup(CollectionSpec::new("c").partitioned("/_partitionPath").with_throughput(800))
                .await;

        let again = store
            .create_collection_if_absent(&DatabaseRef::new("db"), &CollectionSpec::new("c"))
            .await
            .unwrap();

        assert_eq!(again, original);
        assert_eq!(again.throughput, 800);
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let (store, collection) = setup(CollectionSpec::new("c")).await;

        let written = store
            .write_document(
                &collection,
                doc(json!({"id": "a", "supplier": {"name": "Spaceys Sprockets"}})),
            )
            .await
            .unwrap();
        let read = store
            .read_document(&collection.document_address("a"), None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(read, written);
        assert_eq!(
            read.pointer("/supplier/name"),
            Some(&json!("Spaceys Sprockets"))
        );
    }

    #[tokio::test]
    async fn test_write_duplicate_id_fails() {
        let (store, collection) = setup(CollectionSpec::new("c")).await;
        store
            .write_document(&collection, doc(json!({"id": "a"})))
            .await
            .unwrap();

        let result = store
            .write_document(&collection, doc(json!({"id": "a"})))
            .await;

        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_ids_are_unique_across_partitions() {
        let (store, collection) = setup(CollectionSpec::new("c").partitioned("/_partitionPath")).await;
        store
            .write_document(&collection, doc(json!({"id": "a", "_partitionPath": "p1"})))
            .await
            .unwrap();

        let result = store
            .write_document(&collection, doc(json!({"id": "a", "_partitionPath": "p2"})))
            .await;

        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_read_missing_document_is_none() {
        let (store, collection) = setup(CollectionSpec::new("c")).await;

        let read = store
            .read_document(&collection.document_address("nope"), None)
            .await
            .unwrap();

        assert!(read.is_none());
    }

    #[tokio::test]
    async fn test_partitioned_reads_are_scoped() {
        let (store, collection) = setup(CollectionSpec::new("c").partitioned("/_partitionPath")).await;
        store
            .write_document(&collection, doc(json!({"id": "a", "_partitionPath": "p1"})))
            .await
            .unwrap();
        let address = collection.document_address("a");

        assert!(store
            .read_document(&address, Some(&PartitionKey::new("p1")))
            .await
            .unwrap()
            .is_some());
        assert!(store
            .read_document(&address, Some(&PartitionKey::new("p2")))
            .await
            .unwrap()
            .is_none());
        assert!(store.read_document(&address, None).await.is_err());
    }
}
