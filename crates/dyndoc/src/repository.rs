//! Repository facade over a document store.
//!
//! A `DocumentRepository<K>` persists documents of one variant into the
//! database and collection named by its `StoreSettings`, creating both on
//! first use.

use std::marker::PhantomData;
use std::sync::Arc;

use tokio::sync::OnceCell;

use dyndoc_core::document::{Document, DocumentKind, Inventory, Materialized, StoredDocument};
use dyndoc_core::storage::{
    generate_document_id, validate_document_id, CollectionRef, DatabaseRef, DocumentAddress,
    DocumentStore, Result, StoreSettings,
};

/// Typed access to the documents of variant `K`.
pub struct DocumentRepository<K: DocumentKind> {
    store: Arc<dyn DocumentStore>,
    settings: StoreSettings,
    database: DatabaseRef,
    collection: OnceCell<CollectionRef>,
    kind: PhantomData<fn() -> K>,
}

/// Repository for inventory items.
pub type InventoryRepository = DocumentRepository<Inventory>;

impl<K: DocumentKind> DocumentRepository<K> {
    /// Connects to the configured database, creating it if it does not exist.
    pub async fn connect(store: Arc<dyn DocumentStore>, settings: StoreSettings) -> Result<Self> {
        let database = store
            .create_database_if_absent(&settings.database_id)
            .await?;

        tracing::info!(
            database_id = %database.id,
            collection_id = %settings.collection.id,
            document_type = K::DOCUMENT_TYPE,
            "Repository connected"
        );

        Ok(Self {
            store,
            settings,
            database,
            collection: OnceCell::new(),
            kind: PhantomData,
        })
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Returns the configured collection, creating it if it does not exist.
    ///
    /// An existing collection is used as found; its partitioning and
    /// throughput are not changed to match the settings.
    pub async fn ensure_collection(&self) -> Result<&CollectionRef> {
        self.collection
            .get_or_try_init(|| async {
                self.store
                    .create_collection_if_absent(&self.database, &self.settings.collection)
                    .await
            })
            .await
    }

    /// Reads a document by id.
    ///
    /// Reads from a partitioned collection are scoped to the partition of
    /// variant `K`. Returns `Ok(None)` when no such document is visible.
    /// Never creates the collection.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Materialized<K>>> {
        let address = DocumentAddress::new(
            &self.settings.database_id,
            &self.settings.collection.id,
            id,
        );
        let partitioned = match self.collection.get() {
            Some(collection) => collection.is_partitioned(),
            None => self.settings.collection.is_partitioned(),
        };
        let partition_key = partitioned.then(K::partition_key);

        tracing::debug!(
            address = %address,
            partition_key = ?partition_key,
            "Reading document"
        );

        let stored = self
            .store
            .read_document(&address, partition_key.as_ref())
            .await?;

        match stored {
            Some(stored) => Ok(Some(stored.materialize())),
            None => {
                tracing::debug!(address = %address, "Document not found");
                Ok(None)
            }
        }
    }

    /// Creates a document and returns what the store handed back.
    ///
    /// A document without an id gets a fresh one.
    pub async fn put(&self, document: &Document<K>) -> Result<Materialized<K>> {
        let stored = document.to_stored()?;
        self.write(stored).await
    }

    /// Creates a document after a round trip through its JSON text.
    ///
    /// The store receives a plain map parsed from the serialized document
    /// rather than the document value itself.
    pub async fn put_untyped(&self, document: &Document<K>) -> Result<Materialized<K>> {
        let json = document.to_stored()?.to_json_string()?;
        let stored = StoredDocument::from_json_str(&json)?;
        self.write(stored).await
    }

    async fn write(&self, mut stored: StoredDocument) -> Result<Materialized<K>> {
        let id = match stored.id() {
            Some(id) => id.to_string(),
            None => {
                let id = generate_document_id();
                stored.set_id(&id);
                id
            }
        };
        validate_document_id(&id)?;

        let collection = self.ensure_collection().await?;
        let written = self.store.write_document(collection, stored).await?;

        let materialized = written.materialize::<K>();
        tracing::info!(
            document_id = %id,
            collection_id = %collection.id,
            typed = materialized.is_typed(),
            "Document written"
        );
        Ok(materialized)
    }
}
