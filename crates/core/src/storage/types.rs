use std::fmt;

use serde::{Deserialize, Serialize};

use super::functions::{collection_link, database_link, document_link};

/// Throughput provisioned for a collection when none is configured.
pub const DEFAULT_THROUGHPUT: u32 = 400;

/// Handle to a database that is known to exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseRef {
    pub id: String,
    pub self_link: String,
}

impl DatabaseRef {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let self_link = database_link(&id);
        Self { id, self_link }
    }
}

/// How a collection should look if it has to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    pub id: String,
    /// Path of the partition value inside each document, e.g. `/_partitionPath`.
    /// `None` for an unpartitioned collection.
    pub partition_path: Option<String>,
    pub throughput: u32,
}

impl CollectionSpec {
    /// Unpartitioned collection with the default throughput.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            partition_path: None,
            throughput: DEFAULT_THROUGHPUT,
        }
    }

    pub fn partitioned(mut self, partition_path: impl Into<String>) -> Self {
        self.partition_path = Some(partition_path.into());
        self
    }

    pub fn with_throughput(mut self, throughput: u32) -> Self {
        self.throughput = throughput;
        self
    }

    pub fn is_partitioned(&self) -> bool {
        self.partition_path.is_some()
    }
}

/// Handle to a collection that is known to exist.
///
/// Carries the settings the collection was actually created with, which may
/// differ from the caller's spec if somebody else created it first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRef {
    pub database_id: String,
    pub id: String,
    pub self_link: String,
    pub partition_path: Option<String>,
    pub throughput: u32,
}

impl CollectionRef {
    pub fn new(database_id: impl Into<String>, spec: &CollectionSpec) -> Self {
        let database_id = database_id.into();
        let self_link = collection_link(&database_id, &spec.id);
        Self {
            database_id,
            id: spec.id.clone(),
            self_link,
            partition_path: spec.partition_path.clone(),
            throughput: spec.throughput,
        }
    }

    pub fn is_partitioned(&self) -> bool {
        self.partition_path.is_some()
    }

    /// Address of a document inside this collection.
    pub fn document_address(&self, document_id: impl Into<String>) -> DocumentAddress {
        DocumentAddress::new(&self.database_id, &self.id, document_id)
    }
}

/// Fully qualified address of one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentAddress {
    pub database_id: String,
    pub collection_id: String,
    pub document_id: String,
}

impl DocumentAddress {
    pub fn new(
        database_id: impl Into<String>,
        collection_id: impl Into<String>,
        document_id: impl Into<String>,
    ) -> Self {
        Self {
            database_id: database_id.into(),
            collection_id: collection_id.into(),
            document_id: document_id.into(),
        }
    }

    pub fn self_link(&self) -> String {
        document_link(&self.database_id, &self.collection_id, &self.document_id)
    }
}

impl fmt::Display for DocumentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.self_link())
    }
}

/// Where a repository keeps its documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    pub database_id: String,
    pub collection: CollectionSpec,
}

impl StoreSettings {
    pub fn new(database_id: impl Into<String>, collection: CollectionSpec) -> Self {
        Self {
            database_id: database_id.into(),
            collection,
        }
    }
}
