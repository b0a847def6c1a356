//! DynamoDB document store implementation.
//!
//! Implements `dyndoc_core::storage::DocumentStore` using DynamoDB.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_dynamodb::config::Credentials;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, GlobalSecondaryIndex, KeySchemaElement, KeyType, Projection,
    ProjectionType, ProvisionedThroughput, ScalarAttributeType, TableStatus,
};
use aws_sdk_dynamodb::Client;
use chrono::Utc;
use tokio::sync::RwLock;

use dyndoc_core::document::{PartitionKey, StoredDocument};
use dyndoc_core::storage::{
    document_partition, partition_matches, stamp_system_metadata, CollectionRef, CollectionSpec,
    DatabaseRef, DocumentAddress, DocumentStore, RepositoryError, Result,
};

use super::conversions::{
    collection_from_description, document_key, document_to_item, is_table_ready, item_partition,
    item_to_document, table_name, ATTR_ID, PARTITION_INDEX,
};
use super::error::{
    map_create_table_error, map_describe_table_error, map_get_item_error, map_put_item_error,
};
use crate::config::Config;

/// Maximum number of status polls while a new table becomes active.
const TABLE_ACTIVE_MAX_ATTEMPTS: u32 = 60;
/// Delay between status polls.
const TABLE_ACTIVE_POLL_DELAY: Duration = Duration::from_secs(2);

/// DynamoDB-based document store.
pub struct DynamoDbDocumentStore {
    client: Client,
    /// Collections seen so far, keyed by table name.
    collections: RwLock<HashMap<String, CollectionRef>>,
}

impl DynamoDbDocumentStore {
    /// Creates a new store with the given DynamoDB client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a new store from application configuration.
    ///
    /// A loopback `store_endpoint` is treated as a local emulator and gets
    /// fixed placeholder credentials.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.aws_region.clone()));

        if let Some(endpoint) = &config.store_endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        if config.uses_local_emulator() {
            tracing::info!(endpoint = ?config.store_endpoint, "Using local DynamoDB emulator");
            loader = loader.credentials_provider(Credentials::new(
                "local",
                "local",
                None,
                None,
                "dyndoc-local",
            ));
        }

        let sdk_config = loader.load().await;
        Ok(Self::new(Client::new(&sdk_config)))
    }

    /// Looks up a collection, asking DynamoDB when it is not cached.
    ///
    /// A table that is still being created elsewhere is waited for; only
    /// active tables are cached.
    async fn collection(&self, database_id: &str, collection_id: &str) -> Result<Option<CollectionRef>> {
        let table = table_name(database_id, collection_id);
        if let Some(collection) = self.collections.read().await.get(&table) {
            return Ok(Some(collection.clone()));
        }

        let collection = match self.describe(database_id, collection_id).await? {
            None => return Ok(None),
            Some((collection, status)) if is_table_ready(status.as_ref()) => collection,
            Some((_, status)) => {
                tracing::debug!(table = %table, status = ?status, "Table is not active yet");
                self.wait_for_table_active(database_id, collection_id).await?
            }
        };
        self.collections
            .write()
            .await
            .insert(table, collection.clone());
        Ok(Some(collection))
    }

    /// Describes the table backing a collection, with its current status.
    async fn describe(
        &self,
        database_id: &str,
        collection_id: &str,
    ) -> Result<Option<(CollectionRef, Option<TableStatus>)>> {
        let table = table_name(database_id, collection_id);
        match self.client.describe_table().table_name(&table).send().await {
            Ok(response) => {
                let description = response.table().ok_or_else(|| {
                    RepositoryError::QueryFailed(format!("No description returned for {table}"))
                })?;
                Ok(Some((
                    collection_from_description(database_id, collection_id, description),
                    description.table_status().cloned(),
                )))
            }
            Err(err) => map_describe_table_error(err).map(|_| None),
        }
    }

    async fn create_table(&self, database_id: &str, spec: &CollectionSpec) -> Result<()> {
        let table = table_name(database_id, &spec.id);

        let throughput = ProvisionedThroughput::builder()
            .read_capacity_units(i64::from(spec.throughput))
            .write_capacity_units(i64::from(spec.throughput))
            .build()
            .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;

        let mut attributes = vec![string_attribute(ATTR_ID)?];
        let mut indexes = Vec::new();
        if let Some(path) = &spec.partition_path {
            attributes.push(string_attribute(path)?);
            indexes.push(partition_index(path, throughput.clone())?);
        }

        let result = self
            .client
            .create_table()
            .table_name(&table)
            .key_schema(key_element(ATTR_ID, KeyType::Hash)?)
            .set_attribute_definitions(Some(attributes))
            .set_global_secondary_indexes((!indexes.is_empty()).then_some(indexes))
            .billing_mode(BillingMode::Provisioned)
            .provisioned_throughput(throughput)
            .send()
            .await;

        match result {
            Ok(_) => {
                tracing::debug!(table = %table, "Created table");
                Ok(())
            }
            Err(err) => map_create_table_error(err),
        }
    }

    /// Polls until the table backing a collection is active.
    async fn wait_for_table_active(
        &self,
        database_id: &str,
        collection_id: &str,
    ) -> Result<CollectionRef> {
        for attempt in 1..=TABLE_ACTIVE_MAX_ATTEMPTS {
            if let Some((collection, status)) = self.describe(database_id, collection_id).await? {
                if is_table_ready(status.as_ref()) {
                    return Ok(collection);
                }
            }

            tracing::debug!(
                collection_id = %collection_id,
                attempt,
                "Waiting for table to become active"
            );
            tokio::time::sleep(TABLE_ACTIVE_POLL_DELAY).await;
        }

        Err(RepositoryError::QueryFailed(format!(
            "Timeout waiting for table {} to become active",
            table_name(database_id, collection_id)
        )))
    }
}

fn key_element(name: &str, key_type: KeyType) -> Result<KeySchemaElement> {
    KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(key_type)
        .build()
        .map_err(|e| RepositoryError::InvalidData(e.to_string()))
}

/// Index over the partition attribute, which also records the partition
/// path on the table itself.
fn partition_index(path: &str, throughput: ProvisionedThroughput) -> Result<GlobalSecondaryIndex> {
    GlobalSecondaryIndex::builder()
        .index_name(PARTITION_INDEX)
        .key_schema(key_element(path, KeyType::Hash)?)
        .projection(
            Projection::builder()
                .projection_type(ProjectionType::KeysOnly)
                .build(),
        )
        .provisioned_throughput(throughput)
        .build()
        .map_err(|e| RepositoryError::InvalidData(e.to_string()))
}

fn string_attribute(name: &str) -> Result<AttributeDefinition> {
    AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(ScalarAttributeType::S)
        .build()
        .map_err(|e| RepositoryError::InvalidData(e.to_string()))
}

#[async_trait]
impl DocumentStore for DynamoDbDocumentStore {
    async fn create_database_if_absent(&self, id: &str) -> Result<DatabaseRef> {
        // Tables carry the database id as a prefix; there is nothing to create.
        tracing::debug!(database_id = %id, "Using database namespace");
        Ok(DatabaseRef::new(id))
    }

    async fn create_collection_if_absent(
        &self,
        database: &DatabaseRef,
        spec: &CollectionSpec,
    ) -> Result<CollectionRef> {
        if let Some(collection) = self.collection(&database.id, &spec.id).await? {
            return Ok(collection);
        }

        self.create_table(&database.id, spec).await?;
        let collection = self.wait_for_table_active(&database.id, &spec.id).await?;

        tracing::debug!(
            database_id = %collection.database_id,
            collection_id = %collection.id,
            partition_path = ?collection.partition_path,
            throughput = collection.throughput,
            "Created collection"
        );
        self.collections.write().await.insert(
            table_name(&database.id, &spec.id),
            collection.clone(),
        );
        Ok(collection)
    }

    async fn read_document(
        &self,
        address: &DocumentAddress,
        partition_key: Option<&PartitionKey>,
    ) -> Result<Option<StoredDocument>> {
        let Some(collection) = self
            .collection(&address.database_id, &address.collection_id)
            .await?
        else {
            return Ok(None);
        };

        // Fails before any request when a partitioned read has no key.
        partition_matches(collection.is_partitioned(), None, partition_key)?;

        let result = self
            .client
            .get_item()
            .table_name(table_name(&address.database_id, &address.collection_id))
            .set_key(Some(document_key(&address.document_id)))
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err) => return map_get_item_error(err).map(|_| None),
        };
        let Some(item) = output.item() else {
            return Ok(None);
        };

        let stored_partition = collection
            .partition_path
            .as_deref()
            .and_then(|path| item_partition(item, path));
        if !partition_matches(collection.is_partitioned(), stored_partition, partition_key)? {
            return Ok(None);
        }

        item_to_document(item).map(Some)
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
        let partition_path = stored_collection.partition_path.as_deref();
        let partition = document_partition(&document, partition_path)?;

        let address = collection.document_address(&id);
        stamp_system_metadata(&mut document, &address, Utc::now());

        let key_partition = partition_path.zip(partition.as_deref());
        let item = document_to_item(&document, &id, key_partition)?;

        let table = table_name(&collection.database_id, &collection.id);
        self.client
            .put_item()
            .table_name(&table)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#id)")
            .expression_attribute_names("#id", ATTR_ID)
            .send()
            .await
            .map_err(|e| map_put_item_error(e, &id, &table))?;

        Ok(document)
    }
}
