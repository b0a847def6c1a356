//! Conversions between documents and DynamoDB items.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::{AttributeValue, KeyType, TableDescription, TableStatus};
use dyndoc_core::document::StoredDocument;
use dyndoc_core::storage::{
    CollectionRef, CollectionSpec, RepositoryError, Result, DEFAULT_THROUGHPUT,
};

/// Hash key holding the document id.
pub const ATTR_ID: &str = "id";
/// Attribute holding the serialized document body.
pub const ATTR_BODY: &str = "body";
/// Global secondary index over the partition attribute of a partitioned
/// collection.
pub const PARTITION_INDEX: &str = "partition";

/// Table backing `collection_id` in `database_id`.
pub fn table_name(database_id: &str, collection_id: &str) -> String {
    format!("{database_id}.{collection_id}")
}

/// Whether a table in this state accepts reads and writes.
///
/// A description without a status is treated as ready.
pub fn is_table_ready(status: Option<&TableStatus>) -> bool {
    matches!(status, None | Some(TableStatus::Active))
}

/// Primary key of a document.
pub fn document_key(id: &str) -> HashMap<String, AttributeValue> {
    HashMap::from([(ATTR_ID.to_string(), AttributeValue::S(id.to_string()))])
}

/// Build the item written for `document`.
///
/// `partition` is `(attribute, value)` for partitioned collections; the value
/// is stored as a plain attribute so the partition index can see it.
pub fn document_to_item(
    document: &StoredDocument,
    id: &str,
    partition: Option<(&str, &str)>,
) -> Result<HashMap<String, AttributeValue>> {
    let mut item = document_key(id);
    if let Some((attribute, value)) = partition {
        item.insert(attribute.to_string(), AttributeValue::S(value.to_string()));
    }
    item.insert(
        ATTR_BODY.to_string(),
        AttributeValue::S(document.to_json_string()?),
    );
    Ok(item)
}

/// Partition value recorded on `item` under `attribute`.
pub fn item_partition<'a>(
    item: &'a HashMap<String, AttributeValue>,
    attribute: &str,
) -> Option<&'a str> {
    item.get(attribute)
        .and_then(|value| value.as_s().ok())
        .map(String::as_str)
}

/// Recover the document stored in `item`.
pub fn item_to_document(item: &HashMap<String, AttributeValue>) -> Result<StoredDocument> {
    let body = item
        .get(ATTR_BODY)
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing attribute: {}", ATTR_BODY)))?
        .as_s()
        .map_err(|_| RepositoryError::InvalidData(format!("Invalid string for {}", ATTR_BODY)))?;

    StoredDocument::from_json_str(body)
}

/// Describe a collection from the table backing it.
///
/// The partition path is the hash key of the partition index, when the table
/// has one.
pub fn collection_from_description(
    database_id: &str,
    collection_id: &str,
    table: &TableDescription,
) -> CollectionRef {
    let partition_path = table
        .global_secondary_indexes()
        .iter()
        .find(|index| index.index_name() == Some(PARTITION_INDEX))
        .and_then(|index| {
            index
                .key_schema()
                .iter()
                .find(|element| *element.key_type() == KeyType::Hash)
        })
        .map(|element| element.attribute_name().to_string());

    let throughput = table
        .provisioned_throughput()
        .and_then(|t| t.read_capacity_units())
        .and_then(|units| u32::try_from(units).ok())
        .filter(|units| *units > 0)
        .unwrap_or(DEFAULT_THROUGHPUT);

    let mut spec = CollectionSpec::new(collection_id).with_throughput(throughput);
    if let Some(path) = partition_path {
        spec = spec.partitioned(path);
    }
    CollectionRef::new(database_id, &spec)
}
