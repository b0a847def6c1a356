//! Pure helpers shared by every store backend.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::document::{
    describe_value, PartitionKey, StoredDocument, FIELD_ATTACHMENTS, FIELD_ETAG, FIELD_RID,
    FIELD_SELF, FIELD_TIMESTAMP,
};

use super::{DocumentAddress, RepositoryError, Result};

/// Longest identifier the stores accept.
pub const MAX_ID_LENGTH: usize = 255;

const FORBIDDEN_ID_CHARS: [char; 4] = ['/', '\\', '?', '#'];

pub fn database_link(database_id: &str) -> String {
    format!("dbs/{database_id}")
}

pub fn collection_link(database_id: &str, collection_id: &str) -> String {
    format!("dbs/{database_id}/colls/{collection_id}")
}

pub fn document_link(database_id: &str, collection_id: &str, document_id: &str) -> String {
    format!("dbs/{database_id}/colls/{collection_id}/docs/{document_id}")
}

/// Generate a fresh document identifier.
pub fn generate_document_id() -> String {
    Uuid::new_v4().to_string()
}

/// Check that an identifier can be used inside a document address.
pub fn validate_document_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(RepositoryError::InvalidData(
            "document id must not be empty".to_string(),
        ));
    }
    if id.len() > MAX_ID_LENGTH {
        return Err(RepositoryError::InvalidData(format!(
            "document id is longer than {MAX_ID_LENGTH} bytes"
        )));
    }
    if let Some(c) = id.chars().find(|c| FORBIDDEN_ID_CHARS.contains(c)) {
        return Err(RepositoryError::InvalidData(format!(
            "document id contains forbidden character '{c}'"
        )));
    }
    Ok(())
}

/// Partition value of `document` in a collection partitioned on
/// `partition_path`.
///
/// Returns `Ok(None)` for unpartitioned collections. A partitioned collection
/// requires a scalar value at the path.
pub fn document_partition(
    document: &StoredDocument,
    partition_path: Option<&str>,
) -> Result<Option<String>> {
    let Some(path) = partition_path else {
        return Ok(None);
    };

    match document.pointer(path) {
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(value @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(value.to_string())),
        Some(other) => Err(RepositoryError::InvalidData(format!(
            "partition value at '{path}' must be a scalar, found {}",
            describe_value(other)
        ))),
        None => Err(RepositoryError::InvalidData(format!(
            "document has no partition value at '{path}'"
        ))),
    }
}

/// Decide whether a stored document is visible to a read.
///
/// Reads against a partitioned collection must name a partition and only see
/// documents stored under it. Unpartitioned collections ignore the key.
pub fn partition_matches(
    partitioned: bool,
    stored: Option<&str>,
    requested: Option<&PartitionKey>,
) -> Result<bool> {
    if !partitioned {
        return Ok(true);
    }
    match requested {
        Some(key) => Ok(stored == Some(key.as_str())),
        None => Err(RepositoryError::InvalidData(
            "a partition key is required to read from a partitioned collection".to_string(),
        )),
    }
}

/// Populate the store-owned fields of a freshly written document.
pub fn stamp_system_metadata(
    document: &mut StoredDocument,
    address: &DocumentAddress,
    now: DateTime<Utc>,
) {
    document.insert(FIELD_RID, Uuid::new_v4().simple().to_string());
    document.insert(FIELD_ETAG, format!("\"{}\"", Uuid::new_v4()));
    document.insert(FIELD_SELF, address.self_link());
    document.insert(FIELD_TIMESTAMP, now.timestamp());
    document.insert(FIELD_ATTACHMENTS, "attachments/");
}
