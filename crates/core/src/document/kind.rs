use std::fmt;

use serde::{Deserialize, Serialize};

/// A value used by the store to route a document to its partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionKey(String);

impl PartitionKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capability implemented by every concrete document variant.
///
/// The discriminator and the partition path are properties of the variant,
/// never of an instance, so they are exposed as associated items.
pub trait DocumentKind: Send + Sync + 'static {
    /// Type discriminator written to the `_type` field.
    const DOCUMENT_TYPE: &'static str;

    /// Partition path written to the `_partitionPath` field.
    fn partition_path() -> String {
        Self::DOCUMENT_TYPE.to_lowercase()
    }

    /// Partition key for documents of this variant.
    fn partition_key() -> PartitionKey {
        PartitionKey::new(Self::partition_path())
    }
}
