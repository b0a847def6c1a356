//! Wire shape of a stored document.
//!
//! A stored document is a flat JSON object: the reserved metadata fields sit
//! next to every ad-hoc property at the top level. [`StoredDocument`] is that
//! object without any type information; [`Document`] is the typed view.

use std::fmt;

use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::storage::{RepositoryError, Result};

use super::kind::DocumentKind;
use super::types::{Document, PropertyBag, StoreMetadata};

pub const FIELD_ID: &str = "id";
pub const FIELD_TYPE: &str = "_type";
pub const FIELD_PARTITION_PATH: &str = "_partitionPath";
pub const FIELD_CREATED: &str = "_created";
pub const FIELD_ETAG: &str = "_etag";
pub const FIELD_RID: &str = "_rid";
pub const FIELD_SELF: &str = "_self";
pub const FIELD_TIMESTAMP: &str = "_ts";
pub const FIELD_ATTACHMENTS: &str = "_attachments";

/// Field names owned by the document envelope. Never ad-hoc properties.
pub const RESERVED_FIELDS: [&str; 9] = [
    FIELD_ID,
    FIELD_TYPE,
    FIELD_PARTITION_PATH,
    FIELD_CREATED,
    FIELD_ETAG,
    FIELD_RID,
    FIELD_SELF,
    FIELD_TIMESTAMP,
    FIELD_ATTACHMENTS,
];

pub fn is_reserved_field(key: &str) -> bool {
    RESERVED_FIELDS.contains(&key)
}

/// A document as the store sees it: a schema-free JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredDocument(PropertyBag);

impl StoredDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON value. Anything other than an object is rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(RepositoryError::Serialization(format!(
                "expected a JSON object for a document, found {}",
                super::describe_value(&other)
            ))),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(&self.0).map_err(|e| RepositoryError::Serialization(e.to_string()))
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get(FIELD_ID).and_then(Value::as_str)
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.0.insert(FIELD_ID.to_string(), Value::String(id.into()));
    }

    /// The `_type` discriminator, if present.
    pub fn document_type(&self) -> Option<&str> {
        self.0.get(FIELD_TYPE).and_then(Value::as_str)
    }

    pub fn created_at(&self) -> Option<i64> {
        self.0.get(FIELD_CREATED).and_then(Value::as_i64)
    }

    pub fn metadata(&self) -> StoreMetadata {
        let string = |key: &str| self.0.get(key).and_then(Value::as_str).map(str::to_string);

        StoreMetadata {
            etag: string(FIELD_ETAG),
            rid: string(FIELD_RID),
            self_link: string(FIELD_SELF),
            timestamp: self.0.get(FIELD_TIMESTAMP).and_then(Value::as_i64),
            attachments: string(FIELD_ATTACHMENTS),
        }
    }

    /// Raw access to any top-level field, reserved or not.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Resolves a `/`-separated path such as `/_partitionPath` or
    /// `/supplier/name` against the document.
    pub fn pointer(&self, path: &str) -> Option<&Value> {
        let mut segments = path.strip_prefix('/').unwrap_or(path).split('/');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Ad-hoc property under `key`. Reserved fields are not properties.
    pub fn property(&self, key: &str) -> Option<&Value> {
        if is_reserved_field(key) {
            return None;
        }
        self.0.get(key)
    }

    /// Iterates over ad-hoc properties, skipping reserved fields.
    pub fn properties(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter().filter(|(key, _)| !is_reserved_field(key))
    }

    pub fn property_names(&self) -> Vec<&str> {
        self.properties().map(|(key, _)| key.as_str()).collect()
    }

    pub fn as_map(&self) -> &PropertyBag {
        &self.0
    }

    pub fn into_map(self) -> PropertyBag {
        self.0
    }

    /// Rebuilds the typed view for variant `K`.
    ///
    /// The typed view is only recovered when `_type` names `K`. Anything
    /// else comes back untouched as [`Materialized::Untyped`]; its data is
    /// intact, only the static type is gone.
    pub fn materialize<K: DocumentKind>(self) -> Materialized<K> {
        if self.document_type() != Some(K::DOCUMENT_TYPE) {
            return Materialized::Untyped(self);
        }

        let id = self.id().map(str::to_string);
        let created_at = self.created_at().unwrap_or_default();
        let metadata = self.metadata();
        let properties = self
            .0
            .into_iter()
            .filter(|(key, _)| !is_reserved_field(key))
            .collect();

        Materialized::Typed(Document::from_parts(id, created_at, metadata, properties))
    }
}

impl From<StoredDocument> for Value {
    fn from(document: StoredDocument) -> Self {
        Value::Object(document.0)
    }
}

impl<K: DocumentKind> Document<K> {
    /// Encodes the document into its wire shape.
    ///
    /// Fails with `InvalidData` when an ad-hoc property uses a reserved field
    /// name, since writing it would clobber envelope metadata.
    pub fn to_stored(&self) -> Result<StoredDocument> {
        if let Some(key) = self.property_names().into_iter().find(|k| is_reserved_field(k)) {
            return Err(RepositoryError::InvalidData(format!(
                "property '{key}' collides with a reserved document field"
            )));
        }

        let mut map = PropertyBag::new();
        if let Some(id) = &self.id {
            map.insert(FIELD_ID.to_string(), Value::String(id.clone()));
        }
        map.insert(FIELD_TYPE.to_string(), Value::from(K::DOCUMENT_TYPE));
        map.insert(
            FIELD_PARTITION_PATH.to_string(),
            Value::from(K::partition_path()),
        );
        map.insert(FIELD_CREATED.to_string(), Value::from(self.created_at));

        let metadata = &self.metadata;
        let optional = [
            (FIELD_ETAG, metadata.etag.clone().map(Value::from)),
            (FIELD_RID, metadata.rid.clone().map(Value::from)),
            (FIELD_SELF, metadata.self_link.clone().map(Value::from)),
            (FIELD_TIMESTAMP, metadata.timestamp.map(Value::from)),
            (FIELD_ATTACHMENTS, metadata.attachments.clone().map(Value::from)),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                map.insert(key.to_string(), value);
            }
        }

        for (key, value) in self.properties() {
            map.insert(key.clone(), value.clone());
        }

        Ok(StoredDocument(map))
    }
}

impl<K: DocumentKind> Serialize for Document<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_stored()
            .map_err(<S::Error as ser::Error>::custom)?
            .serialize(serializer)
    }
}

impl<'de, K: DocumentKind> Deserialize<'de> for Document<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let stored = StoredDocument::deserialize(deserializer)?;
        match stored.materialize::<K>() {
            Materialized::Typed(document) => Ok(document),
            Materialized::Untyped(stored) => Err(de::Error::custom(format!(
                "expected document type {}, found {:?}",
                K::DOCUMENT_TYPE,
                stored.document_type()
            ))),
        }
    }
}

/// What the store handed back: the typed view when it survived the round
/// trip, the generic property bag otherwise.
pub enum Materialized<K: DocumentKind> {
    Typed(Document<K>),
    Untyped(StoredDocument),
}

impl<K: DocumentKind> Materialized<K> {
    pub fn is_typed(&self) -> bool {
        matches!(self, Self::Typed(_))
    }

    pub fn as_typed(&self) -> Option<&Document<K>> {
        match self {
            Self::Typed(document) => Some(document),
            Self::Untyped(_) => None,
        }
    }

    pub fn into_typed(self) -> Option<Document<K>> {
        match self {
            Self::Typed(document) => Some(document),
            Self::Untyped(_) => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Typed(document) => document.id.as_deref(),
            Self::Untyped(stored) => stored.id(),
        }
    }

    /// Ad-hoc property lookup that works on either side of the boundary.
    pub fn property(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Typed(document) => document.peek(key),
            Self::Untyped(stored) => stored.property(key),
        }
    }

    pub fn property_names(&self) -> Vec<&str> {
        match self {
            Self::Typed(document) => document.property_names(),
            Self::Untyped(stored) => stored.property_names(),
        }
    }

    pub fn metadata(&self) -> StoreMetadata {
        match self {
            Self::Typed(document) => document.metadata.clone(),
            Self::Untyped(stored) => stored.metadata(),
        }
    }

    pub fn into_stored(self) -> Result<StoredDocument> {
        match self {
            Self::Typed(document) => document.to_stored(),
            Self::Untyped(stored) => Ok(stored),
        }
    }
}

impl<K: DocumentKind> Clone for Materialized<K> {
    fn clone(&self) -> Self {
        match self {
            Self::Typed(document) => Self::Typed(document.clone()),
            Self::Untyped(stored) => Self::Untyped(stored.clone()),
        }
    }
}

impl<K: DocumentKind> fmt::Debug for Materialized<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Typed(document) => f.debug_tuple("Typed").field(document).finish(),
            Self::Untyped(stored) => f.debug_tuple("Untyped").field(stored).finish(),
        }
    }
}

impl<K: DocumentKind> Serialize for Materialized<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Typed(document) => document.serialize(serializer),
            Self::Untyped(stored) => stored.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Crate;

    impl DocumentKind for Crate {
        const DOCUMENT_TYPE: &'static str = "Crate";
    }

    struct Pallet;

    impl DocumentKind for Pallet {
        const DOCUMENT_TYPE: &'static str = "Pallet";
    }

    fn sample() -> Document<Crate> {
        let mut doc = Document::<Crate>::new().with_id("crate-1");
        doc.created_at = 1_700_000_000;
        doc.set("weight", 12);
        doc.set("contents", json!({"kind": "bolts", "sizes": [4, 6]}));
        doc
    }

    #[test]
    fn test_to_stored_places_properties_next_to_reserved_fields() {
        let stored = sample().to_stored().unwrap();
        let value = Value::from(stored);

        assert_eq!(
            value,
            json!({
                "id": "crate-1",
                "_type": "Crate",
                "_partitionPath": "crate",
                "_created": 1_700_000_000,
                "weight": 12,
                "contents": {"kind": "bolts", "sizes": [4, 6]}
            })
        );
    }

    #[test]
    fn test_to_stored_omits_missing_id_and_metadata() {
        let stored = Document::<Crate>::new().to_stored().unwrap();

        assert!(stored.id().is_none());
        assert!(stored.get(FIELD_ETAG).is_none());
        assert!(stored.get(FIELD_TIMESTAMP).is_none());
    }

    #[test]
    fn test_to_stored_rejects_reserved_property_names() {
        let mut doc = sample();
        doc.set("_etag", "forged");

        let result = doc.to_stored();

        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
    }

    #[test]
    fn test_materialize_recovers_typed_view() {
        let mut stored = sample().to_stored().unwrap();
        stored.insert(FIELD_ETAG, "\"abc\"");
        stored.insert(FIELD_TIMESTAMP, 1_700_000_100);

        let materialized = stored.materialize::<Crate>();
        let doc = materialized.as_typed().expect("typed view");

        assert_eq!(doc.id.as_deref(), Some("crate-1"));
        assert_eq!(doc.created_at, 1_700_000_000);
        assert_eq!(doc.metadata.etag.as_deref(), Some("\"abc\""));
        assert_eq!(doc.metadata.timestamp, Some(1_700_000_100));
        assert_eq!(doc.property_names(), vec!["weight", "contents"]);
    }

    #[test]
    fn test_materialize_other_type_stays_untyped() {
        let stored = sample().to_stored().unwrap();

        let materialized = stored.materialize::<Pallet>();

        assert!(!materialized.is_typed());
        assert_eq!(materialized.id(), Some("crate-1"));
        assert_eq!(
            materialized.property("contents").and_then(|c| c.get("kind")),
            Some(&json!("bolts"))
        );
    }

    #[test]
    fn test_materialize_missing_type_stays_untyped() {
        let stored = StoredDocument::from_value(json!({"id": "x", "a": 1})).unwrap();

        assert!(!stored.materialize::<Crate>().is_typed());
    }

    #[test]
    fn test_json_round_trip_preserves_nested_values() {
        let original = sample();

        let json = serde_json::to_string(&original).unwrap();
        let decoded: Document<Crate> = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn test_deserialize_rejects_other_type() {
        let json = serde_json::to_string(&sample()).unwrap();

        let result: std::result::Result<Document<Pallet>, _> = serde_json::from_str(&json);

        assert!(result.is_err());
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        let result = StoredDocument::from_value(json!([1, 2]));

        assert!(matches!(result, Err(RepositoryError::Serialization(_))));
    }

    #[test]
    fn test_properties_skip_reserved_fields() {
        let stored = sample().to_stored().unwrap();

        assert_eq!(stored.property_names(), vec!["weight", "contents"]);
        assert_eq!(stored.property(FIELD_TYPE), None);
        assert_eq!(stored.get(FIELD_TYPE), Some(&json!("Crate")));
    }

    #[test]
    fn test_pointer_walks_nested_objects_and_arrays() {
        let stored = sample().to_stored().unwrap();

        assert_eq!(stored.pointer("/_partitionPath"), Some(&json!("crate")));
        assert_eq!(stored.pointer("/contents/kind"), Some(&json!("bolts")));
        assert_eq!(stored.pointer("/contents/sizes/1"), Some(&json!(6)));
        assert_eq!(stored.pointer("/contents/missing"), None);
        assert_eq!(stored.pointer("/weight/deeper"), None);
    }

    #[test]
    fn test_untyped_materialized_serializes_as_raw_object() {
        let stored = StoredDocument::from_value(json!({"id": "x", "_type": "Other", "a": 1}))
            .unwrap();
        let materialized = stored.clone().materialize::<Crate>();

        assert_eq!(
            serde_json::to_value(&materialized).unwrap(),
            Value::from(stored)
        );
    }
}
