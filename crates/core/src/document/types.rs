use std::fmt;
use std::marker::PhantomData;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::kind::{DocumentKind, PartitionKey};

/// Ordered mapping of ad-hoc property names to values.
pub type PropertyBag = Map<String, Value>;

/// Metadata the store assigns on write. Callers never set these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMetadata {
    /// Revision tag (`_etag`).
    pub etag: Option<String>,
    /// Store resource id (`_rid`).
    pub rid: Option<String>,
    /// Address of the stored document (`_self`).
    pub self_link: Option<String>,
    /// Server timestamp in seconds (`_ts`).
    pub timestamp: Option<i64>,
    /// Attachments reference (`_attachments`).
    pub attachments: Option<String>,
}

/// A document of variant `K`: fixed metadata plus an open property bag.
///
/// Typed accessors for a variant are layered on top of the bag in an
/// `impl Document<Variant>` block, reading and writing well-known keys.
pub struct Document<K: DocumentKind> {
    /// Identifier, unique within a collection. `None` until persisted or
    /// assigned by the caller.
    pub id: Option<String>,
    /// Creation time as UTC seconds since the epoch.
    pub created_at: i64,
    /// Store-assigned metadata, populated on documents returned by the store.
    pub metadata: StoreMetadata,
    properties: PropertyBag,
    kind: PhantomData<fn() -> K>,
}

impl<K: DocumentKind> Document<K> {
    /// Creates an empty document stamped with the current time.
    pub fn new() -> Self {
        Self::from_parts(
            None,
            Utc::now().timestamp(),
            StoreMetadata::default(),
            PropertyBag::new(),
        )
    }

    pub(crate) fn from_parts(
        id: Option<String>,
        created_at: i64,
        metadata: StoreMetadata,
        properties: PropertyBag,
    ) -> Self {
        Self {
            id,
            created_at,
            metadata,
            properties,
            kind: PhantomData,
        }
    }

    /// Sets the identifier, builder style.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn document_type(&self) -> &'static str {
        K::DOCUMENT_TYPE
    }

    pub fn partition_path(&self) -> String {
        K::partition_path()
    }

    /// Partition key of this document. Depends only on the variant.
    pub fn partition_key(&self) -> PartitionKey {
        K::partition_key()
    }

    /// Returns the value stored under `key`.
    ///
    /// A key that was never set reads as `Null`, and that `Null` is kept in
    /// the bag from then on. Use [`Document::peek`] to look without inserting.
    pub fn get(&mut self, key: &str) -> &Value {
        self.properties
            .entry(key.to_string())
            .or_insert(Value::Null)
    }

    /// Returns the value stored under `key` without touching the bag.
    pub fn peek(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Inserts or overwrites `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Applies [`Document::set`] for every entry, in iteration order.
    pub fn update<I, S>(&mut self, properties: I)
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        for (key, value) in properties {
            self.set(key, value);
        }
    }

    /// Names of every property currently in the bag.
    pub fn property_names(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }

    pub fn contains_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }
}

impl<K: DocumentKind> Default for Document<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: DocumentKind> Clone for Document<K> {
    fn clone(&self) -> Self {
        Self::from_parts(
            self.id.clone(),
            self.created_at,
            self.metadata.clone(),
            self.properties.clone(),
        )
    }
}

impl<K: DocumentKind> PartialEq for Document<K> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.created_at == other.created_at
            && self.metadata == other.metadata
            && self.properties == other.properties
    }
}

impl<K: DocumentKind> fmt::Debug for Document<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("document_type", &K::DOCUMENT_TYPE)
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("metadata", &self.metadata)
            .field("properties", &self.properties)
            .finish()
    }
}

/// Short name for the shape of a property value, used in diagnostics.
pub fn describe_value(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Note;

    impl DocumentKind for Note {
        const DOCUMENT_TYPE: &'static str = "Note";
    }

    #[test]
    fn test_new_document_has_no_id_and_empty_bag() {
        let doc = Document::<Note>::new();

        assert!(doc.id.is_none());
        assert!(doc.property_names().is_empty());
        assert_eq!(doc.metadata, StoreMetadata::default());
        assert!(doc.created_at > 0);
    }

    #[test]
    fn test_set_then_get_returns_value() {
        let mut doc = Document::<Note>::new();
        let values = [
            json!("text"),
            json!(42),
            json!(1.5),
            json!(true),
            json!(null),
            json!([1, "two", {"three": 3}]),
            json!({"nested": {"deeper": ["x"]}}),
        ];

        for (i, value) in values.iter().enumerate() {
            let key = format!("key{i}");
            doc.set(key.clone(), value.clone());
            assert_eq!(doc.get(&key), value);
        }
    }

    #[test]
    fn test_set_overwrites_existing_value() {
        let mut doc = Document::<Note>::new();
        doc.set("colour", "Red");
        doc.set("colour", "Blue");

        assert_eq!(doc.peek("colour"), Some(&json!("Blue")));
        assert_eq!(doc.property_names(), vec!["colour"]);
    }

    #[test]
    fn test_get_missing_key_creates_null_entry() {
        let mut doc = Document::<Note>::new();

        assert_eq!(doc.get("missing"), &Value::Null);
        assert!(doc.contains_property("missing"));
        assert_eq!(doc.property_names(), vec!["missing"]);
    }

    #[test]
    fn test_peek_missing_key_leaves_bag_untouched() {
        let doc = Document::<Note>::new();

        assert_eq!(doc.peek("missing"), None);
        assert!(!doc.contains_property("missing"));
    }

    #[test]
    fn test_update_applies_entries_in_order() {
        let mut doc = Document::<Note>::new();
        doc.update([
            ("colour", json!("Red")),
            ("packSize", json!(10)),
            ("colour", json!("Green")),
        ]);

        let names = doc.property_names();
        assert!(names.contains(&"colour"));
        assert!(names.contains(&"packSize"));
        assert_eq!(doc.peek("colour"), Some(&json!("Green")));
    }

    #[test]
    fn test_update_accepts_json_object() {
        let mut doc = Document::<Note>::new();
        let Value::Object(map) = json!({"colour": "Red", "packSize": 10}) else {
            unreachable!()
        };
        doc.update(map);

        assert_eq!(doc.peek("packSize"), Some(&json!(10)));
    }

    #[test]
    fn test_property_names_keep_insertion_order() {
        let mut doc = Document::<Note>::new();
        doc.set("zeta", 1);
        doc.set("alpha", 2);
        doc.set("mid", 3);

        assert_eq!(doc.property_names(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_partition_key_ignores_instance_state() {
        let mut first = Document::<Note>::new().with_id("a");
        first.set("_partitionPath", "elsewhere");
        let second = Document::<Note>::new();

        assert_eq!(first.partition_key(), second.partition_key());
        assert_eq!(first.partition_path(), "note");
        assert_eq!(first.document_type(), "Note");
    }

    #[test]
    fn test_describe_value() {
        assert_eq!(describe_value(&json!(null)), "null");
        assert_eq!(describe_value(&json!(false)), "boolean");
        assert_eq!(describe_value(&json!(3)), "number");
        assert_eq!(describe_value(&json!("s")), "string");
        assert_eq!(describe_value(&json!([])), "sequence");
        assert_eq!(describe_value(&json!({})), "mapping");
    }
}
