//! Dynamic document model.
//!
//! A [`Document`] carries fixed envelope metadata plus an ordered bag of
//! ad-hoc properties. Variants are zero-sized marker types implementing
//! [`DocumentKind`]; typed accessors live on `Document<Variant>`.

mod inventory;
mod kind;
mod types;
mod wire;

pub use inventory::{Inventory, InventoryItem, PRODUCT_NAME, STOCK_QUANTITY};
pub use kind::{DocumentKind, PartitionKey};
pub use types::{describe_value, Document, PropertyBag, StoreMetadata};
pub use wire::{
    is_reserved_field, Materialized, StoredDocument, FIELD_ATTACHMENTS, FIELD_CREATED, FIELD_ETAG,
    FIELD_ID, FIELD_PARTITION_PATH, FIELD_RID, FIELD_SELF, FIELD_TIMESTAMP, FIELD_TYPE,
    RESERVED_FIELDS,
};
