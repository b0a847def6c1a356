//! Inventory item variant.

use serde_json::Value;

use super::kind::DocumentKind;
use super::types::Document;

/// Bag key backing [`InventoryItem::product_name`].
pub const PRODUCT_NAME: &str = "productName";
/// Bag key backing [`InventoryItem::stock_quantity`].
pub const STOCK_QUANTITY: &str = "stockQuantity";

/// Marker for inventory documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inventory;

impl DocumentKind for Inventory {
    const DOCUMENT_TYPE: &'static str = "InventoryItem";
}

/// A stocked product with arbitrary extra properties.
pub type InventoryItem = Document<Inventory>;

impl Document<Inventory> {
    /// `None` when unset or when the stored value is not a string.
    pub fn product_name(&self) -> Option<&str> {
        self.peek(PRODUCT_NAME).and_then(Value::as_str)
    }

    pub fn set_product_name(&mut self, name: impl Into<String>) {
        self.set(PRODUCT_NAME, Value::String(name.into()));
    }

    /// `None` when unset or when the stored value is not an integer.
    pub fn stock_quantity(&self) -> Option<i64> {
        self.peek(STOCK_QUANTITY).and_then(Value::as_i64)
    }

    pub fn set_stock_quantity(&mut self, quantity: i64) {
        self.set(STOCK_QUANTITY, quantity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inventory_discriminator_and_partition() {
        let item = InventoryItem::new();

        assert_eq!(item.document_type(), "InventoryItem");
        assert_eq!(item.partition_path(), "inventoryitem");
        assert_eq!(item.partition_key().as_str(), "inventoryitem");
    }

    #[test]
    fn test_typed_accessors_read_and_write_bag_keys() {
        let mut item = InventoryItem::new();
        item.set_product_name("Sprocket xl-25b");
        item.set_stock_quantity(25_000);

        assert_eq!(item.product_name(), Some("Sprocket xl-25b"));
        assert_eq!(item.stock_quantity(), Some(25_000));
        assert_eq!(item.peek("productName"), Some(&json!("Sprocket xl-25b")));
        assert_eq!(item.peek("stockQuantity"), Some(&json!(25_000)));
    }

    #[test]
    fn test_typed_accessors_see_dynamic_writes() {
        let mut item = InventoryItem::new();
        item.set("productName", "Cog");

        assert_eq!(item.product_name(), Some("Cog"));
    }

    #[test]
    fn test_typed_accessors_tolerate_wrong_shapes() {
        let mut item = InventoryItem::new();
        item.set("productName", 7);
        item.set("stockQuantity", "lots");

        assert_eq!(item.product_name(), None);
        assert_eq!(item.stock_quantity(), None);
    }

    #[test]
    fn test_typed_accessors_on_empty_item() {
        let item = InventoryItem::new();

        assert_eq!(item.product_name(), None);
        assert_eq!(item.stock_quantity(), None);
        assert!(!item.contains_property("productName"));
    }
}
