use serde_json::json;

use dyndoc_core::document::InventoryItem;

/// The sample inventory item written by the JSON round-trip demo.
///
/// Besides the typed product fields it carries a nested `supplier` object,
/// which is the value whose shape the demo follows through the store.
pub fn sprocket_item() -> InventoryItem {
    let mut item = InventoryItem::new();
    item.set_product_name("Sprocket xl-25b");
    item.set_stock_quantity(25_000);
    item.update([
        ("packSize", json!(10)),
        ("colour", json!("Red")),
        (
            "supplier",
            json!({
                "name": "Spaceys Sprockets",
                "lineManager": "Jetson, G",
            }),
        ),
    ]);
    item
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprocket_item_properties() {
        let item = sprocket_item();

        assert_eq!(item.product_name(), Some("Sprocket xl-25b"));
        assert_eq!(item.stock_quantity(), Some(25_000));
        assert_eq!(
            item.property_names(),
            vec!["productName", "stockQuantity", "packSize", "colour", "supplier"]
        );
        assert!(item.id.is_none());
    }
}
