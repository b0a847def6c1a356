use serde::Deserialize;
use serde_json::{Map, Value};

use dyndoc_core::document::InventoryItem;

/// Request payload for creating an inventory item.
///
/// Fields other than the typed ones are kept as ad-hoc properties.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventoryItem {
    #[serde(default)]
    pub id: Option<String>,
    pub product_name: String,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl CreateInventoryItem {
    /// Converts the request into an unsaved document.
    pub fn into_document(self) -> InventoryItem {
        let mut item = InventoryItem::new();
        item.id = self.id;
        item.set_product_name(self.product_name);
        item.set_stock_quantity(self.stock_quantity);
        item.update(self.properties);
        item
    }
}

/// Query parameters for `POST /api/inventory`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateInventoryQuery {
    /// Write through the JSON text round trip instead of the typed encoder.
    #[serde(default)]
    pub untyped: bool,
}
