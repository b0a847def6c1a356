mod inventory;

pub use inventory::{CreateInventoryItem, CreateInventoryQuery};
