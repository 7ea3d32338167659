//! Inventory domain module.
//!
//! Fabric lots received from vendors, the item-master catalog, and the stock
//! summaries derived from them. Pure logic (no IO, no HTTP, no storage).

pub mod item;
pub mod item_master;
pub mod stock;

pub use item::{InventoryItem, NewInventoryItem};
pub use item_master::{ItemMaster, NewItemMaster};
pub use stock::{InventorySummary, Lot, VendorStock, group_lots, summarize, summarize_by_vendor};
