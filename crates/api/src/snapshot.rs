use chrono::{DateTime, Utc};
use serde::Serialize;

use nexus_catalog::{Category, Warehouse};
use nexus_inventory::Item;
use nexus_workflow::StockTransaction;

/// A consistent, serializable copy of the whole ledger at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub taken_at: DateTime<Utc>,
    pub warehouses: Vec<Warehouse>,
    pub categories: Vec<Category>,
    pub items: Vec<Item>,
    pub transactions: Vec<StockTransaction>,
}

impl Snapshot {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
