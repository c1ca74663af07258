//! Inventory domain: the Item aggregate, its registry, and landed-cost
//! valuation.
//!
//! Pure, deterministic domain logic (no IO, no clocks). Callers pass the
//! current time into every mutating call.

pub mod item;
pub mod registry;
pub mod valuation;

pub use item::{
    AdjustStock, CreateItem, DeleteItem, InventoryEvent, Item, ItemCommand, ItemCreated,
    ItemDeleted, ItemPatch, ItemStatus, ItemUpdated, StockAdjusted, UnitCostBasis, UpdateItem,
};
pub use registry::{BulkRow, ItemRegistry, MergeKey, NewItem};
pub use valuation::{LandedCost, checked_lot_cost, checked_stock_value, true_unit_cost};
