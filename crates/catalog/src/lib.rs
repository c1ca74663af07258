//! `nexus-catalog`: warehouses, categories and barcode allocation.
//!
//! Pure reference data: everything else in the ledger reads from here, and
//! nothing here depends on items or transactions.

pub mod barcode;
pub mod category;
pub mod seed;
pub mod store;
pub mod warehouse;

pub use barcode::{FALLBACK_CATEGORY_SEGMENT, FALLBACK_WAREHOUSE_SEGMENT, allocate};
pub use category::Category;
pub use seed::{CatalogSeed, CategorySeed, WarehouseSeed};
pub use store::CatalogStore;
pub use warehouse::Warehouse;
