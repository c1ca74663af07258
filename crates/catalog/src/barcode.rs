//! Barcode Allocator.
//!
//! A barcode is `{warehouse.prefix}-{category.code}-{item suffix}`. It is a
//! pure function of placement and identity, so it can be re-derived whenever
//! an item moves or is re-categorized.

use nexus_core::{CategoryId, ItemId, WarehouseId};

use crate::CatalogStore;

/// Segment used when the warehouse reference cannot be resolved.
pub const FALLBACK_WAREHOUSE_SEGMENT: &str = "WH";

/// Segment used when the category reference cannot be resolved.
pub const FALLBACK_CATEGORY_SEGMENT: &str = "GEN";

/// Derive the barcode for an item at the given placement.
///
/// Dangling catalog references never fail: the fallback segments keep the
/// barcode well-formed.
pub fn allocate(
    catalog: &CatalogStore,
    warehouse_id: &WarehouseId,
    category_id: &CategoryId,
    item_id: &ItemId,
) -> String {
    let prefix = match catalog.warehouse(warehouse_id) {
        Some(w) => w.prefix.as_str(),
        None => {
            tracing::debug!(%warehouse_id, "barcode: unknown warehouse, using fallback segment");
            FALLBACK_WAREHOUSE_SEGMENT
        }
    };
    let code = match catalog.category(category_id) {
        Some(c) => c.code.as_str(),
        None => {
            tracing::debug!(%category_id, "barcode: unknown category, using fallback segment");
            FALLBACK_CATEGORY_SEGMENT
        }
    };
    format!("{prefix}-{code}-{}", item_id.barcode_suffix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, Warehouse};

    fn catalog() -> (CatalogStore, WarehouseId, CategoryId) {
        let mut store = CatalogStore::new();
        let wh = Warehouse::new("Hub A", "WHA").unwrap();
        let wh_id = wh.id;
        store.add_warehouse(wh).unwrap();
        let cat = Category::root("Construction", "CON").unwrap();
        let cat_id = cat.id;
        store.add_category(cat).unwrap();
        (store, wh_id, cat_id)
    }

    #[test]
    fn barcode_concatenates_prefix_code_and_suffix() {
        let (store, wh, cat) = catalog();
        let code = allocate(&store, &wh, &cat, &ItemId::from_sequence(17));
        assert_eq!(code, "WHA-CON-000017");
    }

    #[test]
    fn dangling_references_fall_back() {
        let (store, wh, cat) = catalog();
        let item = ItemId::from_sequence(3);
        assert_eq!(
            allocate(&store, &WarehouseId::new(), &cat, &item),
            "WH-CON-000003"
        );
        assert_eq!(
            allocate(&store, &wh, &CategoryId::new(), &item),
            "WHA-GEN-000003"
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: allocation is deterministic for identical inputs.
            #[test]
            fn allocation_is_deterministic(seq in 0u64..10_000_000) {
                let (store, wh, cat) = catalog();
                let item = ItemId::from_sequence(seq);
                prop_assert_eq!(
                    allocate(&store, &wh, &cat, &item),
                    allocate(&store, &wh, &cat, &item)
                );
            }

            /// Property: distinct items never share a barcode at the same placement.
            #[test]
            fn distinct_items_get_distinct_barcodes(a in 0u64..1_000_000, b in 0u64..1_000_000) {
                prop_assume!(a != b);
                let (store, wh, cat) = catalog();
                prop_assert_ne!(
                    allocate(&store, &wh, &cat, &ItemId::from_sequence(a)),
                    allocate(&store, &wh, &cat, &ItemId::from_sequence(b))
                );
            }
        }
    }
}
