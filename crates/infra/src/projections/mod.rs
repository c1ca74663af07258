//! Read-model projections for reporting.
//!
//! Projections are pure functions over a consistent view of the ledger
//! (catalog, items, transactions). They never mutate it and can be rebuilt
//! at any time.

pub mod inventory_valuation;
pub mod stock_risk;

pub use inventory_valuation::{
    AgingSummary, DashboardSummary, StatusCount, WarehouseValuation, aging_summary,
    dashboard_summary, total_value, warehouse_valuation,
};
pub use stock_risk::{DaysRemaining, RiskEntry, RiskLevel, classify, days_remaining, risk_manifest};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use nexus_catalog::{CatalogStore, Category, Warehouse};
    use nexus_core::{CategoryId, ItemId, TransactionId, WarehouseId};
    use nexus_inventory::{ItemRegistry, ItemStatus, LandedCost, NewItem};
    use nexus_workflow::{ApprovalWorkflow, TransactionLedger};

    pub struct World {
        pub catalog: CatalogStore,
        pub registry: ItemRegistry,
        pub ledger: TransactionLedger,
        pub sink: Vec<(String, String)>,
        pub hub_a: WarehouseId,
        pub hub_b: WarehouseId,
        pub category: CategoryId,
    }

    impl World {
        pub fn new() -> Self {
            let mut catalog = CatalogStore::new();
            let hub_a = catalog.add_warehouse(Warehouse::new("Hub A", "WHA").unwrap()).unwrap().id;
            let hub_b = catalog.add_warehouse(Warehouse::new("Hub B", "WHB").unwrap()).unwrap().id;
            let category = catalog.add_category(Category::root("Hardware", "HW").unwrap()).unwrap().id;
            Self {
                catalog,
                registry: ItemRegistry::new(),
                ledger: TransactionLedger::new(),
                sink: Vec::new(),
                hub_a,
                hub_b,
                category,
            }
        }

        pub fn add(
            &mut self,
            name: &str,
            warehouse_id: WarehouseId,
            status: ItemStatus,
            quantity: i64,
            base_cost: Decimal,
        ) -> ItemId {
            self.registry
                .create_item(
                    &self.catalog,
                    NewItem {
                        name: name.to_string(),
                        warehouse_id,
                        category_id: self.category,
                        status,
                        quantity,
                        cost: LandedCost::base_only(base_cost).unwrap(),
                    },
                    Utc::now(),
                )
                .unwrap()
                .id_typed()
        }

        fn workflow(&mut self) -> ApprovalWorkflow<'_, Vec<(String, String)>> {
            ApprovalWorkflow::new(&self.catalog, &mut self.registry, &mut self.ledger, &mut self.sink)
        }

        pub fn propose_stock_out(&mut self, item: ItemId, quantity: i64) -> TransactionId {
            self.workflow()
                .propose_stock_out(item, quantity, "Auditor", Utc::now())
                .unwrap()
                .id_typed()
        }

        pub fn approve(&mut self, id: TransactionId) {
            self.workflow().approve(id, Utc::now()).unwrap();
        }

        pub fn reject(&mut self, id: TransactionId) {
            self.workflow().reject(id, "not needed", Utc::now()).unwrap();
        }
    }
}
