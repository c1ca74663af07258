//! Approval Workflow: proposals, approvals and rejections.
//!
//! The workflow borrows the catalog, the item registry, the ledger and a
//! notification sink for the duration of one call. Approval is all-or-nothing
//! in the sense that every check (transaction state, stock on hand) runs
//! before the first item is touched.

use chrono::{DateTime, Utc};
use serde::Serialize;

use nexus_catalog::CatalogStore;
use nexus_core::{DomainError, DomainResult, ItemId, TransactionId, WarehouseId};
use nexus_inventory::{Item, ItemRegistry, MergeKey};
use nexus_notifications::{NotificationSink, titles};

use crate::ledger::TransactionLedger;
use crate::transaction::{Approve, Reject, StockTransaction, TransactionCommand, TransactionType};

/// What an approval did to the item registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "effect")]
pub enum StockEffect {
    /// The referenced item no longer exists; nothing moved.
    ItemMissing,
    Deducted {
        item_id: ItemId,
        quantity_after: i64,
    },
    Transferred {
        source: ItemId,
        destination: ItemId,
        merged: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovalOutcome {
    pub transaction: StockTransaction,
    pub effect: StockEffect,
}

pub struct ApprovalWorkflow<'a, S: NotificationSink + ?Sized> {
    catalog: &'a CatalogStore,
    registry: &'a mut ItemRegistry,
    ledger: &'a mut TransactionLedger,
    sink: &'a mut S,
}

impl<'a, S: NotificationSink + ?Sized> ApprovalWorkflow<'a, S> {
    pub fn new(
        catalog: &'a CatalogStore,
        registry: &'a mut ItemRegistry,
        ledger: &'a mut TransactionLedger,
        sink: &'a mut S,
    ) -> Self {
        Self {
            catalog,
            registry,
            ledger,
            sink,
        }
    }

    pub fn propose_stock_out(
        &mut self,
        item_id: ItemId,
        quantity: i64,
        staff_name: &str,
        at: DateTime<Utc>,
    ) -> DomainResult<StockTransaction> {
        let tx = self
            .ledger
            .propose_stock_out(self.registry, item_id, quantity, staff_name, at)?
            .clone();
        let name = self.item_name(&item_id);
        self.sink.notify(
            titles::APPROVAL_REQUIRED,
            &format!("Stock out of {quantity} units of {name}"),
            at,
        );
        Ok(tx)
    }

    pub fn propose_transfer(
        &mut self,
        item_id: ItemId,
        target_warehouse_id: WarehouseId,
        quantity: i64,
        staff_name: &str,
        at: DateTime<Utc>,
    ) -> DomainResult<StockTransaction> {
        let tx = self
            .ledger
            .propose_transfer(
                self.catalog,
                self.registry,
                item_id,
                target_warehouse_id,
                quantity,
                staff_name,
                at,
            )?
            .clone();
        let name = self.item_name(&item_id);
        let target = self
            .catalog
            .warehouse(&target_warehouse_id)
            .map(|w| w.name.as_str())
            .unwrap_or("Unknown Hub");
        self.sink.notify(
            titles::TRANSFER_PENDING,
            &format!("Relocating {quantity} units of {name} to {target}"),
            at,
        );
        Ok(tx)
    }

    /// Propose a full-quantity transfer of each item to `target`.
    ///
    /// Items already at the target or with nothing on hand are skipped. The
    /// target and every item are checked before anything is proposed.
    pub fn bulk_relocate(
        &mut self,
        item_ids: &[ItemId],
        target_warehouse_id: WarehouseId,
        staff_name: &str,
        at: DateTime<Utc>,
    ) -> DomainResult<Vec<StockTransaction>> {
        self.catalog.require_warehouse(&target_warehouse_id)?;
        let mut moves = Vec::new();
        for id in item_ids {
            let item = self.registry.require(id)?;
            if item.warehouse_id() == target_warehouse_id || item.quantity() <= 0 {
                tracing::debug!(item_id = %id, "bulk relocate: skipped");
                continue;
            }
            moves.push((*id, item.quantity()));
        }

        let mut proposed = Vec::with_capacity(moves.len());
        for (id, quantity) in moves {
            proposed.push(self.propose_transfer(id, target_warehouse_id, quantity, staff_name, at)?);
        }
        Ok(proposed)
    }

    /// Resolve a PENDING transaction as APPROVED and apply its stock effect.
    ///
    /// Fails with `InvalidState` if already resolved and with
    /// `InsufficientStock` if the source item holds less than requested; in
    /// both cases nothing changes. A vanished item is tolerated: the
    /// transaction is approved with no stock effect.
    pub fn approve(&mut self, id: TransactionId, at: DateTime<Utc>) -> DomainResult<ApprovalOutcome> {
        let tx = self.ledger.require(&id)?.clone();
        let command = TransactionCommand::Approve(Approve {
            transaction_id: id,
            occurred_at: at,
        });
        self.ledger.check(&id, &command)?;

        let effect = match self.registry.get(&tx.item_id()).cloned() {
            None => {
                tracing::warn!(transaction_id = %id, item_id = %tx.item_id(), "approving transaction for a missing item");
                StockEffect::ItemMissing
            }
            Some(item) => {
                if item.quantity() < tx.quantity() {
                    return Err(DomainError::insufficient_stock(item.quantity(), tx.quantity()));
                }
                match (tx.kind(), tx.target_warehouse_id()) {
                    (TransactionType::Transfer, Some(target)) => {
                        self.apply_transfer(&item, target, tx.quantity(), at)?
                    }
                    _ => {
                        let after = self
                            .registry
                            .adjust_quantity(&item.id_typed(), -tx.quantity(), at)?
                            .quantity();
                        StockEffect::Deducted {
                            item_id: item.id_typed(),
                            quantity_after: after,
                        }
                    }
                }
            }
        };

        let transaction = self.ledger.execute(&id, &command)?.clone();
        let name = self.item_name(&transaction.item_id());
        self.sink.notify(
            titles::TRANSACTION_APPROVED,
            &format!("{} request for {name} completed.", transaction.kind()),
            at,
        );
        tracing::info!(transaction_id = %id, kind = %transaction.kind(), ?effect, "transaction approved");

        Ok(ApprovalOutcome {
            transaction,
            effect,
        })
    }

    /// Resolve a PENDING transaction as REJECTED. No stock moves.
    pub fn reject(
        &mut self,
        id: TransactionId,
        reason: &str,
        at: DateTime<Utc>,
    ) -> DomainResult<StockTransaction> {
        let command = TransactionCommand::Reject(Reject {
            transaction_id: id,
            reason: reason.to_string(),
            occurred_at: at,
        });
        let transaction = self.ledger.execute(&id, &command)?.clone();
        let name = self.item_name(&transaction.item_id());
        self.sink.notify(
            titles::TRANSACTION_REJECTED,
            &format!("{} request for {name} was declined.", transaction.kind()),
            at,
        );
        tracing::info!(transaction_id = %id, reason = %reason.trim(), "transaction rejected");
        Ok(transaction)
    }

    fn apply_transfer(
        &mut self,
        source: &Item,
        target: WarehouseId,
        quantity: i64,
        at: DateTime<Utc>,
    ) -> DomainResult<StockEffect> {
        let key = MergeKey::new(target, source.category_id(), source.name());
        self.registry
            .adjust_quantity(&source.id_typed(), -quantity, at)?;

        let merge_into = self.registry.find_merge_target(&key).map(Item::id_typed);
        let (destination, merged) = match merge_into {
            Some(existing) => {
                self.registry.adjust_quantity(&existing, quantity, at)?;
                (existing, true)
            }
            None => {
                let created = self
                    .registry
                    .clone_to_warehouse(self.catalog, &source.id_typed(), target, quantity, at)?
                    .id_typed();
                (created, false)
            }
        };

        Ok(StockEffect::Transferred {
            source: source.id_typed(),
            destination,
            merged,
        })
    }

    fn item_name(&self, id: &ItemId) -> String {
        self.registry
            .get(id)
            .map(|item| item.name().to_string())
            .unwrap_or_else(|| "Item".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionStatus;
    use nexus_catalog::{Category, Warehouse};
    use nexus_core::CategoryId;
    use nexus_inventory::{ItemStatus, LandedCost, NewItem};
    use nexus_notifications::NotificationFeed;
    use rust_decimal_macros::dec;

    struct World {
        catalog: CatalogStore,
        registry: ItemRegistry,
        ledger: TransactionLedger,
        feed: NotificationFeed,
        hub_a: WarehouseId,
        hub_b: WarehouseId,
        hardware: CategoryId,
    }

    impl World {
        fn new() -> Self {
            let mut catalog = CatalogStore::new();
            let hub_a = catalog.add_warehouse(Warehouse::new("Hub A", "WHA").unwrap()).unwrap().id;
            let hub_b = catalog.add_warehouse(Warehouse::new("Hub B", "WHB").unwrap()).unwrap().id;
            let hardware = catalog.add_category(Category::root("Hardware", "HW").unwrap()).unwrap().id;
            Self {
                catalog,
                registry: ItemRegistry::new(),
                ledger: TransactionLedger::new(),
                feed: NotificationFeed::new(),
                hub_a,
                hub_b,
                hardware,
            }
        }

        fn add(&mut self, name: &str, warehouse_id: WarehouseId, quantity: i64) -> ItemId {
            self.registry
                .create_item(
                    &self.catalog,
                    NewItem {
                        name: name.to_string(),
                        warehouse_id,
                        category_id: self.hardware,
                        status: ItemStatus::Finished,
                        quantity,
                        cost: LandedCost::base_only(dec!(10) * rust_decimal::Decimal::from(quantity)).unwrap(),
                    },
                    Utc::now(),
                )
                .unwrap()
                .id_typed()
        }

        fn workflow(&mut self) -> ApprovalWorkflow<'_, NotificationFeed> {
            ApprovalWorkflow::new(&self.catalog, &mut self.registry, &mut self.ledger, &mut self.feed)
        }

        fn quantity(&self, id: ItemId) -> i64 {
            self.registry.require(&id).unwrap().quantity()
        }
    }

    #[test]
    fn approved_stock_out_deducts_once() {
        let mut world = World::new();
        let bolt = world.add("Bolt", world.hub_a, 10);
        let now = Utc::now();

        let tx = world.workflow().propose_stock_out(bolt, 4, "Dana", now).unwrap();
        let outcome = world.workflow().approve(tx.id_typed(), now).unwrap();
        assert_eq!(
            outcome.effect,
            StockEffect::Deducted {
                item_id: bolt,
                quantity_after: 6
            }
        );
        assert_eq!(outcome.transaction.status(), TransactionStatus::Approved);

        let err = world.workflow().approve(tx.id_typed(), now).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
        assert_eq!(world.quantity(bolt), 6);
    }

    #[test]
    fn transfer_merges_into_matching_destination_item() {
        let mut world = World::new();
        let source = world.add("Bolt", world.hub_a, 100);
        let existing = world.add("Bolt", world.hub_b, 5);
        let now = Utc::now();
        let hub_b = world.hub_b;

        let tx = world.workflow().propose_transfer(source, hub_b, 30, "Dana", now).unwrap();
        let outcome = world.workflow().approve(tx.id_typed(), now).unwrap();

        assert_eq!(
            outcome.effect,
            StockEffect::Transferred {
                source,
                destination: existing,
                merged: true
            }
        );
        assert_eq!(world.quantity(source), 70);
        assert_eq!(world.quantity(existing), 35);
        assert_eq!(world.registry.len(), 2);
    }

    #[test]
    fn transfer_without_match_clones_the_item() {
        let mut world = World::new();
        let source = world.add("Bolt", world.hub_a, 100);
        let now = Utc::now();
        let hub_b = world.hub_b;

        let tx = world.workflow().propose_transfer(source, hub_b, 30, "Dana", now).unwrap();
        let outcome = world.workflow().approve(tx.id_typed(), now).unwrap();
        let StockEffect::Transferred {
            destination,
            merged,
            ..
        } = outcome.effect
        else {
            panic!("Expected a transfer effect, got {:?}", outcome.effect);
        };

        assert!(!merged);
        let copy = world.registry.require(&destination).unwrap();
        assert_eq!(copy.warehouse_id(), hub_b);
        assert_eq!(copy.quantity(), 30);
        assert_eq!(copy.true_unit_cost(), dec!(10));
        assert_eq!(copy.barcode(), format!("WHB-HW-{}", destination.barcode_suffix()));
    }

    #[test]
    fn insufficient_stock_leaves_everything_pending() {
        let mut world = World::new();
        let bolt = world.add("Bolt", world.hub_a, 10);
        let now = Utc::now();

        let tx = world.workflow().propose_stock_out(bolt, 1_000_000, "Dana", now).unwrap();
        let err = world.workflow().approve(tx.id_typed(), now).unwrap_err();

        assert_eq!(err, DomainError::insufficient_stock(10, 1_000_000));
        assert_eq!(world.quantity(bolt), 10);
        assert!(world.ledger.require(&tx.id_typed()).unwrap().is_pending());
    }

    #[test]
    fn reject_with_empty_reason_keeps_transaction_pending() {
        let mut world = World::new();
        let bolt = world.add("Bolt", world.hub_a, 10);
        let now = Utc::now();

        let tx = world.workflow().propose_stock_out(bolt, 2, "Dana", now).unwrap();
        let err = world.workflow().reject(tx.id_typed(), "", now).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(world.ledger.require(&tx.id_typed()).unwrap().is_pending());

        let rejected = world.workflow().reject(tx.id_typed(), "wrong SKU", now).unwrap();
        assert_eq!(rejected.status(), TransactionStatus::Rejected);
        assert_eq!(world.quantity(bolt), 10);
        let latest = world.feed.list().next().unwrap();
        assert_eq!(latest.title, titles::TRANSACTION_REJECTED);
        assert_eq!(latest.message, "STOCK_OUT request for Bolt was declined.");
    }

    #[test]
    fn approval_of_deleted_item_has_no_stock_effect() {
        let mut world = World::new();
        let bolt = world.add("Bolt", world.hub_a, 10);
        let now = Utc::now();

        let tx = world.workflow().propose_stock_out(bolt, 2, "Dana", now).unwrap();
        world.registry.delete_item(&bolt, now).unwrap();
        let outcome = world.workflow().approve(tx.id_typed(), now).unwrap();

        assert_eq!(outcome.effect, StockEffect::ItemMissing);
        assert_eq!(outcome.transaction.status(), TransactionStatus::Approved);
        let latest = world.feed.list().next().unwrap();
        assert_eq!(latest.message, "STOCK_OUT request for Item completed.");
    }

    #[test]
    fn transfer_to_vanished_hub_still_completes() {
        let mut world = World::new();
        let bolt = world.add("Bolt", world.hub_a, 10);
        let now = Utc::now();
        let hub_b = world.hub_b;

        let tx = world.workflow().propose_transfer(bolt, hub_b, 4, "Dana", now).unwrap();
        world.catalog.remove_warehouse(&hub_b).unwrap();
        let outcome = world.workflow().approve(tx.id_typed(), now).unwrap();

        let StockEffect::Transferred { destination, .. } = outcome.effect else {
            panic!("Expected a transfer effect, got {:?}", outcome.effect);
        };
        assert!(world.registry.require(&destination).unwrap().barcode().starts_with("WH-HW-"));
    }

    #[test]
    fn proposals_notify_approvers() {
        let mut world = World::new();
        let bolt = world.add("Bolt", world.hub_a, 10);
        let now = Utc::now();
        let hub_b = world.hub_b;

        world.workflow().propose_stock_out(bolt, 3, "Dana", now).unwrap();
        world.workflow().propose_transfer(bolt, hub_b, 2, "Dana", now).unwrap();

        let messages: Vec<(&str, &str)> = world
            .feed
            .list()
            .map(|n| (n.title.as_str(), n.message.as_str()))
            .collect();
        assert_eq!(
            messages,
            vec![
                (titles::TRANSFER_PENDING, "Relocating 2 units of Bolt to Hub B"),
                (titles::APPROVAL_REQUIRED, "Stock out of 3 units of Bolt"),
            ]
        );
    }

    #[test]
    fn bulk_relocate_skips_items_at_target_or_empty() {
        let mut world = World::new();
        let a = world.add("Bolt", world.hub_a, 10);
        let b = world.add("Nut", world.hub_b, 10);
        let c = world.add("Washer", world.hub_a, 1);
        let now = Utc::now();
        world.registry.adjust_quantity(&c, -1, now).unwrap();
        let hub_b = world.hub_b;

        let proposed = world.workflow().bulk_relocate(&[a, b, c], hub_b, "Dana", now).unwrap();
        assert_eq!(proposed.len(), 1);
        assert_eq!(proposed[0].item_id(), a);
        assert_eq!(proposed[0].quantity(), 10);

        let err = world
            .workflow()
            .bulk_relocate(&[a], WarehouseId::new(), "Dana", now)
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(world.ledger.transactions().len(), 1);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Transfers conserve the SKU's total quantity, merged or not.
            #[test]
            fn transfer_conserves_quantity(
                source_qty in 1i64..1_000,
                existing_qty in proptest::option::of(1i64..1_000),
                moved in 1i64..1_000,
            ) {
                prop_assume!(moved <= source_qty);
                let mut world = World::new();
                let source = world.add("Bolt", world.hub_a, source_qty);
                if let Some(qty) = existing_qty {
                    world.add("Bolt", world.hub_b, qty);
                }
                let hub_b = world.hub_b;
                let total_before: i64 = world.registry.items().map(|i| i.quantity()).sum();

                let now = Utc::now();
                let tx = world.workflow().propose_transfer(source, hub_b, moved, "Dana", now).unwrap();
                world.workflow().approve(tx.id_typed(), now).unwrap();

                let total_after: i64 = world.registry.items().map(|i| i.quantity()).sum();
                prop_assert_eq!(total_before, total_after);
                prop_assert_eq!(world.quantity(source), source_qty - moved);
                let at_b: i64 = world
                    .registry
                    .items()
                    .filter(|i| i.warehouse_id() == hub_b)
                    .map(|i| i.quantity())
                    .sum();
                prop_assert_eq!(at_b, existing_qty.unwrap_or(0) + moved);
            }

            /// Approved stock-outs subtract exactly; oversized ones change nothing.
            #[test]
            fn stock_out_arithmetic(on_hand in 1i64..10_000, requested in 1i64..20_000) {
                let mut world = World::new();
                let item = world.add("Bolt", world.hub_a, on_hand);
                let now = Utc::now();
                let tx = world.workflow().propose_stock_out(item, requested, "Dana", now).unwrap();
                let result = world.workflow().approve(tx.id_typed(), now);

                if requested <= on_hand {
                    prop_assert!(result.is_ok());
                    prop_assert_eq!(world.quantity(item), on_hand - requested);
                } else {
                    prop_assert!(
                        matches!(result, Err(DomainError::InsufficientStock { .. })),
                        "expected insufficient stock"
                    );
                    prop_assert_eq!(world.quantity(item), on_hand);
                }
            }
        }
    }
}
