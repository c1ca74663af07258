//! Item Registry: the authoritative, exclusively-owned set of items.
//!
//! Every mutation runs through the [`Item`] aggregate on a working copy and
//! is committed only if the aggregate accepts it, so a failed call leaves
//! the registry untouched. Accepted events are queued in an outbox that the
//! caller drains with [`ItemRegistry::take_events`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use nexus_catalog::CatalogStore;
use nexus_core::{Aggregate, CategoryId, DomainError, DomainResult, ItemId, WarehouseId};

use crate::item::{
    AdjustStock, CreateItem, DeleteItem, InventoryEvent, Item, ItemCommand, ItemPatch, ItemStatus,
    UnitCostBasis, UpdateItem,
};
use crate::valuation::{LandedCost, checked_lot_cost};

/// Input for a direct intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub warehouse_id: WarehouseId,
    pub category_id: CategoryId,
    pub status: ItemStatus,
    pub quantity: i64,
    pub cost: LandedCost,
}

/// One line of a bulk intake manifest. `unit_price` is per unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkRow {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl BulkRow {
    fn is_usable(&self) -> bool {
        !self.name.trim().is_empty() && self.quantity > 0
    }
}

/// Identity of "the same SKU at a hub" for transfer merges.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MergeKey {
    pub warehouse_id: WarehouseId,
    pub category_id: CategoryId,
    pub name: String,
}

impl MergeKey {
    pub fn new(warehouse_id: WarehouseId, category_id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            warehouse_id,
            category_id,
            name: name.into(),
        }
    }

    pub fn of(item: &Item) -> Self {
        Self::new(item.warehouse_id(), item.category_id(), item.name())
    }
}

#[derive(Debug)]
pub struct ItemRegistry {
    items: BTreeMap<ItemId, Item>,
    next_id: ItemId,
    by_barcode: HashMap<String, ItemId>,
    by_merge_key: HashMap<MergeKey, BTreeSet<ItemId>>,
    outbox: Vec<InventoryEvent>,
}

impl Default for ItemRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
            next_id: ItemId::from_sequence(1),
            by_barcode: HashMap::new(),
            by_merge_key: HashMap::new(),
            outbox: Vec::new(),
        }
    }

    // ---- reads ----

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn require(&self, id: &ItemId) -> DomainResult<&Item> {
        self.items
            .get(id)
            .ok_or_else(|| DomainError::not_found(format!("item {id}")))
    }

    /// Exact-match barcode lookup.
    pub fn resolve(&self, barcode: &str) -> DomainResult<&Item> {
        self.by_barcode
            .get(barcode)
            .and_then(|id| self.items.get(id))
            .ok_or_else(|| DomainError::not_found(format!("item with barcode '{barcode}'")))
    }

    /// First item (lowest sequence) matching the merge key.
    pub fn find_merge_target(&self, key: &MergeKey) -> Option<&Item> {
        self.by_merge_key
            .get(key)
            .and_then(|ids| ids.first())
            .and_then(|id| self.items.get(id))
    }

    /// Case-insensitive substring match on name or barcode.
    pub fn search(&self, query: &str, category: Option<&CategoryId>) -> Vec<&Item> {
        let needle = query.trim().to_lowercase();
        self.items
            .values()
            .filter(|item| category.is_none_or(|c| item.category_id() == *c))
            .filter(|item| {
                needle.is_empty()
                    || item.name().to_lowercase().contains(&needle)
                    || item.barcode().to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Items in registry (creation) order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drain the events accepted since the last call, in order.
    pub fn take_events(&mut self) -> Vec<InventoryEvent> {
        std::mem::take(&mut self.outbox)
    }

    // ---- writes ----

    /// Direct intake. Warehouse and category must exist.
    pub fn create_item(
        &mut self,
        catalog: &CatalogStore,
        lot: NewItem,
        at: DateTime<Utc>,
    ) -> DomainResult<&Item> {
        catalog.require_warehouse(&lot.warehouse_id)?;
        catalog.require_category(&lot.category_id)?;

        let id = self.next_id;
        let barcode = nexus_catalog::allocate(catalog, &lot.warehouse_id, &lot.category_id, &id);
        self.insert_new(CreateItem {
            item_id: id,
            name: lot.name,
            warehouse_id: lot.warehouse_id,
            category_id: lot.category_id,
            status: lot.status,
            barcode,
            quantity: lot.quantity,
            cost: lot.cost,
            unit_cost_basis: UnitCostBasis::LandedCost,
            occurred_at: at,
        })
    }

    /// Create a copy of `source` at `target` holding `quantity` units.
    ///
    /// Status, cost components and true unit cost are carried over verbatim.
    /// The target is not required to exist; the barcode falls back instead.
    pub fn clone_to_warehouse(
        &mut self,
        catalog: &CatalogStore,
        source: &ItemId,
        target: WarehouseId,
        quantity: i64,
        at: DateTime<Utc>,
    ) -> DomainResult<&Item> {
        let source = self.require(source)?.clone();
        let id = self.next_id;
        let barcode = nexus_catalog::allocate(catalog, &target, &source.category_id(), &id);
        self.insert_new(CreateItem {
            item_id: id,
            name: source.name().to_string(),
            warehouse_id: target,
            category_id: source.category_id(),
            status: source.status(),
            barcode,
            quantity,
            cost: *source.cost(),
            unit_cost_basis: UnitCostBasis::CarriedOver(source.true_unit_cost()),
            occurred_at: at,
        })
    }

    /// Apply a partial edit and re-derive the barcode from the resulting
    /// placement. A newly named warehouse or category must exist.
    pub fn update_item(
        &mut self,
        catalog: &CatalogStore,
        id: &ItemId,
        patch: ItemPatch,
        at: DateTime<Utc>,
    ) -> DomainResult<&Item> {
        let current = self.require(id)?;
        if let Some(warehouse_id) = &patch.warehouse_id {
            catalog.require_warehouse(warehouse_id)?;
        }
        if let Some(category_id) = &patch.category_id {
            catalog.require_category(category_id)?;
        }

        let (warehouse_id, category_id) = patch.placement(current);
        let barcode = nexus_catalog::allocate(catalog, &warehouse_id, &category_id, id);
        self.run(
            id,
            ItemCommand::UpdateItem(UpdateItem {
                item_id: *id,
                patch,
                barcode,
                occurred_at: at,
            }),
        )
    }

    /// Mechanical quantity movement. Never touches the unit cost.
    pub fn adjust_quantity(
        &mut self,
        id: &ItemId,
        delta: i64,
        at: DateTime<Utc>,
    ) -> DomainResult<&Item> {
        self.run(
            id,
            ItemCommand::AdjustStock(AdjustStock {
                item_id: *id,
                delta,
                occurred_at: at,
            }),
        )
    }

    /// Direct stock-in of a positive quantity.
    pub fn stock_in(&mut self, id: &ItemId, quantity: i64, at: DateTime<Utc>) -> DomainResult<&Item> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be greater than zero"));
        }
        self.adjust_quantity(id, quantity, at)
    }

    pub fn delete_item(&mut self, id: &ItemId, at: DateTime<Utc>) -> DomainResult<Item> {
        let current = self.require(id)?;
        let mut working = current.clone();
        let events = working.execute(&ItemCommand::DeleteItem(DeleteItem {
            item_id: *id,
            occurred_at: at,
        }))?;

        if let Some(removed) = self.items.remove(id) {
            self.unindex(&removed);
        }
        self.outbox.extend(events);
        Ok(working)
    }

    /// Delete several items. Every id is checked before anything is removed.
    pub fn delete_items(&mut self, ids: &[ItemId], at: DateTime<Utc>) -> DomainResult<Vec<Item>> {
        for id in ids {
            self.require(id)?;
        }
        let unique: BTreeSet<ItemId> = ids.iter().copied().collect();
        unique
            .into_iter()
            .map(|id| self.delete_item(&id, at))
            .collect()
    }

    /// Batch intake of manifest rows into one warehouse and category.
    ///
    /// Rows with a blank name or non-positive quantity are skipped. Each
    /// created item is RAW with `base_cost = unit_price × quantity`.
    pub fn bulk_intake(
        &mut self,
        catalog: &CatalogStore,
        warehouse_id: WarehouseId,
        category_id: CategoryId,
        rows: &[BulkRow],
        at: DateTime<Utc>,
    ) -> DomainResult<Vec<ItemId>> {
        catalog.require_warehouse(&warehouse_id)?;
        catalog.require_category(&category_id)?;

        let usable: Vec<&BulkRow> = rows.iter().filter(|row| row.is_usable()).collect();
        if usable.is_empty() {
            return Err(DomainError::validation("manifest contains no usable rows"));
        }
        let mut lots = Vec::with_capacity(usable.len());
        for row in usable {
            let cost = LandedCost::base_only(checked_lot_cost(row.unit_price, row.quantity)?)?;
            lots.push(NewItem {
                name: row.name.clone(),
                warehouse_id,
                category_id,
                status: ItemStatus::Raw,
                quantity: row.quantity,
                cost,
            });
        }

        let mut created = Vec::with_capacity(lots.len());
        for lot in lots {
            created.push(self.create_item(catalog, lot, at)?.id_typed());
        }
        Ok(created)
    }

    // ---- internals ----

    fn insert_new(&mut self, cmd: CreateItem) -> DomainResult<&Item> {
        let id = cmd.item_id;
        let mut item = Item::empty(id);
        let events = item.execute(&ItemCommand::CreateItem(cmd))?;

        self.next_id = id.next();
        self.index(&item);
        self.outbox.extend(events);
        Ok(self.items.entry(id).or_insert(item))
    }

    fn run(&mut self, id: &ItemId, command: ItemCommand) -> DomainResult<&Item> {
        let mut working = self.require(id)?.clone();
        let events = working.execute(&command)?;

        if let Some(previous) = self.items.remove(id) {
            self.unindex(&previous);
        }
        self.index(&working);
        self.outbox.extend(events);
        Ok(self.items.entry(*id).or_insert(working))
    }

    fn index(&mut self, item: &Item) {
        self.by_barcode
            .insert(item.barcode().to_string(), item.id_typed());
        self.by_merge_key
            .entry(MergeKey::of(item))
            .or_default()
            .insert(item.id_typed());
    }

    fn unindex(&mut self, item: &Item) {
        if self.by_barcode.get(item.barcode()) == Some(&item.id_typed()) {
            self.by_barcode.remove(item.barcode());
        }
        let key = MergeKey::of(item);
        if let Some(ids) = self.by_merge_key.get_mut(&key) {
            ids.remove(&item.id_typed());
            if ids.is_empty() {
                self.by_merge_key.remove(&key);
            }
        }
    }
}
