use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use nexus_core::{
    Aggregate, AggregateRoot, CategoryId, DomainError, DomainResult, ItemId, WarehouseId,
};
use nexus_events::Event;

use crate::valuation::{LandedCost, checked_stock_value};

/// Descriptive condition of a SKU. No transitions are enforced between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Raw,
    Finished,
    GoodAsNew,
    OldUsed,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 4] = [
        ItemStatus::Raw,
        ItemStatus::Finished,
        ItemStatus::GoodAsNew,
        ItemStatus::OldUsed,
    ];
}

/// How the cached true unit cost of a new item is established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "basis", content = "unit_cost")]
pub enum UnitCostBasis {
    /// Landed cost divided by the intake quantity.
    LandedCost,
    /// Carried over verbatim from another item (transfer copies).
    CarriedOver(Decimal),
}

/// Aggregate root: Item (one SKU row at one hub).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    id: ItemId,
    name: String,
    warehouse_id: WarehouseId,
    category_id: CategoryId,
    status: ItemStatus,
    barcode: String,
    quantity: i64,
    #[serde(flatten)]
    cost: LandedCost,
    true_unit_cost: Decimal,
    last_updated: DateTime<Utc>,
    version: u64,
    #[serde(skip)]
    created: bool,
    #[serde(skip)]
    deleted: bool,
}

impl Item {
    /// Create an empty, not-yet-created aggregate instance.
    pub fn empty(id: ItemId) -> Self {
        Self {
            id,
            name: String::new(),
            warehouse_id: WarehouseId::from_uuid(Default::default()),
            category_id: CategoryId::from_uuid(Default::default()),
            status: ItemStatus::Raw,
            barcode: String::new(),
            quantity: 0,
            cost: LandedCost::default(),
            true_unit_cost: Decimal::ZERO,
            last_updated: DateTime::<Utc>::MIN_UTC,
            version: 0,
            created: false,
            deleted: false,
        }
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn warehouse_id(&self) -> WarehouseId {
        self.warehouse_id
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn barcode(&self) -> &str {
        &self.barcode
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn cost(&self) -> &LandedCost {
        &self.cost
    }

    pub fn true_unit_cost(&self) -> Decimal {
        self.true_unit_cost
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Carrying value of the stock on hand: quantity × true unit cost.
    ///
    /// Saturates at `Decimal::MAX`; intake and updates reject values that
    /// would not fit.
    pub fn stock_value(&self) -> Decimal {
        Decimal::from(self.quantity.max(0)).saturating_mul(self.true_unit_cost)
    }
}

impl AggregateRoot for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateItem.
///
/// The barcode is allocated by the registry (it needs the catalog) and
/// handed in ready-made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateItem {
    pub item_id: ItemId,
    pub name: String,
    pub warehouse_id: WarehouseId,
    pub category_id: CategoryId,
    pub status: ItemStatus,
    pub barcode: String,
    pub quantity: i64,
    pub cost: LandedCost,
    pub unit_cost_basis: UnitCostBasis,
    pub occurred_at: DateTime<Utc>,
}

/// Partial edit of an item. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub warehouse_id: Option<WarehouseId>,
    pub category_id: Option<CategoryId>,
    pub status: Option<ItemStatus>,
    pub quantity: Option<i64>,
    pub base_cost: Option<Decimal>,
    pub freight: Option<Decimal>,
    pub duties: Option<Decimal>,
    pub taxes: Option<Decimal>,
}

impl ItemPatch {
    /// Whether the patch sets freight, duties or taxes.
    pub fn touches_landed_cost(&self) -> bool {
        self.freight.is_some() || self.duties.is_some() || self.taxes.is_some()
    }

    /// Placement after the patch is applied to `item`.
    pub fn placement(&self, item: &Item) -> (WarehouseId, CategoryId) {
        (
            self.warehouse_id.unwrap_or(item.warehouse_id),
            self.category_id.unwrap_or(item.category_id),
        )
    }

    fn cost(&self, current: &LandedCost) -> LandedCost {
        LandedCost {
            base_cost: self.base_cost.unwrap_or(current.base_cost),
            freight: self.freight.unwrap_or(current.freight),
            duties: self.duties.unwrap_or(current.duties),
            taxes: self.taxes.unwrap_or(current.taxes),
        }
    }
}

/// Command: UpdateItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateItem {
    pub item_id: ItemId,
    pub patch: ItemPatch,
    /// Barcode re-derived from the post-patch placement.
    pub barcode: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AdjustStock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustStock {
    pub item_id: ItemId,
    pub delta: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeleteItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteItem {
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemCommand {
    CreateItem(CreateItem),
    UpdateItem(UpdateItem),
    AdjustStock(AdjustStock),
    DeleteItem(DeleteItem),
}

/// Event: ItemCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCreated {
    pub item_id: ItemId,
    pub name: String,
    pub warehouse_id: WarehouseId,
    pub category_id: CategoryId,
    pub status: ItemStatus,
    pub barcode: String,
    pub quantity: i64,
    pub cost: LandedCost,
    pub true_unit_cost: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemUpdated (full post-edit state).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdated {
    pub item_id: ItemId,
    pub name: String,
    pub warehouse_id: WarehouseId,
    pub category_id: CategoryId,
    pub status: ItemStatus,
    pub barcode: String,
    pub quantity: i64,
    pub cost: LandedCost,
    pub true_unit_cost: Decimal,
    pub revalued: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StockAdjusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjusted {
    pub item_id: ItemId,
    pub delta: i64,
    pub quantity_after: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemDeleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDeleted {
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryEvent {
    ItemCreated(ItemCreated),
    ItemUpdated(ItemUpdated),
    StockAdjusted(StockAdjusted),
    ItemDeleted(ItemDeleted),
}

impl InventoryEvent {
    pub fn item_id(&self) -> ItemId {
        match self {
            InventoryEvent::ItemCreated(e) => e.item_id,
            InventoryEvent::ItemUpdated(e) => e.item_id,
            InventoryEvent::StockAdjusted(e) => e.item_id,
            InventoryEvent::ItemDeleted(e) => e.item_id,
        }
    }
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::ItemCreated(_) => "inventory.item.created",
            InventoryEvent::ItemUpdated(_) => "inventory.item.updated",
            InventoryEvent::StockAdjusted(_) => "inventory.item.stock_adjusted",
            InventoryEvent::ItemDeleted(_) => "inventory.item.deleted",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryEvent::ItemCreated(e) => e.occurred_at,
            InventoryEvent::ItemUpdated(e) => e.occurred_at,
            InventoryEvent::StockAdjusted(e) => e.occurred_at,
            InventoryEvent::ItemDeleted(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Item {
    type Command = ItemCommand;
    type Event = InventoryEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InventoryEvent::ItemCreated(e) => {
                self.id = e.item_id;
                self.name = e.name.clone();
                self.warehouse_id = e.warehouse_id;
                self.category_id = e.category_id;
                self.status = e.status;
                self.barcode = e.barcode.clone();
                self.quantity = e.quantity;
                self.cost = e.cost;
                self.true_unit_cost = e.true_unit_cost;
                self.last_updated = e.occurred_at;
                self.created = true;
            }
            InventoryEvent::ItemUpdated(e) => {
                self.name = e.name.clone();
                self.warehouse_id = e.warehouse_id;
                self.category_id = e.category_id;
                self.status = e.status;
                self.barcode = e.barcode.clone();
                self.quantity = e.quantity;
                self.cost = e.cost;
                self.true_unit_cost = e.true_unit_cost;
                self.last_updated = e.occurred_at;
            }
            InventoryEvent::StockAdjusted(e) => {
                self.quantity += e.delta;
                self.last_updated = e.occurred_at;
            }
            InventoryEvent::ItemDeleted(e) => {
                self.deleted = true;
                self.last_updated = e.occurred_at;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ItemCommand::CreateItem(cmd) => self.handle_create(cmd),
            ItemCommand::UpdateItem(cmd) => self.handle_update(cmd),
            ItemCommand::AdjustStock(cmd) => self.handle_adjust(cmd),
            ItemCommand::DeleteItem(cmd) => self.handle_delete(cmd),
        }
    }
}

impl Item {
    fn ensure_live(&self, item_id: ItemId) -> DomainResult<()> {
        if !self.created || self.deleted {
            return Err(DomainError::not_found(format!("item {item_id}")));
        }
        if self.id != item_id {
            return Err(DomainError::validation("item_id mismatch"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateItem) -> DomainResult<Vec<InventoryEvent>> {
        if self.created {
            return Err(DomainError::invalid_state(format!(
                "item {} already exists",
                cmd.item_id
            )));
        }
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("item name cannot be empty"));
        }
        if cmd.quantity <= 0 {
            return Err(DomainError::validation("quantity must be greater than zero"));
        }
        cmd.cost.validate()?;

        let true_unit_cost = match cmd.unit_cost_basis {
            UnitCostBasis::LandedCost => cmd.cost.unit_cost(cmd.quantity),
            UnitCostBasis::CarriedOver(unit_cost) => unit_cost,
        };
        checked_stock_value(cmd.quantity, true_unit_cost)?;

        Ok(vec![InventoryEvent::ItemCreated(ItemCreated {
            item_id: cmd.item_id,
            name: cmd.name.trim().to_string(),
            warehouse_id: cmd.warehouse_id,
            category_id: cmd.category_id,
            status: cmd.status,
            barcode: cmd.barcode.clone(),
            quantity: cmd.quantity,
            cost: cmd.cost,
            true_unit_cost,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateItem) -> DomainResult<Vec<InventoryEvent>> {
        self.ensure_live(cmd.item_id)?;
        let patch = &cmd.patch;

        let name = match &patch.name {
            Some(name) if name.trim().is_empty() => {
                return Err(DomainError::validation("item name cannot be empty"));
            }
            Some(name) => name.trim().to_string(),
            None => self.name.clone(),
        };

        let quantity = patch.quantity.unwrap_or(self.quantity);
        if quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }

        let cost = patch.cost(&self.cost);
        cost.validate()?;

        let revalued = cost != self.cost || quantity != self.quantity;
        let true_unit_cost = if revalued {
            cost.unit_cost(quantity)
        } else {
            self.true_unit_cost
        };
        checked_stock_value(quantity, true_unit_cost)?;

        let (warehouse_id, category_id) = patch.placement(self);

        Ok(vec![InventoryEvent::ItemUpdated(ItemUpdated {
            item_id: cmd.item_id,
            name,
            warehouse_id,
            category_id,
            status: patch.status.unwrap_or(self.status),
            barcode: cmd.barcode.clone(),
            quantity,
            cost,
            true_unit_cost,
            revalued,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_adjust(&self, cmd: &AdjustStock) -> DomainResult<Vec<InventoryEvent>> {
        self.ensure_live(cmd.item_id)?;

        if cmd.delta == 0 {
            return Err(DomainError::validation("delta cannot be zero"));
        }

        let quantity_after = self
            .quantity
            .checked_add(cmd.delta)
            .ok_or_else(|| DomainError::validation("quantity overflow"))?;
        if quantity_after < 0 {
            return Err(DomainError::insufficient_stock(self.quantity, -cmd.delta));
        }
        checked_stock_value(quantity_after, self.true_unit_cost)?;

        Ok(vec![InventoryEvent::StockAdjusted(StockAdjusted {
            item_id: cmd.item_id,
            delta: cmd.delta,
            quantity_after,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_delete(&self, cmd: &DeleteItem) -> DomainResult<Vec<InventoryEvent>> {
        self.ensure_live(cmd.item_id)?;
        Ok(vec![InventoryEvent::ItemDeleted(ItemDeleted {
            item_id: cmd.item_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn create_cmd(item_id: ItemId, quantity: i64, cost: LandedCost) -> CreateItem {
        CreateItem {
            item_id,
            name: "Bolt".to_string(),
            warehouse_id: WarehouseId::new(),
            category_id: CategoryId::new(),
            status: ItemStatus::Raw,
            barcode: "WHA-HW-000001".to_string(),
            quantity,
            cost,
            unit_cost_basis: UnitCostBasis::LandedCost,
            occurred_at: test_time(),
        }
    }

    fn created_item(quantity: i64, cost: LandedCost) -> Item {
        let id = ItemId::from_sequence(1);
        let mut item = Item::empty(id);
        item.execute(&ItemCommand::CreateItem(create_cmd(id, quantity, cost)))
            .unwrap();
        item
    }

    fn update(item: &Item, patch: ItemPatch) -> ItemCommand {
        ItemCommand::UpdateItem(UpdateItem {
            item_id: item.id_typed(),
            patch,
            barcode: item.barcode().to_string(),
            occurred_at: test_time(),
        })
    }

    #[test]
    fn create_item_computes_true_unit_cost() {
        let item = created_item(100, LandedCost::base_only(dec!(1000)).unwrap());
        assert_eq!(item.true_unit_cost(), dec!(10.00));
        assert_eq!(item.quantity(), 100);
        assert_eq!(item.version(), 1);
    }

    #[test]
    fn create_item_rejects_non_positive_quantity() {
        let id = ItemId::from_sequence(1);
        let item = Item::empty(id);
        let err = item
            .handle(&ItemCommand::CreateItem(create_cmd(id, 0, LandedCost::default())))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn create_item_can_carry_unit_cost_over() {
        let id = ItemId::from_sequence(9);
        let mut cmd = create_cmd(id, 30, LandedCost::base_only(dec!(1000)).unwrap());
        cmd.unit_cost_basis = UnitCostBasis::CarriedOver(dec!(10));

        let mut item = Item::empty(id);
        item.execute(&ItemCommand::CreateItem(cmd)).unwrap();
        assert_eq!(item.true_unit_cost(), dec!(10));
    }

    #[test]
    fn stock_movements_keep_the_unit_cost_sticky() {
        let mut item = created_item(100, LandedCost::base_only(dec!(1000)).unwrap());
        item.execute(&ItemCommand::AdjustStock(AdjustStock {
            item_id: item.id_typed(),
            delta: -60,
            occurred_at: test_time(),
        }))
        .unwrap();

        assert_eq!(item.quantity(), 40);
        assert_eq!(item.true_unit_cost(), dec!(10));
    }

    #[test]
    fn adjust_stock_refuses_to_go_negative() {
        let item = created_item(10, LandedCost::default());
        let err = item
            .handle(&ItemCommand::AdjustStock(AdjustStock {
                item_id: item.id_typed(),
                delta: -11,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::insufficient_stock(10, 11));
    }

    #[test]
    fn adjust_stock_rejects_zero_delta() {
        let item = created_item(10, LandedCost::default());
        let err = item
            .handle(&ItemCommand::AdjustStock(AdjustStock {
                item_id: item.id_typed(),
                delta: 0,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn editing_costs_revalues_the_item() {
        let mut item = created_item(100, LandedCost::base_only(dec!(1000)).unwrap());
        let cmd = update(
            &item,
            ItemPatch {
                freight: Some(dec!(200)),
                ..Default::default()
            },
        );
        let events = item.execute(&cmd).unwrap();

        match &events[0] {
            InventoryEvent::ItemUpdated(e) => assert!(e.revalued),
            other => panic!("Expected ItemUpdated event, got {other:?}"),
        }
        assert_eq!(item.true_unit_cost(), dec!(12));
    }

    #[test]
    fn editing_only_descriptive_fields_keeps_unit_cost() {
        let mut item = created_item(100, LandedCost::base_only(dec!(1000)).unwrap());
        item.execute(&ItemCommand::AdjustStock(AdjustStock {
            item_id: item.id_typed(),
            delta: -50,
            occurred_at: test_time(),
        }))
        .unwrap();

        let cmd = update(
            &item,
            ItemPatch {
                name: Some("Hex Bolt".to_string()),
                status: Some(ItemStatus::OldUsed),
                ..Default::default()
            },
        );
        item.execute(&cmd).unwrap();

        assert_eq!(item.name(), "Hex Bolt");
        assert_eq!(item.status(), ItemStatus::OldUsed);
        assert_eq!(item.true_unit_cost(), dec!(10));
    }

    #[test]
    fn update_rejects_negative_cost_and_blank_name() {
        let item = created_item(5, LandedCost::default());
        let bad_cost = update(
            &item,
            ItemPatch {
                taxes: Some(dec!(-1)),
                ..Default::default()
            },
        );
        assert!(matches!(item.handle(&bad_cost), Err(DomainError::Validation(_))));

        let blank = update(
            &item,
            ItemPatch {
                name: Some("   ".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(item.handle(&blank), Err(DomainError::Validation(_))));
    }

    #[test]
    fn deleted_items_reject_further_commands() {
        let mut item = created_item(5, LandedCost::default());
        item.execute(&ItemCommand::DeleteItem(DeleteItem {
            item_id: item.id_typed(),
            occurred_at: test_time(),
        }))
        .unwrap();

        assert!(item.is_deleted());
        let err = item
            .handle(&ItemCommand::AdjustStock(AdjustStock {
                item_id: item.id_typed(),
                delta: 1,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn apply_is_deterministic() {
        let id = ItemId::from_sequence(1);
        let created = Item::empty(id)
            .handle(&ItemCommand::CreateItem(create_cmd(
                id,
                10,
                LandedCost::base_only(dec!(55)).unwrap(),
            )))
            .unwrap();
        let adjusted = InventoryEvent::StockAdjusted(StockAdjusted {
            item_id: id,
            delta: 5,
            quantity_after: 15,
            occurred_at: test_time(),
        });

        let mut a = Item::empty(id);
        let mut b = Item::empty(id);
        for event in created.iter().chain(std::iter::once(&adjusted)) {
            a.apply(event);
            b.apply(event);
        }

        assert_eq!(a, b);
        assert_eq!(a.version(), 2);
        assert_eq!(a.quantity(), 15);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: handle never mutates state.
            #[test]
            fn handle_does_not_mutate(delta in -200i64..200) {
                let item = created_item(100, LandedCost::base_only(dec!(1000)).unwrap());
                let before = item.clone();
                let _ = item.handle(&ItemCommand::AdjustStock(AdjustStock {
                    item_id: item.id_typed(),
                    delta,
                    occurred_at: test_time(),
                }));
                prop_assert_eq!(item, before);
            }

            /// Property: a successful adjustment lands exactly on quantity + delta.
            #[test]
            fn adjustment_arithmetic(start in 1i64..10_000, delta in -10_000i64..10_000) {
                prop_assume!(delta != 0);
                let mut item = created_item(start, LandedCost::default());
                let result = item.execute(&ItemCommand::AdjustStock(AdjustStock {
                    item_id: item.id_typed(),
                    delta,
                    occurred_at: test_time(),
                }));

                if start + delta >= 0 {
                    prop_assert!(result.is_ok());
                    prop_assert_eq!(item.quantity(), start + delta);
                } else {
                    prop_assert!(
                        matches!(result, Err(DomainError::InsufficientStock { .. })),
                        "expected insufficient stock"
                    );
                    prop_assert_eq!(item.quantity(), start);
                }
            }
        }
    }
}
