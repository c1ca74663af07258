//! The inventory service facade.
//!
//! Owns every component of the ledger and is the only place where the
//! permission matrix is consulted. Each call authorizes first, then runs the
//! domain operation, then publishes the resulting domain events to the bus.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use nexus_auth::{
    Action, AuthorizationExplanation, ModuleId, Permission, Requirement, Role, RolePermissionMap,
    explain_authorization,
};
use nexus_catalog::{CatalogStore, Category, Warehouse};
use nexus_core::{CategoryId, DomainError, ItemId, NotificationId, TransactionId, WarehouseId};
use nexus_events::{Event, EventBus, EventEnvelope, InMemoryEventBus, Subscription};
use nexus_infra::NexusConfig;
use nexus_infra::projections::{
    self, AgingSummary, DashboardSummary, RiskEntry, WarehouseValuation,
};
use nexus_inventory::{BulkRow, Item, ItemPatch, ItemRegistry, LandedCost, NewItem};
use nexus_notifications::{Notification, NotificationFeed, NotificationSink, titles};
use nexus_workflow::{ApprovalOutcome, ApprovalWorkflow, StockTransaction, TransactionLedger};

use crate::authz::{Operation, authorize_operation};
use crate::context::CallContext;
use crate::errors::ServiceResult;
use crate::snapshot::Snapshot;

pub type LedgerBus = InMemoryEventBus<EventEnvelope<JsonValue>>;

const ITEM_AGGREGATE: &str = "inventory.item";
const TRANSACTION_AGGREGATE: &str = "workflow.transaction";

pub struct InventoryService {
    config: NexusConfig,
    catalog: CatalogStore,
    registry: ItemRegistry,
    ledger: TransactionLedger,
    permissions: RolePermissionMap,
    notifications: NotificationFeed,
    bus: Arc<LedgerBus>,
    sequence: u64,
}

impl InventoryService {
    /// A service over `catalog` with the default permission matrix and an
    /// empty item registry and ledger.
    pub fn new(config: NexusConfig, catalog: CatalogStore) -> Self {
        Self {
            config,
            catalog,
            registry: ItemRegistry::new(),
            ledger: TransactionLedger::new(),
            permissions: RolePermissionMap::with_defaults(),
            notifications: NotificationFeed::new(),
            bus: Arc::new(LedgerBus::new()),
            sequence: 0,
        }
    }

    pub fn with_permissions(mut self, permissions: RolePermissionMap) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn config(&self) -> &NexusConfig {
        &self.config
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn bus(&self) -> Arc<LedgerBus> {
        Arc::clone(&self.bus)
    }

    /// Observe every domain event published from now on.
    pub fn subscribe(&self) -> Subscription<EventEnvelope<JsonValue>> {
        self.bus.subscribe()
    }

    /// Whether the caller's own role holds `(module, action)`.
    pub fn can_perform(&self, ctx: &CallContext, module: ModuleId, action: Action) -> bool {
        self.permissions.can_perform(ctx.role(), module, action)
    }

    fn authorize(&self, ctx: &CallContext, op: Operation) -> ServiceResult<()> {
        authorize_operation(&self.permissions, ctx, op)?;
        Ok(())
    }

    // ── Catalog administration ──────────────────────────────────────────────

    pub fn add_warehouse(
        &mut self,
        ctx: &CallContext,
        name: &str,
        prefix: &str,
    ) -> ServiceResult<Warehouse> {
        self.authorize(ctx, Operation::AddWarehouse)?;
        let warehouse = self.catalog.add_warehouse(Warehouse::new(name, prefix)?)?.clone();
        tracing::info!(warehouse_id = %warehouse.id, prefix = %warehouse.prefix, "warehouse added");
        Ok(warehouse)
    }

    pub fn remove_warehouse(&mut self, ctx: &CallContext, id: &WarehouseId) -> ServiceResult<Warehouse> {
        self.authorize(ctx, Operation::RemoveWarehouse)?;
        let removed = self.catalog.remove_warehouse(id)?;
        tracing::info!(warehouse_id = %id, "warehouse removed");
        Ok(removed)
    }

    pub fn add_category(
        &mut self,
        ctx: &CallContext,
        name: &str,
        code: &str,
        parent_id: Option<CategoryId>,
    ) -> ServiceResult<Category> {
        self.authorize(ctx, Operation::AddCategory)?;
        let category = match parent_id {
            Some(parent) => Category::child(parent, name, code)?,
            None => Category::root(name, code)?,
        };
        let category = self.catalog.add_category(category)?.clone();
        tracing::info!(category_id = %category.id, code = %category.code, "category added");
        Ok(category)
    }

    /// Removes the category and its sub-categories.
    pub fn remove_category(
        &mut self,
        ctx: &CallContext,
        id: &CategoryId,
    ) -> ServiceResult<Vec<Category>> {
        self.authorize(ctx, Operation::RemoveCategory)?;
        let removed = self.catalog.remove_category(id)?;
        tracing::info!(category_id = %id, removed = removed.len(), "category removed");
        Ok(removed)
    }

    // ── Items ───────────────────────────────────────────────────────────────

    /// Direct intake at base cost. Freight, duties and taxes go through
    /// [`valuation_intake`](Self::valuation_intake).
    pub fn create_item(&mut self, ctx: &CallContext, lot: NewItem) -> ServiceResult<Item> {
        self.authorize(ctx, Operation::CreateItem)?;
        if lot.cost.has_landed_components() {
            return Err(DomainError::validation(
                "freight, duties and taxes require valuation intake",
            )
            .into());
        }
        self.intake(ctx, lot)
    }

    /// Landed-cost intake from the valuation desk.
    pub fn valuation_intake(&mut self, ctx: &CallContext, lot: NewItem) -> ServiceResult<Item> {
        self.authorize(ctx, Operation::ValuationIntake)?;
        self.intake(ctx, lot)
    }

    /// Preview the true unit cost of a lot without recording anything.
    pub fn quote_unit_cost(
        &self,
        ctx: &CallContext,
        cost: &LandedCost,
        quantity: i64,
    ) -> ServiceResult<Decimal> {
        self.authorize(ctx, Operation::QuoteUnitCost)?;
        cost.validate()?;
        Ok(cost.unit_cost(quantity))
    }

    fn intake(&mut self, ctx: &CallContext, lot: NewItem) -> ServiceResult<Item> {
        let item = self.registry.create_item(&self.catalog, lot, ctx.now())?.clone();
        tracing::info!(
            item_id = %item.id_typed(),
            barcode = %item.barcode(),
            staff = %ctx.staff_name(),
            "item created"
        );
        self.publish_pending();
        Ok(item)
    }

    pub fn update_item(
        &mut self,
        ctx: &CallContext,
        id: &ItemId,
        patch: ItemPatch,
    ) -> ServiceResult<Item> {
        self.authorize(ctx, Operation::UpdateItem)?;
        if patch.touches_landed_cost() {
            self.authorize(ctx, Operation::ValuationIntake)?;
        }
        let item = self
            .registry
            .update_item(&self.catalog, id, patch, ctx.now())?
            .clone();
        tracing::info!(item_id = %id, barcode = %item.barcode(), "item updated");
        self.publish_pending();
        Ok(item)
    }

    pub fn stock_in(&mut self, ctx: &CallContext, id: &ItemId, quantity: i64) -> ServiceResult<Item> {
        self.authorize(ctx, Operation::StockIn)?;
        let item = self.registry.stock_in(id, quantity, ctx.now())?.clone();
        self.notifications.notify(
            titles::STOCK_UPDATED,
            &format!("Added {quantity} units to {}", item.name()),
            ctx.now(),
        );
        tracing::info!(item_id = %id, quantity, quantity_after = item.quantity(), "stock in");
        self.publish_pending();
        Ok(item)
    }

    pub fn delete_items(&mut self, ctx: &CallContext, ids: &[ItemId]) -> ServiceResult<Vec<Item>> {
        self.authorize(ctx, Operation::DeleteItems)?;
        let removed = self.registry.delete_items(ids, ctx.now())?;
        tracing::info!(count = removed.len(), staff = %ctx.staff_name(), "items deleted");
        self.publish_pending();
        Ok(removed)
    }

    pub fn item(&self, ctx: &CallContext, id: &ItemId) -> ServiceResult<Item> {
        self.authorize(ctx, Operation::ViewInventory)?;
        Ok(self.registry.require(id)?.clone())
    }

    /// Every item, in creation order.
    pub fn items(&self, ctx: &CallContext) -> ServiceResult<Vec<Item>> {
        self.authorize(ctx, Operation::ViewInventory)?;
        Ok(self.registry.items().cloned().collect())
    }

    /// Exact barcode lookup. A miss raises a "Scan Error" notification.
    pub fn resolve(&mut self, ctx: &CallContext, barcode: &str) -> ServiceResult<Item> {
        self.authorize(ctx, Operation::ViewInventory)?;
        match self.registry.resolve(barcode) {
            Ok(item) => Ok(item.clone()),
            Err(err) => {
                self.notifications.notify(
                    titles::SCAN_ERROR,
                    &format!("Barcode {barcode} not found in registry."),
                    ctx.now(),
                );
                tracing::warn!(%barcode, "scan miss");
                Err(err.into())
            }
        }
    }

    pub fn search(
        &self,
        ctx: &CallContext,
        query: &str,
        category: Option<&CategoryId>,
    ) -> ServiceResult<Vec<Item>> {
        self.authorize(ctx, Operation::ViewInventory)?;
        let hits: Vec<Item> = self.registry.search(query, category).into_iter().cloned().collect();
        tracing::debug!(%query, hits = hits.len(), "inventory search");
        Ok(hits)
    }

    pub fn bulk_intake(
        &mut self,
        ctx: &CallContext,
        warehouse_id: WarehouseId,
        category_id: CategoryId,
        rows: &[BulkRow],
    ) -> ServiceResult<Vec<ItemId>> {
        self.authorize(ctx, Operation::BulkIntake)?;
        let created =
            self.registry
                .bulk_intake(&self.catalog, warehouse_id, category_id, rows, ctx.now())?;
        let hub = self
            .catalog
            .warehouse(&warehouse_id)
            .map(|w| w.name.clone())
            .unwrap_or_default();
        self.notifications.notify(
            titles::BATCH_SUCCESSFUL,
            &format!("Provisioned {} new SKUs to {hub}", created.len()),
            ctx.now(),
        );
        tracing::info!(
            %warehouse_id,
            rows = rows.len(),
            created = created.len(),
            "bulk intake"
        );
        self.publish_pending();
        Ok(created)
    }

    // ── Workflow ────────────────────────────────────────────────────────────

    pub fn propose_stock_out(
        &mut self,
        ctx: &CallContext,
        item_id: ItemId,
        quantity: i64,
    ) -> ServiceResult<StockTransaction> {
        self.authorize(ctx, Operation::ProposeStockOut)?;
        let tx = self
            .workflow()
            .propose_stock_out(item_id, quantity, ctx.staff_name(), ctx.now())?;
        tracing::info!(transaction_id = %tx.id_typed(), %item_id, quantity, "stock-out proposed");
        self.publish_pending();
        Ok(tx)
    }

    pub fn propose_transfer(
        &mut self,
        ctx: &CallContext,
        item_id: ItemId,
        target_warehouse_id: WarehouseId,
        quantity: i64,
    ) -> ServiceResult<StockTransaction> {
        self.authorize(ctx, Operation::ProposeTransfer)?;
        let tx = self.workflow().propose_transfer(
            item_id,
            target_warehouse_id,
            quantity,
            ctx.staff_name(),
            ctx.now(),
        )?;
        tracing::info!(
            transaction_id = %tx.id_typed(),
            %item_id,
            target = %target_warehouse_id,
            quantity,
            "transfer proposed"
        );
        self.publish_pending();
        Ok(tx)
    }

    pub fn bulk_relocate(
        &mut self,
        ctx: &CallContext,
        item_ids: &[ItemId],
        target_warehouse_id: WarehouseId,
    ) -> ServiceResult<Vec<StockTransaction>> {
        self.authorize(ctx, Operation::BulkRelocate)?;
        let proposed = self.workflow().bulk_relocate(
            item_ids,
            target_warehouse_id,
            ctx.staff_name(),
            ctx.now(),
        )?;
        tracing::info!(
            target = %target_warehouse_id,
            requested = item_ids.len(),
            proposed = proposed.len(),
            "bulk relocate"
        );
        self.publish_pending();
        Ok(proposed)
    }

    pub fn approve(&mut self, ctx: &CallContext, id: TransactionId) -> ServiceResult<ApprovalOutcome> {
        self.authorize(ctx, Operation::ResolveTransaction)?;
        let outcome = self.workflow().approve(id, ctx.now()).inspect_err(|err| {
            tracing::warn!(transaction_id = %id, error = %err, "approval refused");
        })?;
        self.publish_pending();
        Ok(outcome)
    }

    pub fn reject(
        &mut self,
        ctx: &CallContext,
        id: TransactionId,
        reason: &str,
    ) -> ServiceResult<StockTransaction> {
        self.authorize(ctx, Operation::ResolveTransaction)?;
        let tx = self.workflow().reject(id, reason, ctx.now()).inspect_err(|err| {
            tracing::warn!(transaction_id = %id, error = %err, "rejection refused");
        })?;
        self.publish_pending();
        Ok(tx)
    }

    pub fn pending(&self, ctx: &CallContext) -> ServiceResult<Vec<StockTransaction>> {
        self.authorize(ctx, Operation::ViewApprovals)?;
        Ok(self.ledger.pending().cloned().collect())
    }

    pub fn history(&self, ctx: &CallContext) -> ServiceResult<Vec<StockTransaction>> {
        self.authorize(ctx, Operation::ViewApprovals)?;
        Ok(self.ledger.history().cloned().collect())
    }

    /// PENDING transactions older than the configured threshold.
    pub fn stale_pending(&self, ctx: &CallContext) -> ServiceResult<Vec<StockTransaction>> {
        self.authorize(ctx, Operation::ViewApprovals)?;
        let max_age = self.config.workflow.stale_pending_after();
        let stale: Vec<StockTransaction> = self
            .ledger
            .stale_pending(ctx.now(), max_age)
            .into_iter()
            .cloned()
            .collect();
        if !stale.is_empty() {
            tracing::warn!(count = stale.len(), "stale pending transactions");
        }
        Ok(stale)
    }

    fn workflow(&mut self) -> ApprovalWorkflow<'_, NotificationFeed> {
        ApprovalWorkflow::new(
            &self.catalog,
            &mut self.registry,
            &mut self.ledger,
            &mut self.notifications,
        )
    }

    // ── Access control ──────────────────────────────────────────────────────

    pub fn grant(
        &mut self,
        ctx: &CallContext,
        role: Role,
        module: ModuleId,
        action: Action,
    ) -> ServiceResult<()> {
        self.authorize(ctx, Operation::ManagePermissions)?;
        self.permissions.grant(role, module, action);
        tracing::info!(%role, %module, %action, by = %ctx.staff_name(), "permission granted");
        Ok(())
    }

    pub fn revoke(
        &mut self,
        ctx: &CallContext,
        role: Role,
        module: ModuleId,
        action: Action,
    ) -> ServiceResult<()> {
        self.authorize(ctx, Operation::ManagePermissions)?;
        self.permissions.revoke(role, module, action);
        tracing::info!(%role, %module, %action, by = %ctx.staff_name(), "permission revoked");
        Ok(())
    }

    /// Returns whether the permission is held afterwards.
    pub fn toggle(
        &mut self,
        ctx: &CallContext,
        role: Role,
        module: ModuleId,
        action: Action,
    ) -> ServiceResult<bool> {
        self.authorize(ctx, Operation::ManagePermissions)?;
        let granted = self.permissions.toggle(role, module, action);
        tracing::info!(%role, %module, %action, granted, by = %ctx.staff_name(), "permission toggled");
        Ok(granted)
    }

    pub fn permissions(&self, ctx: &CallContext, role: Role) -> ServiceResult<Vec<Permission>> {
        self.authorize(ctx, Operation::ViewPermissions)?;
        Ok(self.permissions.permissions(role))
    }

    pub fn explain(
        &self,
        ctx: &CallContext,
        role: Role,
        required: Requirement,
    ) -> ServiceResult<AuthorizationExplanation> {
        self.authorize(ctx, Operation::ViewPermissions)?;
        Ok(explain_authorization(&self.permissions, role, required))
    }

    // ── Reports ─────────────────────────────────────────────────────────────

    pub fn dashboard(&self, ctx: &CallContext) -> ServiceResult<DashboardSummary> {
        self.authorize(ctx, Operation::ViewDashboard)?;
        Ok(projections::dashboard_summary(
            &self.catalog,
            self.registry.items(),
            self.ledger.transactions(),
        ))
    }

    pub fn warehouse_valuation(&self, ctx: &CallContext) -> ServiceResult<Vec<WarehouseValuation>> {
        self.authorize(ctx, Operation::ViewReports)?;
        Ok(projections::warehouse_valuation(&self.catalog, self.registry.items()))
    }

    pub fn aging_summary(&self, ctx: &CallContext) -> ServiceResult<AgingSummary> {
        self.authorize(ctx, Operation::ViewReports)?;
        Ok(projections::aging_summary(self.registry.items(), &self.config.reports))
    }

    pub fn risk_manifest(&self, ctx: &CallContext) -> ServiceResult<Vec<RiskEntry>> {
        self.authorize(ctx, Operation::ViewReports)?;
        Ok(projections::risk_manifest(
            self.registry.items(),
            self.ledger.transactions(),
            ctx.now(),
            &self.config.reports,
        ))
    }

    pub fn snapshot(&self, ctx: &CallContext) -> ServiceResult<Snapshot> {
        self.authorize(ctx, Operation::ExportSnapshot)?;
        Ok(Snapshot {
            taken_at: ctx.now(),
            warehouses: self.catalog.warehouses().to_vec(),
            categories: self.catalog.categories().to_vec(),
            items: self.registry.items().cloned().collect(),
            transactions: self.ledger.transactions().to_vec(),
        })
    }

    // ── Notifications (every signed-in user sees the feed) ─────────────────

    /// Newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.list().cloned().collect()
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.unread_count()
    }

    pub fn mark_read(&mut self, id: &NotificationId) -> ServiceResult<()> {
        self.notifications.mark_read(id)?;
        Ok(())
    }

    pub fn mark_all_read(&mut self) -> usize {
        self.notifications.mark_all_read()
    }

    // ── Event publication ───────────────────────────────────────────────────

    /// Drain both outboxes onto the bus, item events first.
    ///
    /// Runs after the mutation has been committed, so a failure here is
    /// logged and never rolls anything back.
    fn publish_pending(&mut self) {
        for event in self.registry.take_events() {
            let aggregate_id = event.item_id().to_string();
            self.publish(aggregate_id, ITEM_AGGREGATE, &event);
        }
        for event in self.ledger.take_events() {
            let aggregate_id = event.transaction_id().to_string();
            self.publish(aggregate_id, TRANSACTION_AGGREGATE, &event);
        }
    }

    fn publish<E>(&mut self, aggregate_id: String, aggregate_type: &str, event: &E)
    where
        E: Event + serde::Serialize,
    {
        let sequence = self.sequence + 1;
        let envelope = match EventEnvelope::from_typed(aggregate_id, aggregate_type, sequence, event) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::error!(event_type = event.event_type(), error = %err, "failed to encode event");
                return;
            }
        };
        self.sequence = sequence;
        if let Err(err) = self.bus.publish(envelope) {
            tracing::error!(event_type = event.event_type(), error = ?err, "failed to publish event");
        }
    }
}
