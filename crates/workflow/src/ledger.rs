//! Transaction Ledger: proposals and their lifecycle, in proposal order.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use nexus_catalog::CatalogStore;
use nexus_core::{Aggregate, DomainError, DomainResult, ItemId, TransactionId, WarehouseId};
use nexus_inventory::ItemRegistry;

use crate::transaction::{
    ProposeStockOut, ProposeTransfer, StockTransaction, TransactionCommand, TransactionEvent,
};

#[derive(Debug, Default)]
pub struct TransactionLedger {
    transactions: Vec<StockTransaction>,
    index: HashMap<TransactionId, usize>,
    outbox: Vec<TransactionEvent>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a PENDING stock-out. Stock on hand is not checked here; the
    /// authoritative check happens at approval.
    pub fn propose_stock_out(
        &mut self,
        registry: &ItemRegistry,
        item_id: ItemId,
        quantity: i64,
        staff_name: &str,
        at: DateTime<Utc>,
    ) -> DomainResult<&StockTransaction> {
        let item = registry.require(&item_id)?;
        let transaction_id = TransactionId::new();
        self.record(TransactionCommand::ProposeStockOut(ProposeStockOut {
            transaction_id,
            item_id,
            warehouse_id: item.warehouse_id(),
            quantity,
            staff_name: staff_name.to_string(),
            occurred_at: at,
        }))
    }

    /// Record a PENDING transfer to an existing warehouse other than the
    /// item's current one.
    #[allow(clippy::too_many_arguments)]
    pub fn propose_transfer(
        &mut self,
        catalog: &CatalogStore,
        registry: &ItemRegistry,
        item_id: ItemId,
        target_warehouse_id: WarehouseId,
        quantity: i64,
        staff_name: &str,
        at: DateTime<Utc>,
    ) -> DomainResult<&StockTransaction> {
        let item = registry.require(&item_id)?;
        catalog.require_warehouse(&target_warehouse_id)?;
        let transaction_id = TransactionId::new();
        self.record(TransactionCommand::ProposeTransfer(ProposeTransfer {
            transaction_id,
            item_id,
            warehouse_id: item.warehouse_id(),
            target_warehouse_id,
            quantity,
            staff_name: staff_name.to_string(),
            occurred_at: at,
        }))
    }

    pub fn get(&self, id: &TransactionId) -> Option<&StockTransaction> {
        self.index.get(id).map(|&idx| &self.transactions[idx])
    }

    pub fn require(&self, id: &TransactionId) -> DomainResult<&StockTransaction> {
        self.get(id)
            .ok_or_else(|| DomainError::not_found(format!("transaction {id}")))
    }

    /// Every transaction, in proposal order.
    pub fn transactions(&self) -> &[StockTransaction] {
        &self.transactions
    }

    pub fn pending(&self) -> impl Iterator<Item = &StockTransaction> {
        self.transactions.iter().filter(|tx| tx.is_pending())
    }

    /// Resolved (approved or rejected) transactions.
    pub fn history(&self) -> impl Iterator<Item = &StockTransaction> {
        self.transactions.iter().filter(|tx| !tx.is_pending())
    }

    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    /// PENDING transactions older than `max_age` at `now`, oldest first.
    ///
    /// Read-only: nothing expires on its own.
    pub fn stale_pending(&self, now: DateTime<Utc>, max_age: Duration) -> Vec<&StockTransaction> {
        let mut stale: Vec<&StockTransaction> = self
            .pending()
            .filter(|tx| now - tx.timestamp() > max_age)
            .collect();
        stale.sort_by_key(|tx| tx.timestamp());
        stale
    }

    pub fn take_events(&mut self) -> Vec<TransactionEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Decide a command against a stored transaction without applying it.
    pub(crate) fn check(
        &self,
        id: &TransactionId,
        command: &TransactionCommand,
    ) -> DomainResult<Vec<TransactionEvent>> {
        self.require(id)?.handle(command)
    }

    /// Decide and apply a command against a stored transaction.
    pub(crate) fn execute(
        &mut self,
        id: &TransactionId,
        command: &TransactionCommand,
    ) -> DomainResult<&StockTransaction> {
        let idx = *self
            .index
            .get(id)
            .ok_or_else(|| DomainError::not_found(format!("transaction {id}")))?;
        let events = self.transactions[idx].execute(command)?;
        self.outbox.extend(events);
        Ok(&self.transactions[idx])
    }

    fn record(&mut self, command: TransactionCommand) -> DomainResult<&StockTransaction> {
        let id = match &command {
            TransactionCommand::ProposeStockOut(cmd) => cmd.transaction_id,
            TransactionCommand::ProposeTransfer(cmd) => cmd.transaction_id,
            TransactionCommand::Approve(cmd) => cmd.transaction_id,
            TransactionCommand::Reject(cmd) => cmd.transaction_id,
        };
        let mut tx = StockTransaction::empty(id);
        let events = tx.execute(&command)?;

        let idx = self.transactions.len();
        self.transactions.push(tx);
        self.index.insert(id, idx);
        self.outbox.extend(events);
        Ok(&self.transactions[idx])
    }
}
