//! Inventory valuation read models.
//!
//! Value is always `quantity × true unit cost`, the landed-cost basis cached
//! on each item. Shares are percentages of the global value and are zero
//! when nothing is valued.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use nexus_catalog::CatalogStore;
use nexus_core::WarehouseId;
use nexus_inventory::{Item, ItemStatus};
use nexus_workflow::{StockTransaction, TransactionStatus};

use crate::config::ReportConfig;

/// Per-warehouse valuation row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarehouseValuation {
    pub warehouse_id: WarehouseId,
    /// `None` for items whose warehouse has been removed from the catalog.
    pub name: Option<String>,
    pub prefix: Option<String>,
    pub item_count: usize,
    pub total_quantity: i64,
    pub value: Decimal,
    pub share_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgingSummary {
    pub item_count: usize,
    pub value: Decimal,
    pub share_percent: Decimal,
    pub recovery_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: ItemStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_value: Decimal,
    pub aging_value: Decimal,
    pub item_count: usize,
    pub total_quantity: i64,
    pub pending_transactions: usize,
    pub by_status: Vec<StatusCount>,
    pub by_warehouse: Vec<WarehouseValuation>,
}

pub fn total_value<'a>(items: impl IntoIterator<Item = &'a Item>) -> Decimal {
    items.into_iter().map(Item::stock_value).sum()
}

fn share_percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * Decimal::ONE_HUNDRED
    }
}

/// Valuation of every warehouse, highest value first.
///
/// Catalog warehouses appear even when empty. Items pointing at a removed
/// warehouse are grouped into an unnamed row per dangling id.
pub fn warehouse_valuation<'a>(
    catalog: &CatalogStore,
    items: impl IntoIterator<Item = &'a Item>,
) -> Vec<WarehouseValuation> {
    let items: Vec<&Item> = items.into_iter().collect();
    let global = total_value(items.iter().copied());

    let mut rows: Vec<WarehouseValuation> = catalog
        .warehouses()
        .iter()
        .map(|w| WarehouseValuation {
            warehouse_id: w.id,
            name: Some(w.name.clone()),
            prefix: Some(w.prefix.clone()),
            item_count: 0,
            total_quantity: 0,
            value: Decimal::ZERO,
            share_percent: Decimal::ZERO,
        })
        .collect();

    let mut dangling: BTreeMap<WarehouseId, WarehouseValuation> = BTreeMap::new();
    for item in &items {
        let row = match rows.iter_mut().find(|r| r.warehouse_id == item.warehouse_id()) {
            Some(row) => row,
            None => dangling
                .entry(item.warehouse_id())
                .or_insert_with(|| WarehouseValuation {
                    warehouse_id: item.warehouse_id(),
                    name: None,
                    prefix: None,
                    item_count: 0,
                    total_quantity: 0,
                    value: Decimal::ZERO,
                    share_percent: Decimal::ZERO,
                }),
        };
        row.item_count += 1;
        row.total_quantity += item.quantity();
        row.value += item.stock_value();
    }
    rows.extend(dangling.into_values());

    for row in &mut rows {
        row.share_percent = share_percent(row.value, global);
    }
    // Stable sort keeps catalog order among equal values.
    rows.sort_by(|a, b| b.value.cmp(&a.value));
    rows
}

/// OLD_USED stock and its expected recovery value.
pub fn aging_summary<'a>(
    items: impl IntoIterator<Item = &'a Item>,
    config: &ReportConfig,
) -> AgingSummary {
    let items: Vec<&Item> = items.into_iter().collect();
    let global = total_value(items.iter().copied());
    let aging: Vec<&Item> = items
        .into_iter()
        .filter(|i| i.status() == ItemStatus::OldUsed)
        .collect();
    let value = total_value(aging.iter().copied());

    AgingSummary {
        item_count: aging.len(),
        value,
        share_percent: share_percent(value, global),
        recovery_value: value * config.aging_recovery_rate,
    }
}

pub fn dashboard_summary<'a>(
    catalog: &CatalogStore,
    items: impl IntoIterator<Item = &'a Item>,
    transactions: impl IntoIterator<Item = &'a StockTransaction>,
) -> DashboardSummary {
    let items: Vec<&Item> = items.into_iter().collect();
    let by_status = ItemStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: items.iter().filter(|i| i.status() == *status).count(),
        })
        .collect();

    DashboardSummary {
        total_value: total_value(items.iter().copied()),
        aging_value: total_value(
            items
                .iter()
                .copied()
                .filter(|i| i.status() == ItemStatus::OldUsed),
        ),
        item_count: items.len(),
        total_quantity: items.iter().map(|i| i.quantity()).sum(),
        pending_transactions: transactions
            .into_iter()
            .filter(|tx| tx.status() == TransactionStatus::Pending)
            .count(),
        by_status,
        by_warehouse: warehouse_valuation(catalog, items.iter().copied()),
    }
}
