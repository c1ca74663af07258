//! Stock risk manifest: days of cover per item from recent outbound demand.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use nexus_core::{ItemId, WarehouseId};
use nexus_inventory::Item;
use nexus_workflow::{StockTransaction, TransactionStatus, TransactionType};

use crate::config::ReportConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Critical,
    Warning,
    Stable,
}

/// Days of stock left at the current demand rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "days")]
pub enum DaysRemaining {
    Days(i64),
    /// No demand in the window.
    Unbounded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskEntry {
    pub item_id: ItemId,
    pub name: String,
    pub barcode: String,
    pub warehouse_id: WarehouseId,
    pub quantity: i64,
    /// Approved stock-out units inside the demand window.
    pub window_demand: i64,
    pub days_remaining: DaysRemaining,
    pub level: RiskLevel,
}

pub fn classify(quantity: i64, days: DaysRemaining, config: &ReportConfig) -> RiskLevel {
    let within = |limit: i64| matches!(days, DaysRemaining::Days(d) if d <= limit);
    if within(config.critical_days) || quantity < config.critical_quantity {
        RiskLevel::Critical
    } else if within(config.warning_days) || quantity < config.warning_quantity {
        RiskLevel::Warning
    } else {
        RiskLevel::Stable
    }
}

/// `⌊quantity / (demand / window)⌋`, computed in integers.
///
/// The product is taken in `i128`; a result beyond `i64` clamps to `i64::MAX`.
pub fn days_remaining(quantity: i64, window_demand: i64, window_days: i64) -> DaysRemaining {
    if window_demand <= 0 {
        return DaysRemaining::Unbounded;
    }
    let days = i128::from(quantity.max(0)) * i128::from(window_days) / i128::from(window_demand);
    DaysRemaining::Days(i64::try_from(days).unwrap_or(i64::MAX))
}

/// At-risk items (CRITICAL or WARNING), fewest days first, unbounded last.
pub fn risk_manifest<'a>(
    items: impl IntoIterator<Item = &'a Item>,
    transactions: impl IntoIterator<Item = &'a StockTransaction>,
    now: DateTime<Utc>,
    config: &ReportConfig,
) -> Vec<RiskEntry> {
    let window_start = TimeDelta::try_days(config.demand_window_days)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let outbound: Vec<&StockTransaction> = transactions
        .into_iter()
        .filter(|tx| {
            tx.kind() == TransactionType::StockOut
                && tx.status() == TransactionStatus::Approved
                && tx.resolved_at().unwrap_or(tx.timestamp()) >= window_start
        })
        .collect();

    let mut entries: Vec<RiskEntry> = items
        .into_iter()
        .filter_map(|item| {
            let window_demand: i64 = outbound
                .iter()
                .filter(|tx| tx.item_id() == item.id_typed())
                .fold(0i64, |total, tx| total.saturating_add(tx.quantity()));
            let days = days_remaining(item.quantity(), window_demand, config.demand_window_days);
            let level = classify(item.quantity(), days, config);
            (level != RiskLevel::Stable).then(|| RiskEntry {
                item_id: item.id_typed(),
                name: item.name().to_string(),
                barcode: item.barcode().to_string(),
                warehouse_id: item.warehouse_id(),
                quantity: item.quantity(),
                window_demand,
                days_remaining: days,
                level,
            })
        })
        .collect();

    entries.sort_by_key(|e| e.days_remaining);
    entries
}
