use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nexus_core::{
    Aggregate, AggregateRoot, DomainError, DomainResult, ItemId, TransactionId, WarehouseId,
};
use nexus_events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    StockOut,
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::StockOut => "STOCK_OUT",
            TransactionType::Transfer => "TRANSFER",
        }
    }
}

impl core::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PENDING → APPROVED | REJECTED. Both resolutions are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Rejected,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Approved => "APPROVED",
            TransactionStatus::Rejected => "REJECTED",
        }
    }
}

/// Aggregate root: a proposed stock-out or transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockTransaction {
    id: TransactionId,
    #[serde(rename = "type")]
    kind: TransactionType,
    item_id: ItemId,
    warehouse_id: WarehouseId,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_warehouse_id: Option<WarehouseId>,
    quantity: i64,
    status: TransactionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejection_reason: Option<String>,
    staff_name: String,
    timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    version: u64,
    #[serde(skip)]
    created: bool,
}

impl StockTransaction {
    pub fn empty(id: TransactionId) -> Self {
        Self {
            id,
            kind: TransactionType::StockOut,
            item_id: ItemId::from_sequence(0),
            warehouse_id: WarehouseId::from_uuid(Default::default()),
            target_warehouse_id: None,
            quantity: 0,
            status: TransactionStatus::Pending,
            rejection_reason: None,
            staff_name: String::new(),
            timestamp: DateTime::<Utc>::MIN_UTC,
            resolved_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> TransactionId {
        self.id
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn warehouse_id(&self) -> WarehouseId {
        self.warehouse_id
    }

    pub fn target_warehouse_id(&self) -> Option<WarehouseId> {
        self.target_warehouse_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn staff_name(&self) -> &str {
        &self.staff_name
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }
}

impl AggregateRoot for StockTransaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: ProposeStockOut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposeStockOut {
    pub transaction_id: TransactionId,
    pub item_id: ItemId,
    pub warehouse_id: WarehouseId,
    pub quantity: i64,
    pub staff_name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ProposeTransfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposeTransfer {
    pub transaction_id: TransactionId,
    pub item_id: ItemId,
    pub warehouse_id: WarehouseId,
    pub target_warehouse_id: WarehouseId,
    pub quantity: i64,
    pub staff_name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Approve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approve {
    pub transaction_id: TransactionId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Reject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reject {
    pub transaction_id: TransactionId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionCommand {
    ProposeStockOut(ProposeStockOut),
    ProposeTransfer(ProposeTransfer),
    Approve(Approve),
    Reject(Reject),
}

/// Event: TransactionProposed (both kinds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionProposed {
    pub transaction_id: TransactionId,
    pub kind: TransactionType,
    pub item_id: ItemId,
    pub warehouse_id: WarehouseId,
    pub target_warehouse_id: Option<WarehouseId>,
    pub quantity: i64,
    pub staff_name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TransactionApproved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionApproved {
    pub transaction_id: TransactionId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TransactionRejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRejected {
    pub transaction_id: TransactionId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionEvent {
    TransactionProposed(TransactionProposed),
    TransactionApproved(TransactionApproved),
    TransactionRejected(TransactionRejected),
}

impl TransactionEvent {
    pub fn transaction_id(&self) -> TransactionId {
        match self {
            TransactionEvent::TransactionProposed(e) => e.transaction_id,
            TransactionEvent::TransactionApproved(e) => e.transaction_id,
            TransactionEvent::TransactionRejected(e) => e.transaction_id,
        }
    }
}

impl Event for TransactionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TransactionEvent::TransactionProposed(_) => "workflow.transaction.proposed",
            TransactionEvent::TransactionApproved(_) => "workflow.transaction.approved",
            TransactionEvent::TransactionRejected(_) => "workflow.transaction.rejected",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            TransactionEvent::TransactionProposed(e) => e.occurred_at,
            TransactionEvent::TransactionApproved(e) => e.occurred_at,
            TransactionEvent::TransactionRejected(e) => e.occurred_at,
        }
    }
}

impl Aggregate for StockTransaction {
    type Command = TransactionCommand;
    type Event = TransactionEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            TransactionEvent::TransactionProposed(e) => {
                self.id = e.transaction_id;
                self.kind = e.kind;
                self.item_id = e.item_id;
                self.warehouse_id = e.warehouse_id;
                self.target_warehouse_id = e.target_warehouse_id;
                self.quantity = e.quantity;
                self.staff_name = e.staff_name.clone();
                self.timestamp = e.occurred_at;
                self.status = TransactionStatus::Pending;
                self.created = true;
            }
            TransactionEvent::TransactionApproved(e) => {
                self.status = TransactionStatus::Approved;
                self.resolved_at = Some(e.occurred_at);
            }
            TransactionEvent::TransactionRejected(e) => {
                self.status = TransactionStatus::Rejected;
                self.rejection_reason = Some(e.reason.clone());
                self.resolved_at = Some(e.occurred_at);
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            TransactionCommand::ProposeStockOut(cmd) => {
                self.ensure_new(cmd.transaction_id)?;
                validate_proposal(cmd.quantity, &cmd.staff_name)?;
                Ok(vec![TransactionEvent::TransactionProposed(
                    TransactionProposed {
                        transaction_id: cmd.transaction_id,
                        kind: TransactionType::StockOut,
                        item_id: cmd.item_id,
                        warehouse_id: cmd.warehouse_id,
                        target_warehouse_id: None,
                        quantity: cmd.quantity,
                        staff_name: cmd.staff_name.trim().to_string(),
                        occurred_at: cmd.occurred_at,
                    },
                )])
            }
            TransactionCommand::ProposeTransfer(cmd) => {
                self.ensure_new(cmd.transaction_id)?;
                validate_proposal(cmd.quantity, &cmd.staff_name)?;
                if cmd.target_warehouse_id == cmd.warehouse_id {
                    return Err(DomainError::validation(
                        "target warehouse must differ from the source warehouse",
                    ));
                }
                Ok(vec![TransactionEvent::TransactionProposed(
                    TransactionProposed {
                        transaction_id: cmd.transaction_id,
                        kind: TransactionType::Transfer,
                        item_id: cmd.item_id,
                        warehouse_id: cmd.warehouse_id,
                        target_warehouse_id: Some(cmd.target_warehouse_id),
                        quantity: cmd.quantity,
                        staff_name: cmd.staff_name.trim().to_string(),
                        occurred_at: cmd.occurred_at,
                    },
                )])
            }
            TransactionCommand::Approve(cmd) => {
                self.ensure_pending(cmd.transaction_id)?;
                Ok(vec![TransactionEvent::TransactionApproved(
                    TransactionApproved {
                        transaction_id: cmd.transaction_id,
                        occurred_at: cmd.occurred_at,
                    },
                )])
            }
            TransactionCommand::Reject(cmd) => {
                self.ensure_pending(cmd.transaction_id)?;
                let reason = cmd.reason.trim();
                if reason.is_empty() {
                    return Err(DomainError::validation("rejection reason is required"));
                }
                Ok(vec![TransactionEvent::TransactionRejected(
                    TransactionRejected {
                        transaction_id: cmd.transaction_id,
                        reason: reason.to_string(),
                        occurred_at: cmd.occurred_at,
                    },
                )])
            }
        }
    }
}

impl StockTransaction {
    fn ensure_new(&self, transaction_id: TransactionId) -> DomainResult<()> {
        if self.created {
            return Err(DomainError::invalid_state(format!(
                "transaction {transaction_id} already exists"
            )));
        }
        Ok(())
    }

    fn ensure_pending(&self, transaction_id: TransactionId) -> DomainResult<()> {
        if !self.created {
            return Err(DomainError::not_found(format!("transaction {transaction_id}")));
        }
        if self.id != transaction_id {
            return Err(DomainError::validation("transaction_id mismatch"));
        }
        if self.status.is_terminal() {
            return Err(DomainError::invalid_state(format!(
                "transaction {transaction_id} is already {}",
                self.status.as_str()
            )));
        }
        Ok(())
    }
}

fn validate_proposal(quantity: i64, staff_name: &str) -> DomainResult<()> {
    if quantity <= 0 {
        return Err(DomainError::validation("quantity must be greater than zero"));
    }
    if staff_name.trim().is_empty() {
        return Err(DomainError::validation("staff name is required"));
    }
    Ok(())
}
