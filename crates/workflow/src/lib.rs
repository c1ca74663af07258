//! `nexus-workflow`: the gatekeeper for outbound and transfer movements.
//!
//! Stock-outs and transfers are proposed into the [`TransactionLedger`] and
//! only touch the item registry when the [`ApprovalWorkflow`] approves them.

pub mod approval;
pub mod ledger;
pub mod transaction;

pub use approval::{ApprovalOutcome, ApprovalWorkflow, StockEffect};
pub use ledger::TransactionLedger;
pub use transaction::{
    Approve, ProposeStockOut, ProposeTransfer, Reject, StockTransaction, TransactionApproved,
    TransactionCommand, TransactionEvent, TransactionProposed, TransactionRejected,
    TransactionStatus, TransactionType,
};
