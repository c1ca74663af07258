use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nexus_core::NotificationId;

/// Titles used by the ledger and workflow.
pub mod titles {
    pub const APPROVAL_REQUIRED: &str = "Approval Required";
    pub const TRANSFER_PENDING: &str = "Transfer Pending";
    pub const TRANSACTION_APPROVED: &str = "Transaction Approved";
    pub const TRANSACTION_REJECTED: &str = "Transaction Rejected";
    pub const STOCK_UPDATED: &str = "Stock Updated";
    pub const BATCH_SUCCESSFUL: &str = "Batch Successful";
    pub const SCAN_ERROR: &str = "Scan Error";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: NotificationId::new(),
            title: title.into(),
            message: message.into(),
            read: false,
            timestamp: at,
        }
    }
}
