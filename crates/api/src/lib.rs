//! Service facade: authorization, orchestration and event publication over
//! the ledger components.

pub mod authz;
pub mod context;
pub mod errors;
pub mod service;
pub mod snapshot;

pub use authz::{Operation, authorize_operation};
pub use context::CallContext;
pub use errors::{ServiceError, ServiceResult};
pub use service::{InventoryService, LedgerBus};
pub use snapshot::Snapshot;
