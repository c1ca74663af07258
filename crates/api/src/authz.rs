//! Operation gates at the service boundary.
//!
//! Authorization is enforced before any component is touched, which keeps
//! the aggregates and registries permission-agnostic.

use nexus_auth::{Action, AuthzError, ModuleId, Requirement, RolePermissionMap, authorize};

use crate::context::CallContext;

/// Every gated entry point of the service facade.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    AddWarehouse,
    RemoveWarehouse,
    AddCategory,
    RemoveCategory,
    CreateItem,
    UpdateItem,
    StockIn,
    ProposeStockOut,
    ProposeTransfer,
    BulkRelocate,
    DeleteItems,
    ViewInventory,
    QuoteUnitCost,
    ValuationIntake,
    BulkIntake,
    ResolveTransaction,
    ViewApprovals,
    ManagePermissions,
    ViewPermissions,
    ViewDashboard,
    ViewReports,
    ExportSnapshot,
}

impl Operation {
    pub const fn requirement(self) -> Requirement {
        use Action::*;
        use ModuleId::*;
        match self {
            Operation::AddWarehouse => Requirement::new(Warehouses, Update),
            Operation::RemoveWarehouse => Requirement::new(Warehouses, Delete),
            Operation::AddCategory => Requirement::new(CategoryMgmt, Update),
            Operation::RemoveCategory => Requirement::new(CategoryMgmt, Delete),
            Operation::CreateItem
            | Operation::UpdateItem
            | Operation::StockIn
            | Operation::ProposeStockOut
            | Operation::ProposeTransfer
            | Operation::BulkRelocate => Requirement::new(Inventory, Update),
            Operation::DeleteItems => Requirement::new(Inventory, Delete),
            Operation::ViewInventory => Requirement::new(Inventory, View),
            Operation::QuoteUnitCost => Requirement::new(Valuation, View),
            Operation::ValuationIntake => Requirement::new(Valuation, Update),
            Operation::BulkIntake => Requirement::new(BulkUpload, Update),
            Operation::ResolveTransaction => Requirement::new(Approvals, Update),
            Operation::ViewApprovals => Requirement::new(Approvals, View),
            Operation::ManagePermissions => Requirement::new(AccessControl, Update),
            Operation::ViewPermissions => Requirement::new(AccessControl, View),
            Operation::ViewDashboard => Requirement::new(Dashboard, View),
            Operation::ViewReports => Requirement::new(Reports, View),
            Operation::ExportSnapshot => Requirement::new(Reports, Export),
        }
    }
}

/// Check an operation for the caller. Denials are logged.
pub fn authorize_operation(
    matrix: &RolePermissionMap,
    ctx: &CallContext,
    op: Operation,
) -> Result<(), AuthzError> {
    let required = op.requirement();
    authorize(matrix, ctx.principal(), required).inspect_err(|_| {
        tracing::warn!(
            staff = %ctx.staff_name(),
            role = %ctx.role(),
            operation = ?op,
            %required,
            "permission denied"
        );
    })
}
