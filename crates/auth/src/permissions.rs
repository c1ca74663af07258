//! Modules, actions and permission records.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use nexus_core::DomainError;

/// Functional area of the system that permissions are scoped to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleId {
    Dashboard,
    Inventory,
    Warehouses,
    Approvals,
    Valuation,
    Reports,
    CategoryMgmt,
    AccessControl,
    BulkUpload,
}

impl ModuleId {
    /// Every module, in display order.
    pub const ALL: [ModuleId; 9] = [
        ModuleId::Dashboard,
        ModuleId::Inventory,
        ModuleId::Warehouses,
        ModuleId::Approvals,
        ModuleId::Valuation,
        ModuleId::Reports,
        ModuleId::CategoryMgmt,
        ModuleId::AccessControl,
        ModuleId::BulkUpload,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleId::Dashboard => "dashboard",
            ModuleId::Inventory => "inventory",
            ModuleId::Warehouses => "warehouses",
            ModuleId::Approvals => "approvals",
            ModuleId::Valuation => "valuation",
            ModuleId::Reports => "reports",
            ModuleId::CategoryMgmt => "category-mgmt",
            ModuleId::AccessControl => "access-control",
            ModuleId::BulkUpload => "bulk-upload",
        }
    }
}

impl core::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModuleId::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown module '{s}'")))
    }
}

/// Action that can be granted on a module.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Update,
    Delete,
    Export,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::View, Action::Update, Action::Delete, Action::Export];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Export => "export",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Action::View => 0b0001,
            Action::Update => 0b0010,
            Action::Delete => 0b0100,
            Action::Export => 0b1000,
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown action '{s}'")))
    }
}

/// Set of actions granted on a single module (bitset).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct ActionSet(u8);

impl ActionSet {
    pub const EMPTY: ActionSet = ActionSet(0);
    pub const ALL: ActionSet = ActionSet(0b1111);

    pub fn of(actions: &[Action]) -> Self {
        actions.iter().copied().collect()
    }

    pub fn contains(&self, action: Action) -> bool {
        self.0 & action.bit() != 0
    }

    pub fn insert(&mut self, action: Action) {
        self.0 |= action.bit();
    }

    pub fn remove(&mut self, action: Action) {
        self.0 &= !action.bit();
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Granted actions in canonical order.
    pub fn actions(&self) -> Vec<Action> {
        Action::ALL.into_iter().filter(|a| self.contains(*a)).collect()
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut set = ActionSet::EMPTY;
        for action in iter {
            set.insert(action);
        }
        set
    }
}

/// A module and the actions granted on it (display/seed record).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub module_id: ModuleId,
    pub actions: Vec<Action>,
}

impl Permission {
    pub fn new(module_id: ModuleId, actions: &[Action]) -> Self {
        Self {
            module_id,
            actions: ActionSet::of(actions).actions(),
        }
    }
}
