//! Role → module → allowed-actions matrix.
//!
//! Grants are additive and there is no explicit deny: a missing
//! `(role, module)` entry means no access at all.

use std::collections::HashMap;

use crate::permissions::{Action, ActionSet, ModuleId, Permission};
use crate::roles::Role;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePermissionMap {
    grants: HashMap<(Role, ModuleId), ActionSet>,
}

impl RolePermissionMap {
    /// An empty matrix: every check fails closed.
    pub fn new() -> Self {
        Self::default()
    }

    /// The out-of-the-box policy.
    ///
    /// ADMIN holds every action on every module; STAFF can run the
    /// warehouse floor; ACCOUNTANT can read and export reports.
    pub fn with_defaults() -> Self {
        let mut map = Self::new();
        for module in ModuleId::ALL {
            map.set(Role::Admin, module, ActionSet::ALL);
        }

        map.set(Role::Staff, ModuleId::Dashboard, ActionSet::of(&[Action::View]));
        map.set(
            Role::Staff,
            ModuleId::Inventory,
            ActionSet::of(&[Action::View, Action::Update]),
        );
        map.set(
            Role::Staff,
            ModuleId::Valuation,
            ActionSet::of(&[Action::View, Action::Update]),
        );
        map.set(
            Role::Staff,
            ModuleId::BulkUpload,
            ActionSet::of(&[Action::View, Action::Update]),
        );

        map.set(Role::Accountant, ModuleId::Dashboard, ActionSet::of(&[Action::View]));
        map.set(Role::Accountant, ModuleId::Inventory, ActionSet::of(&[Action::View]));
        map.set(
            Role::Accountant,
            ModuleId::Reports,
            ActionSet::of(&[Action::View, Action::Export]),
        );

        map
    }

    /// True iff `role` holds `action` on `module`.
    pub fn can_perform(&self, role: Role, module: ModuleId, action: Action) -> bool {
        self.grants
            .get(&(role, module))
            .is_some_and(|set| set.contains(action))
    }

    /// Actions `role` holds on `module` (empty when there is no entry).
    pub fn actions(&self, role: Role, module: ModuleId) -> ActionSet {
        self.grants.get(&(role, module)).copied().unwrap_or_default()
    }

    /// Whether the role has any entry in the matrix.
    pub fn has_role(&self, role: Role) -> bool {
        self.grants.keys().any(|(r, _)| *r == role)
    }

    /// Add `action` to the role's set for `module`, creating the entry if absent.
    pub fn grant(&mut self, role: Role, module: ModuleId, action: Action) {
        self.grants.entry((role, module)).or_default().insert(action);
    }

    /// Remove `action`; an entry left with no actions is dropped entirely.
    pub fn revoke(&mut self, role: Role, module: ModuleId, action: Action) {
        if let Some(set) = self.grants.get_mut(&(role, module)) {
            set.remove(action);
            if set.is_empty() {
                self.grants.remove(&(role, module));
            }
        }
    }

    /// Flip a single grant. Returns whether the action is granted afterwards.
    pub fn toggle(&mut self, role: Role, module: ModuleId, action: Action) -> bool {
        if self.can_perform(role, module, action) {
            self.revoke(role, module, action);
            false
        } else {
            self.grant(role, module, action);
            true
        }
    }

    /// Replace the role's whole permission list.
    ///
    /// Records with no actions are skipped, so no empty entry is retained.
    pub fn set_permissions(&mut self, role: Role, permissions: &[Permission]) {
        self.grants.retain(|(r, _), _| *r != role);
        for permission in permissions {
            self.set(role, permission.module_id, ActionSet::of(&permission.actions));
        }
    }

    /// The role's permission records, in module order.
    pub fn permissions(&self, role: Role) -> Vec<Permission> {
        ModuleId::ALL
            .into_iter()
            .filter_map(|module| {
                self.grants.get(&(role, module)).map(|set| Permission {
                    module_id: module,
                    actions: set.actions(),
                })
            })
            .collect()
    }

    /// Roles that currently hold `action` on `module`.
    pub fn roles_granting(&self, module: ModuleId, action: Action) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| self.can_perform(*role, module, action))
            .collect()
    }

    fn set(&mut self, role: Role, module: ModuleId, actions: ActionSet) {
        if actions.is_empty() {
            self.grants.remove(&(role, module));
        } else {
            self.grants.insert((role, module), actions);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_shipped_policy() {
        let map = RolePermissionMap::with_defaults();

        for module in ModuleId::ALL {
            for action in Action::ALL {
                assert!(map.can_perform(Role::Admin, module, action));
            }
        }

        assert!(map.can_perform(Role::Staff, ModuleId::Inventory, Action::Update));
        assert!(!map.can_perform(Role::Staff, ModuleId::Inventory, Action::Delete));
        assert!(!map.can_perform(Role::Staff, ModuleId::Approvals, Action::Update));

        assert!(map.can_perform(Role::Accountant, ModuleId::Reports, Action::Export));
        assert!(!map.can_perform(Role::Accountant, ModuleId::Inventory, Action::Update));
    }

    #[test]
    fn empty_matrix_fails_closed() {
        let map = RolePermissionMap::new();
        assert!(!map.has_role(Role::Admin));
        assert!(!map.can_perform(Role::Admin, ModuleId::Dashboard, Action::View));
    }

    #[test]
    fn grant_creates_module_entry() {
        let mut map = RolePermissionMap::new();
        map.grant(Role::Staff, ModuleId::Approvals, Action::View);

        assert!(map.can_perform(Role::Staff, ModuleId::Approvals, Action::View));
        assert_eq!(
            map.permissions(Role::Staff),
            vec![Permission::new(ModuleId::Approvals, &[Action::View])]
        );
    }

    #[test]
    fn revoking_last_action_removes_module_entry() {
        let mut map = RolePermissionMap::with_defaults();
        map.revoke(Role::Accountant, ModuleId::Reports, Action::View);
        assert_eq!(
            map.actions(Role::Accountant, ModuleId::Reports).actions(),
            vec![Action::Export]
        );

        map.revoke(Role::Accountant, ModuleId::Reports, Action::Export);
        assert!(
            !map.permissions(Role::Accountant)
                .iter()
                .any(|p| p.module_id == ModuleId::Reports)
        );
    }

    #[test]
    fn revoking_absent_grant_is_a_no_op() {
        let mut map = RolePermissionMap::with_defaults();
        let before = map.clone();
        map.revoke(Role::Staff, ModuleId::AccessControl, Action::Update);
        assert_eq!(map, before);
    }

    #[test]
    fn modules_are_mutated_independently() {
        let mut map = RolePermissionMap::with_defaults();
        map.revoke(Role::Staff, ModuleId::Inventory, Action::Update);

        assert!(map.can_perform(Role::Staff, ModuleId::Valuation, Action::Update));
        assert!(map.can_perform(Role::Staff, ModuleId::BulkUpload, Action::Update));
    }

    #[test]
    fn toggle_flips_grants() {
        let mut map = RolePermissionMap::new();
        assert!(map.toggle(Role::Staff, ModuleId::Reports, Action::View));
        assert!(!map.toggle(Role::Staff, ModuleId::Reports, Action::View));
        assert!(map.permissions(Role::Staff).is_empty());
    }

    #[test]
    fn set_permissions_replaces_and_skips_empty_records() {
        let mut map = RolePermissionMap::with_defaults();
        map.set_permissions(
            Role::Staff,
            &[
                Permission::new(ModuleId::Reports, &[Action::View]),
                Permission::new(ModuleId::Approvals, &[]),
            ],
        );

        assert_eq!(
            map.permissions(Role::Staff),
            vec![Permission::new(ModuleId::Reports, &[Action::View])]
        );
    }

    #[test]
    fn roles_granting_lists_holders() {
        let map = RolePermissionMap::with_defaults();
        assert_eq!(
            map.roles_granting(ModuleId::Reports, Action::Export),
            vec![Role::Admin, Role::Accountant]
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn role() -> impl Strategy<Value = Role> {
            prop::sample::select(Role::ALL.to_vec())
        }

        fn module() -> impl Strategy<Value = ModuleId> {
            prop::sample::select(ModuleId::ALL.to_vec())
        }

        fn action() -> impl Strategy<Value = Action> {
            prop::sample::select(Action::ALL.to_vec())
        }

        proptest! {
            /// Property: a role/module pair absent from the map denies every action.
            #[test]
            fn absent_pairs_fail_closed(
                granted in prop::collection::vec((role(), module(), action()), 0..20),
                other_role in role(),
                other_module in module(),
            ) {
                let mut map = RolePermissionMap::new();
                for (r, m, a) in &granted {
                    if (*r, *m) != (other_role, other_module) {
                        map.grant(*r, *m, *a);
                    }
                }

                for a in Action::ALL {
                    prop_assert!(!map.can_perform(other_role, other_module, a));
                }
            }

            /// Property: grant then revoke of a fresh action restores the matrix.
            #[test]
            fn grant_then_revoke_restores_matrix(r in role(), m in module(), a in action()) {
                let mut map = RolePermissionMap::with_defaults();
                prop_assume!(!map.can_perform(r, m, a));
                let before = map.clone();

                map.grant(r, m, a);
                prop_assert!(map.can_perform(r, m, a));
                map.revoke(r, m, a);

                prop_assert_eq!(map, before);
            }
        }
    }
}
