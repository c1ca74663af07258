use serde::Serialize;
use thiserror::Error;

use crate::{Action, ModuleId, Permission, Principal, Role, RolePermissionMap};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role {role} may not {action} on module '{module}'")]
    Forbidden {
        role: Role,
        module: ModuleId,
        action: Action,
    },
}

/// A single `(module, action)` requirement checked at an entry point.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Requirement {
    pub module: ModuleId,
    pub action: Action,
}

impl Requirement {
    pub const fn new(module: ModuleId, action: Action) -> Self {
        Self { module, action }
    }
}

impl core::fmt::Display for Requirement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}", self.module, self.action)
    }
}

/// Authorize a principal against the matrix.
///
/// - No IO
/// - No panics
/// - Fails closed when the role has no matching entry
pub fn authorize(
    matrix: &RolePermissionMap,
    principal: &Principal,
    required: Requirement,
) -> Result<(), AuthzError> {
    if matrix.can_perform(principal.role, required.module, required.action) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            role: principal.role,
            module: required.module,
            action: required.action,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub required: Requirement,
    pub role: Role,
    pub granted: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// Everything the role currently holds.
    pub effective_permissions: Vec<Permission>,

    /// If denied, this explains what was missing.
    pub denial_reason: Option<DenialReason>,
}

/// Detailed reason why authorization was denied.
#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    /// The role has no entries in the matrix at all.
    UnknownRole,
    /// The role has no entry for the module.
    ModuleNotGranted,
    /// The module entry exists but lacks the action.
    ActionNotGranted,
}

/// Explain why a check would be allowed or denied.
pub fn explain_authorization(
    matrix: &RolePermissionMap,
    role: Role,
    required: Requirement,
) -> AuthorizationExplanation {
    let effective_permissions = matrix.permissions(role);

    if matrix.can_perform(role, required.module, required.action) {
        return AuthorizationExplanation {
            required,
            role,
            granted: true,
            reason: format!("role {role} holds '{required}'"),
            effective_permissions,
            denial_reason: None,
        };
    }

    let (kind, message) = if !matrix.has_role(role) {
        (
            DenialKind::UnknownRole,
            format!("role {role} has no permissions configured"),
        )
    } else if matrix.actions(role, required.module).is_empty() {
        (
            DenialKind::ModuleNotGranted,
            format!("role {role} has no access to module '{}'", required.module),
        )
    } else {
        (
            DenialKind::ActionNotGranted,
            format!(
                "role {role} may access module '{}' but not '{}'",
                required.module, required.action
            ),
        )
    };

    let mut suggestions = vec![format!(
        "Grant '{}' on '{}' to role {role} in access control",
        required.action, required.module
    )];

    let holders = matrix.roles_granting(required.module, required.action);
    if !holders.is_empty() {
        let names: Vec<&str> = holders.iter().map(|r| r.as_str()).collect();
        suggestions.push(format!(
            "Ask a user with one of these roles to perform it: {}",
            names.join(", ")
        ));
    }

    AuthorizationExplanation {
        required,
        role,
        granted: false,
        reason: message.clone(),
        effective_permissions,
        denial_reason: Some(DenialReason {
            kind,
            message,
            suggestions,
        }),
    }
}
