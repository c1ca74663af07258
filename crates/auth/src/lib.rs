//! `nexus-auth`: role-based permission matrix and authorization checks.
//!
//! Authentication happens elsewhere; this crate receives an already
//! verified [`Principal`] and answers "may this role do that here?".

pub mod authorize;
pub mod matrix;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{
    AuthorizationExplanation, AuthzError, DenialKind, DenialReason, Requirement, authorize,
    explain_authorization,
};
pub use matrix::RolePermissionMap;
pub use permissions::{Action, ActionSet, ModuleId, Permission};
pub use principal::Principal;
pub use roles::Role;
