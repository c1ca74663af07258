use serde::{Deserialize, Serialize};

use crate::Role;

/// An authenticated actor, as handed over by the external login provider.
///
/// The provider has already verified the identity; the core only reads the
/// role (for permission checks) and the display name (recorded on
/// transactions as `staff_name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub staff_name: String,
    pub role: Role,
}

impl Principal {
    pub fn new(staff_name: impl Into<String>, role: Role) -> Self {
        Self {
            staff_name: staff_name.into(),
            role,
        }
    }
}
