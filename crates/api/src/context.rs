use chrono::{DateTime, Utc};

use nexus_auth::{Principal, Role};

/// Who is calling and at what business time.
///
/// Immutable; present for every service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    principal: Principal,
    now: DateTime<Utc>,
}

impl CallContext {
    /// A context stamped with the current wall-clock time.
    pub fn new(principal: Principal) -> Self {
        Self::at(principal, Utc::now())
    }

    pub fn at(principal: Principal, now: DateTime<Utc>) -> Self {
        Self { principal, now }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn role(&self) -> Role {
        self.principal.role
    }

    pub fn staff_name(&self) -> &str {
        &self.principal.staff_name
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
