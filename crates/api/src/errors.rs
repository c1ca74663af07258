use thiserror::Error;

use nexus_auth::AuthzError;
use nexus_core::DomainError;

/// Every failure the service facade can surface.
///
/// `code()` is stable and machine-readable so a calling UI can tell
/// "not enough stock" apart from "not allowed for your role".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    PermissionDenied(#[from] AuthzError),
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Domain(DomainError::Validation(_)) => "validation_error",
            ServiceError::Domain(DomainError::NotFound(_)) => "not_found",
            ServiceError::Domain(DomainError::InsufficientStock { .. }) => "insufficient_stock",
            ServiceError::Domain(DomainError::InvalidState(_)) => "invalid_state",
            ServiceError::PermissionDenied(_) => "permission_denied",
        }
    }

    /// JSON body for error responses: `{ "error": code, "message": text }`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        })
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
