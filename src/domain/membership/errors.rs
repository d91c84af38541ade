//! Membership-specific error types.
//!
//! The taxonomy separates business outcomes a caller can act on from
//! infrastructure failures they cannot.
//!
//! # HTTP Status Mapping (for transport layers)
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | InvalidState | 400 |
//! | ValidationFailed | 400 |
//! | Internal | 500 |

use crate::domain::foundation::{ClientId, DomainError, ErrorCode, OperatorId, ValidationError};

/// Membership operation errors.
///
/// `Internal` keeps its detail for logging and diagnostics, but the
/// client-visible message stays generic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipError {
    /// No membership exists for this client under this operator.
    NotFound {
        client_id: ClientId,
        operator_id: OperatorId,
    },

    /// A precondition on plan/payment completeness was violated.
    InvalidState { current: String, reason: String },

    /// Malformed input.
    ValidationFailed { field: String, message: String },

    /// Persistence or collaborator failure unrelated to business rules.
    Internal(String),
}

impl MembershipError {
    pub fn not_found(client_id: &ClientId, operator_id: &OperatorId) -> Self {
        MembershipError::NotFound {
            client_id: client_id.clone(),
            operator_id: operator_id.clone(),
        }
    }

    pub fn invalid_state(current: impl Into<String>, reason: impl Into<String>) -> Self {
        MembershipError::InvalidState {
            current: current.into(),
            reason: reason.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        MembershipError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        MembershipError::Internal(detail.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            MembershipError::NotFound { .. } => ErrorCode::MembershipNotFound,
            MembershipError::InvalidState { .. } => ErrorCode::InvalidState,
            MembershipError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            MembershipError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Returns the client-visible error message.
    ///
    /// Internal failures deliberately surface a generic message; the
    /// detail is logged where the error is raised.
    pub fn message(&self) -> String {
        match self {
            MembershipError::NotFound { client_id, .. } => {
                format!("Membership not found for client: {}", client_id)
            }
            MembershipError::InvalidState { reason, .. } => reason.clone(),
            MembershipError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            MembershipError::Internal(_) => "Internal error".to_string(),
        }
    }

    /// Returns true if this error should trigger a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MembershipError::Internal(_))
    }
}

impl std::fmt::Display for MembershipError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for MembershipError {}

impl From<ValidationError> for MembershipError {
    fn from(err: ValidationError) -> Self {
        let field = match &err {
            ValidationError::EmptyField { field } => field.clone(),
            ValidationError::OutOfRange { field, .. } => field.clone(),
            ValidationError::InvalidFormat { field, .. } => field.clone(),
        };
        MembershipError::ValidationFailed {
            field,
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for MembershipError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::InvalidState => MembershipError::InvalidState {
                current: err
                    .details
                    .get("status")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                reason: err.message,
            },
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => MembershipError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => MembershipError::Internal(err.to_string()),
        }
    }
}

impl From<MembershipError> for DomainError {
    fn from(err: MembershipError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
