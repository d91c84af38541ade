//! Auth provider port.
//!
//! Resolves an authenticated request to the operator it belongs to. The
//! lifecycle layer trusts the resolved operator id as given; verifying
//! the credential itself is the adapter's concern (or the surrounding
//! transport's).

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::OperatorId;

/// Errors from operator resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The request carried no usable credential.
    #[error("missing or empty credential")]
    MissingCredential,

    /// The credential did not resolve to an operator.
    #[error("credential does not resolve to an operator")]
    UnknownOperator,

    /// The auth backend could not be reached.
    #[error("auth provider unavailable: {0}")]
    Unavailable(String),
}

/// Resolves request credentials to an operator identity.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve the operator behind an authenticated request.
    ///
    /// # Errors
    ///
    /// - `MissingCredential` if the credential is absent or empty
    /// - `UnknownOperator` if it carries no operator identity
    /// - `Unavailable` for transient backend failures
    async fn resolve_operator(&self, credential: &str) -> Result<OperatorId, AuthError>;
}
