//! Trusted Auth Provider - pass-through operator resolution.
//!
//! For deployments where authentication terminates upstream (gateway,
//! sidecar, or the surrounding service) and requests arrive already
//! vouched for. The credential is taken verbatim as the operator id;
//! only non-emptiness is checked here.

use async_trait::async_trait;

use crate::domain::foundation::OperatorId;
use crate::ports::{AuthError, AuthProvider};

/// Auth provider that trusts the credential as the operator identity.
#[derive(Debug, Clone, Default)]
pub struct TrustedAuthProvider;

impl TrustedAuthProvider {
    /// Creates a new trusted provider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuthProvider for TrustedAuthProvider {
    async fn resolve_operator(&self, credential: &str) -> Result<OperatorId, AuthError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(AuthError::MissingCredential);
        }
        OperatorId::new(credential).map_err(|_| AuthError::MissingCredential)
    }
}
