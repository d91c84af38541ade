//! CancelMembershipHandler - stops the billing cycle for a client.

use std::sync::Arc;

use crate::domain::foundation::{ClientId, OperatorId};
use crate::domain::membership::{Membership, MembershipError};
use crate::ports::MembershipStore;

/// Command to cancel a membership.
#[derive(Debug, Clone)]
pub struct CancelMembershipCommand {
    pub client_id: ClientId,
    pub operator_id: OperatorId,
    /// Free-form reason, recorded in the logs only.
    pub reason: Option<String>,
}

/// Result of a cancellation.
#[derive(Debug, Clone)]
pub struct CancelMembershipResult {
    pub membership: Membership,
}

/// Handler for membership cancellation. Idempotent: cancelling an
/// already-cancelled membership returns it unchanged.
pub struct CancelMembershipHandler {
    store: Arc<dyn MembershipStore>,
}

impl CancelMembershipHandler {
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        cmd: CancelMembershipCommand,
    ) -> Result<CancelMembershipResult, MembershipError> {
        // 1. Load the membership
        let mut membership = self
            .store
            .find_by_client_and_operator(&cmd.client_id, &cmd.operator_id)
            .await?
            .ok_or_else(|| MembershipError::not_found(&cmd.client_id, &cmd.operator_id))?;

        // 2. Cancel; a repeat cancel changes nothing and skips the write
        if membership.cancel() {
            self.store.update(&membership).await?;
            tracing::info!(
                client_id = %cmd.client_id,
                reason = cmd.reason.as_deref().unwrap_or("none given"),
                "Membership cancelled"
            );
        } else {
            tracing::info!(
                client_id = %cmd.client_id,
                "Membership already cancelled; nothing to do"
            );
        }

        Ok(CancelMembershipResult { membership })
    }
}
