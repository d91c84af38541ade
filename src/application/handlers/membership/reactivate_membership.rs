//! ReactivateMembershipHandler - resumes billing for a cancelled client.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::foundation::{ClientId, OperatorId};
use crate::domain::membership::{Membership, MembershipError};
use crate::ports::MembershipStore;

/// Command to reactivate a membership.
#[derive(Debug, Clone)]
pub struct ReactivateMembershipCommand {
    pub client_id: ClientId,
    pub operator_id: OperatorId,
}

/// Result of a reactivation.
#[derive(Debug, Clone)]
pub struct ReactivateMembershipResult {
    pub membership: Membership,
}

/// Handler for membership reactivation.
///
/// Requires both the plan and the payment method to still be on file;
/// the next charge date is recomputed from "now" rather than resumed
/// from where cancellation left off.
pub struct ReactivateMembershipHandler {
    store: Arc<dyn MembershipStore>,
}

impl ReactivateMembershipHandler {
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        cmd: ReactivateMembershipCommand,
    ) -> Result<ReactivateMembershipResult, MembershipError> {
        // 1. Load the membership
        let mut membership = self
            .store
            .find_by_client_and_operator(&cmd.client_id, &cmd.operator_id)
            .await?
            .ok_or_else(|| MembershipError::not_found(&cmd.client_id, &cmd.operator_id))?;

        // 2. Reactivate; already-active is a no-op that skips the write
        if membership.reactivate(Utc::now().fixed_offset())? {
            self.store.update(&membership).await?;
            tracing::info!(
                client_id = %cmd.client_id,
                next_charge_at = ?membership.next_charge_at,
                "Membership reactivated"
            );
        } else {
            tracing::info!(
                client_id = %cmd.client_id,
                "Membership already active; nothing to do"
            );
        }

        Ok(ReactivateMembershipResult { membership })
    }
}
