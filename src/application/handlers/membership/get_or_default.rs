//! GetOrDefaultMembershipHandler - returns a client's membership, creating
//! an empty one on first observation.

use std::sync::Arc;

use crate::domain::foundation::{ClientId, OperatorId};
use crate::domain::membership::{Membership, MembershipError};
use crate::ports::MembershipStore;

use super::creation::ensure_membership;

/// Command to fetch (or lazily create) a membership.
#[derive(Debug, Clone)]
pub struct GetOrDefaultMembershipCommand {
    pub client_id: ClientId,
    pub operator_id: OperatorId,
}

/// Result of a get-or-default lookup.
#[derive(Debug, Clone)]
pub struct GetOrDefaultMembershipResult {
    pub membership: Membership,
    /// Whether this call created the record.
    pub created: bool,
}

/// Handler for the get-or-default lookup.
///
/// A client observed for the first time gets a persisted NotConfigured
/// membership, so every client always has exactly one record.
pub struct GetOrDefaultMembershipHandler {
    store: Arc<dyn MembershipStore>,
}

impl GetOrDefaultMembershipHandler {
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        cmd: GetOrDefaultMembershipCommand,
    ) -> Result<GetOrDefaultMembershipResult, MembershipError> {
        let (membership, created) =
            ensure_membership(self.store.as_ref(), &cmd.client_id, &cmd.operator_id).await?;

        if created {
            tracing::info!(
                client_id = %cmd.client_id,
                operator_id = %cmd.operator_id,
                "Created membership on first observation"
            );
        }

        Ok(GetOrDefaultMembershipResult {
            membership,
            created,
        })
    }
}
