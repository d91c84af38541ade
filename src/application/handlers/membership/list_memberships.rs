//! ListMembershipsHandler - query for all memberships under an operator.

use std::sync::Arc;

use crate::domain::foundation::OperatorId;
use crate::domain::membership::{Membership, MembershipError};
use crate::ports::MembershipStore;

/// Query for every membership an operator manages.
#[derive(Debug, Clone)]
pub struct ListMembershipsQuery {
    pub operator_id: OperatorId,
}

/// Result of listing an operator's memberships.
#[derive(Debug, Clone)]
pub struct ListMembershipsResult {
    pub memberships: Vec<Membership>,
}

/// Handler for the membership list query.
pub struct ListMembershipsHandler {
    store: Arc<dyn MembershipStore>,
}

impl ListMembershipsHandler {
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        query: ListMembershipsQuery,
    ) -> Result<ListMembershipsResult, MembershipError> {
        let memberships = self.store.list_by_operator(&query.operator_id).await?;

        tracing::debug!(
            operator_id = %query.operator_id,
            count = memberships.len(),
            "Listed memberships"
        );

        Ok(ListMembershipsResult { memberships })
    }
}
