//! UpsertPlanHandler - saves billing plan terms for a membership.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::foundation::{ClientId, OperatorId};
use crate::domain::membership::{Membership, MembershipError, PlanTerms};
use crate::ports::MembershipStore;

use super::creation::ensure_membership;

/// Currency applied when the caller omits one.
const DEFAULT_CURRENCY: &str = "USD";

/// Command to create or replace a membership's plan terms.
#[derive(Debug, Clone)]
pub struct UpsertPlanCommand {
    pub client_id: ClientId,
    pub operator_id: OperatorId,
    pub amount: Decimal,
    pub currency: Option<String>,
    pub billing_day: u8,
    pub channel: String,
    pub message: Option<String>,
}

/// Result of a plan upsert.
#[derive(Debug, Clone)]
pub struct UpsertPlanResult {
    pub membership: Membership,
}

/// Handler for plan upserts.
///
/// Saving a plan always restarts the draft phase, whatever state the
/// membership was in. The record is created on the fly for clients that
/// have never been observed.
pub struct UpsertPlanHandler {
    store: Arc<dyn MembershipStore>,
}

impl UpsertPlanHandler {
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, cmd: UpsertPlanCommand) -> Result<UpsertPlanResult, MembershipError> {
        // 1. Validate the plan group as a whole
        let currency = cmd
            .currency
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        let plan = PlanTerms::new(
            cmd.amount,
            currency,
            cmd.billing_day,
            cmd.channel,
            cmd.message,
        )?;

        // 2. Fetch the membership, creating it when absent
        let (mut membership, created) =
            ensure_membership(self.store.as_ref(), &cmd.client_id, &cmd.operator_id).await?;

        // 3. Apply the plan (domain logic)
        membership.upsert_plan(plan);

        // 4. Persist; the record exists either way at this point
        self.store.update(&membership).await?;

        tracing::info!(
            client_id = %cmd.client_id,
            billing_day = membership.plan.as_ref().map(|p| p.billing_day),
            created = created,
            "Saved membership plan"
        );

        Ok(UpsertPlanResult { membership })
    }
}
