//! Membership aggregate entity.
//!
//! The Membership aggregate represents the recurring-billing agreement
//! between one client and one operator. Each (client, operator) pair has
//! at most one Membership.
//!
//! # Design Decisions
//!
//! - **One per client/operator pair**: unique constraint enforced at the
//!   database level
//! - **All-or-nothing groups**: plan terms and payment method are each a
//!   single `Option` of a validated struct, so a half-configured group
//!   cannot be represented
//! - **Per-operation transitions**: each lifecycle operation is its own
//!   method with its own precondition; there is no central transition
//!   table, and only `plan_for_delivery` and `reactivate` can reject

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    ClientId, DomainError, ErrorCode, MembershipId, OperatorId, Timestamp,
};

use super::billing_cycle;
use super::{MembershipStatus, PaymentMethod, PlanTerms};

/// Membership aggregate - one client's billing agreement under one operator.
///
/// # Invariants
///
/// - `id` is globally unique
/// - `(client_id, operator_id)` is unique
/// - `plan` and `payment_method` are complete when present
/// - `next_charge_at` is only populated by activation paths and cleared
///   on cancellation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// Unique identifier for this membership.
    pub id: MembershipId,

    /// Client this membership bills.
    pub client_id: ClientId,

    /// Operator account the client belongs to.
    pub operator_id: OperatorId,

    /// Current status in the membership lifecycle.
    pub status: MembershipStatus,

    /// Configured billing terms, absent until the first plan save.
    pub plan: Option<PlanTerms>,

    /// Card on file, absent until a payment method is attached.
    pub payment_method: Option<PaymentMethod>,

    /// When the next recurring charge is due. Present only for active
    /// memberships.
    pub next_charge_at: Option<DateTime<FixedOffset>>,

    /// When plan details were last delivered to the client.
    pub last_sent_at: Option<Timestamp>,

    /// When the membership was created.
    pub created_at: Timestamp,

    /// When the membership was last updated.
    pub updated_at: Timestamp,
}

impl Membership {
    /// Create a brand-new membership with nothing configured yet.
    pub fn not_configured(client_id: ClientId, operator_id: OperatorId) -> Self {
        let now = Timestamp::now();
        Self {
            id: MembershipId::new(),
            client_id,
            operator_id,
            status: MembershipStatus::NotConfigured,
            plan: None,
            payment_method: None,
            next_charge_at: None,
            last_sent_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the plan terms and restart the draft phase.
    ///
    /// Allowed from any state, including Active: saving a plan always puts
    /// the membership back in PlanDraft. Payment method and next charge
    /// date are left untouched.
    pub fn upsert_plan(&mut self, plan: PlanTerms) {
        self.plan = Some(plan);
        self.status = MembershipStatus::PlanDraft;
        self.updated_at = Timestamp::now();
    }

    /// Borrow the plan for delivery.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when no plan has been saved yet.
    pub fn plan_for_delivery(&self) -> Result<&PlanTerms, DomainError> {
        self.plan.as_ref().ok_or_else(|| {
            DomainError::new(
                ErrorCode::InvalidState,
                "The membership plan is not complete. Save the plan before sending it.",
            )
            .with_detail("status", self.status.as_str())
        })
    }

    /// Whether a delivery attempt from the current status is unexpected.
    ///
    /// Delivery is still allowed from any status; callers log the anomaly.
    pub fn delivery_is_anomalous(&self) -> bool {
        !matches!(
            self.status,
            MembershipStatus::PlanDraft | MembershipStatus::AwaitingPayment
        )
    }

    /// Record a plan delivery attempt.
    ///
    /// `last_sent_at` advances whether or not the notification actually
    /// went out. When the effective channel differs from the stored one,
    /// the plan channel is updated to match.
    pub fn record_plan_delivery(&mut self, effective_channel: &str) {
        if let Some(plan) = self.plan.as_mut() {
            if plan.channel != effective_channel {
                plan.channel = effective_channel.to_string();
            }
        }
        self.last_sent_at = Some(Timestamp::now());
        self.updated_at = Timestamp::now();
    }

    /// Attach or replace the card on file.
    ///
    /// The payment method is stored unconditionally. The membership
    /// activates only when it was awaiting payment with a complete plan;
    /// returns whether activation happened.
    pub fn attach_payment_method(
        &mut self,
        payment_method: PaymentMethod,
        now: DateTime<FixedOffset>,
    ) -> bool {
        self.payment_method = Some(payment_method);

        let pending_charge = match (&self.status, &self.plan) {
            (MembershipStatus::AwaitingPayment, Some(plan)) => {
                Some(billing_cycle::next_charge_at(plan.billing_day, now))
            }
            _ => None,
        };

        let activated = pending_charge.is_some();
        if let Some(next) = pending_charge {
            self.status = MembershipStatus::Active;
            self.next_charge_at = Some(next);
        }
        self.updated_at = Timestamp::now();
        activated
    }

    /// Cancel the membership and clear the next charge date.
    ///
    /// Returns false when already cancelled; callers treat that as a
    /// no-op and skip persistence.
    pub fn cancel(&mut self) -> bool {
        if self.status == MembershipStatus::Cancelled {
            return false;
        }
        self.status = MembershipStatus::Cancelled;
        self.next_charge_at = None;
        self.updated_at = Timestamp::now();
        true
    }

    /// Reactivate a previously configured membership.
    ///
    /// Returns `Ok(false)` when already active (no-op). On success the
    /// next charge date is recomputed from the stored billing day.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when the plan or the payment method is
    /// missing.
    pub fn reactivate(&mut self, now: DateTime<FixedOffset>) -> Result<bool, DomainError> {
        if self.status == MembershipStatus::Active {
            return Ok(false);
        }

        let plan = self.plan.as_ref().ok_or_else(|| {
            DomainError::new(
                ErrorCode::InvalidState,
                "Cannot reactivate membership without a plan. Please configure a plan first.",
            )
            .with_detail("status", self.status.as_str())
        })?;
        if self.payment_method.is_none() {
            return Err(DomainError::new(
                ErrorCode::InvalidState,
                "Cannot reactivate membership without a payment method. \
                 Please attach a payment method first.",
            )
            .with_detail("status", self.status.as_str()));
        }

        let next = billing_cycle::next_charge_at(plan.billing_day, now);
        self.status = MembershipStatus::Active;
        self.next_charge_at = Some(next);
        self.updated_at = Timestamp::now();
        Ok(true)
    }
}
