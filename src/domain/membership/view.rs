//! Client-facing read models.
//!
//! Views are the shapes handed back to API consumers. They rename fields
//! to the camelCase wire contract and never echo gateway references.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Membership, PaymentMethod, PlanTerms};
use crate::domain::foundation::Timestamp;

/// Snapshot of a membership as presented to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipView {
    pub client_id: String,
    /// Lower-case status token, e.g. `"plan_draft"`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethodView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_charge_at: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sent_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

/// Billing terms as presented to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanView {
    pub amount: Decimal,
    pub currency: String,
    pub billing_day: u8,
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Card summary as presented to callers.
///
/// Deliberately omits the gateway payment method reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodView {
    pub brand: String,
    pub last4: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub holder_name: String,
}

/// Result of preparing a payment setup session with the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSetupView {
    pub client_secret: String,
    pub customer_id: String,
    pub ephemeral_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publishable_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,
}

impl From<&PlanTerms> for PlanView {
    fn from(plan: &PlanTerms) -> Self {
        Self {
            amount: plan.amount,
            currency: plan.currency.clone(),
            billing_day: plan.billing_day,
            channel: plan.channel.clone(),
            message: plan.message.clone(),
        }
    }
}

impl From<&PaymentMethod> for PaymentMethodView {
    fn from(pm: &PaymentMethod) -> Self {
        Self {
            brand: pm.brand.clone(),
            last4: pm.last4.clone(),
            exp_month: pm.exp_month,
            exp_year: pm.exp_year,
            holder_name: pm.holder_name.clone(),
        }
    }
}

impl From<&Membership> for MembershipView {
    fn from(membership: &Membership) -> Self {
        Self {
            client_id: membership.client_id.to_string(),
            status: membership.status.as_str().to_string(),
            plan: membership.plan.as_ref().map(PlanView::from),
            payment_method: membership.payment_method.as_ref().map(PaymentMethodView::from),
            next_charge_at: membership.next_charge_at,
            last_sent_at: membership.last_sent_at,
            updated_at: membership.updated_at,
        }
    }
}
