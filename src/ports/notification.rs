//! Outbound notification ports.
//!
//! One port per delivery medium. Both are optional collaborators: a
//! deployment may wire neither, one, or both.
//!
//! # Design
//!
//! - **Best-effort**: sends return a plain bool; a failed or skipped send
//!   is logged by the implementation and never fails the caller
//! - **Plan-shaped payload**: providers format the plan themselves, so
//!   templates stay with the adapter that owns the medium

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::membership::PlanTerms;

/// Plan details carried by a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanNotification {
    pub amount: Decimal,
    pub currency: String,
    pub billing_day: u8,
    pub message: Option<String>,
}

impl From<&PlanTerms> for PlanNotification {
    fn from(plan: &PlanTerms) -> Self {
        Self {
            amount: plan.amount,
            currency: plan.currency.clone(),
            billing_day: plan.billing_day,
            message: plan.message.clone(),
        }
    }
}

/// Sends plan details by email.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Deliver the plan to `to`. Returns whether the message was accepted
    /// by the underlying provider.
    async fn send_plan(&self, to: &str, client_name: &str, plan: &PlanNotification) -> bool;
}

/// Sends plan details by SMS.
#[async_trait]
pub trait SmsProvider: Send + Sync {
    /// Deliver the plan to the phone number `to`. Returns whether the
    /// message was accepted by the underlying provider.
    async fn send_plan(&self, to: &str, client_name: &str, plan: &PlanNotification) -> bool;
}
