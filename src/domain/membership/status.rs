//! Membership status lifecycle states.
//!
//! Status is mutated only through the per-operation transition methods on
//! [`Membership`](super::Membership); there is no standalone transition
//! table. Each state serializes and persists as its lower-case token.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Current state of a client's membership under one operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// Record exists but no plan has been configured yet.
    /// Initial state on first observation.
    NotConfigured,

    /// A plan has been configured and may be delivered to the client.
    /// Re-entered whenever the plan is upserted, from any state.
    PlanDraft,

    /// Plan delivered, waiting for a payment method to arrive.
    /// No lifecycle operation produces this state; attaching a payment
    /// method while in it activates the membership.
    AwaitingPayment,

    /// Billing is live; `next_charge_at` is populated.
    Active,

    /// Billing stopped. Re-enterable via reactivation.
    Cancelled,
}

impl MembershipStatus {
    /// Returns the lower-case persistence token for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::NotConfigured => "not_configured",
            MembershipStatus::PlanDraft => "plan_draft",
            MembershipStatus::AwaitingPayment => "awaiting_payment",
            MembershipStatus::Active => "active",
            MembershipStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MembershipStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_configured" => Ok(MembershipStatus::NotConfigured),
            "plan_draft" => Ok(MembershipStatus::PlanDraft),
            "awaiting_payment" => Ok(MembershipStatus::AwaitingPayment),
            "active" => Ok(MembershipStatus::Active),
            "cancelled" => Ok(MembershipStatus::Cancelled),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown status token '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tokens_are_lower_case() {
        assert_eq!(MembershipStatus::NotConfigured.as_str(), "not_configured");
        assert_eq!(MembershipStatus::PlanDraft.as_str(), "plan_draft");
        assert_eq!(
            MembershipStatus::AwaitingPayment.as_str(),
            "awaiting_payment"
        );
        assert_eq!(MembershipStatus::Active.as_str(), "active");
        assert_eq!(MembershipStatus::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn status_parses_from_token() {
        for status in [
            MembershipStatus::NotConfigured,
            MembershipStatus::PlanDraft,
            MembershipStatus::AwaitingPayment,
            MembershipStatus::Active,
            MembershipStatus::Cancelled,
        ] {
            let parsed: MembershipStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn status_rejects_unknown_token() {
        let result: Result<MembershipStatus, _> = "suspended".parse();
        assert!(result.is_err());
    }

    #[test]
    fn status_serializes_as_snake_case() {
        let json = serde_json::to_string(&MembershipStatus::AwaitingPayment).unwrap();
        assert_eq!(json, "\"awaiting_payment\"");
    }

    #[test]
    fn status_deserializes_from_snake_case() {
        let status: MembershipStatus = serde_json::from_str("\"plan_draft\"").unwrap();
        assert_eq!(status, MembershipStatus::PlanDraft);
    }

    #[test]
    fn display_matches_persistence_token() {
        assert_eq!(format!("{}", MembershipStatus::Active), "active");
    }
}
