//! Billing plan terms.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Billing terms configured for a membership.
///
/// The plan is stored as a whole or not at all: a membership either has a
/// complete `PlanTerms` or none. Partial plans are unrepresentable.
///
/// # Invariants
///
/// - `amount` is non-negative
/// - `billing_day` is in 1..=31 (the billing cycle clamps to 28 when
///   computing charge dates)
/// - `currency` and `channel` are non-empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTerms {
    /// Monthly amount charged to the client.
    pub amount: Decimal,

    /// ISO currency code, e.g. "USD".
    pub currency: String,

    /// Day of month the charge is anchored to.
    pub billing_day: u8,

    /// Delivery channel for plan notifications ("email" or "sms").
    pub channel: String,

    /// Free-form note included when the plan is delivered.
    pub message: Option<String>,
}

impl PlanTerms {
    /// Creates validated plan terms.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the amount is negative, the billing day
    /// is outside 1..=31, or currency/channel are empty.
    pub fn new(
        amount: Decimal,
        currency: impl Into<String>,
        billing_day: u8,
        channel: impl Into<String>,
        message: Option<String>,
    ) -> Result<Self, ValidationError> {
        let currency = currency.into();
        let channel = channel.into();

        if amount.is_sign_negative() {
            return Err(ValidationError::invalid_format(
                "amount",
                "must not be negative",
            ));
        }
        if !(1..=31).contains(&billing_day) {
            return Err(ValidationError::out_of_range(
                "billing_day",
                1,
                31,
                billing_day as i32,
            ));
        }
        if currency.is_empty() {
            return Err(ValidationError::empty_field("currency"));
        }
        if channel.is_empty() {
            return Err(ValidationError::empty_field("channel"));
        }

        Ok(Self {
            amount,
            currency,
            billing_day,
            channel,
            message,
        })
    }
}
