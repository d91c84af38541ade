//! Stored payment method details.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Card details attached to a membership.
///
/// Like the plan, the payment method is an all-or-nothing group. Only
/// display-safe data is held here; the full card number never enters the
/// domain. `external_reference_id` carries the payment gateway's handle
/// when the card was registered through one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Card brand token ("visa", "mastercard", ...). Gateway-supplied
    /// brands outside the local classifier's vocabulary pass through
    /// verbatim.
    pub brand: String,

    /// Last four digits of the card number.
    pub last4: String,

    /// Expiration month (1-12 by convention; not range-checked, the
    /// gateway is authoritative).
    pub exp_month: u8,

    /// Four-digit expiration year.
    pub exp_year: u16,

    /// Name printed on the card.
    pub holder_name: String,

    /// Gateway payment-method handle, when registered through a gateway.
    pub external_reference_id: Option<String>,
}

impl PaymentMethod {
    /// Creates a validated payment method.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `last4` is not exactly four ASCII
    /// digits or `brand` is empty.
    pub fn new(
        brand: impl Into<String>,
        last4: impl Into<String>,
        exp_month: u8,
        exp_year: u16,
        holder_name: impl Into<String>,
        external_reference_id: Option<String>,
    ) -> Result<Self, ValidationError> {
        let brand = brand.into();
        let last4 = last4.into();

        if brand.is_empty() {
            return Err(ValidationError::empty_field("brand"));
        }
        if last4.len() != 4 || !last4.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::invalid_format(
                "last4",
                "must be exactly 4 digits",
            ));
        }

        Ok(Self {
            brand,
            last4,
            exp_month,
            exp_year,
            holder_name: holder_name.into(),
            external_reference_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_accepts_valid_card_data() {
        let method =
            PaymentMethod::new("visa", "4242", 12, 2027, "Ana Torres", None).unwrap();
        assert_eq!(method.brand, "visa");
        assert_eq!(method.last4, "4242");
        assert_eq!(method.exp_month, 12);
        assert_eq!(method.exp_year, 2027);
        assert_eq!(method.holder_name, "Ana Torres");
        assert!(method.external_reference_id.is_none());
    }

    #[test]
    fn payment_method_keeps_gateway_reference() {
        let method =
            PaymentMethod::new("visa", "4242", 12, 2027, "", Some("pm_123".to_string()))
                .unwrap();
        assert_eq!(method.external_reference_id.as_deref(), Some("pm_123"));
    }

    #[test]
    fn payment_method_rejects_short_last4() {
        assert!(PaymentMethod::new("visa", "42", 12, 2027, "", None).is_err());
    }

    #[test]
    fn payment_method_rejects_non_digit_last4() {
        assert!(PaymentMethod::new("visa", "42ab", 12, 2027, "", None).is_err());
    }

    #[test]
    fn payment_method_rejects_empty_brand() {
        assert!(PaymentMethod::new("", "4242", 12, 2027, "", None).is_err());
    }

    #[test]
    fn payment_method_allows_unrecognized_brand_token() {
        // A gateway may report brands the local classifier never emits.
        let method = PaymentMethod::new("diners", "3056", 6, 2026, "", None).unwrap();
        assert_eq!(method.brand, "diners");
    }
}
