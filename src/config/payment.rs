//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payment gateway configuration
///
/// The gateway is optional: a deployment without one still runs the full
/// lifecycle, with card data arriving pre-tokenized in requests and setup
/// sessions served as mock artifacts.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Whether a payment gateway is wired in
    #[serde(default)]
    pub gateway_enabled: bool,

    /// Publishable key handed to clients during payment setup
    pub publishable_key: Option<String>,

    /// Merchant display name shown in payment sheets
    #[serde(default = "default_merchant_name")]
    pub merchant_name: String,
}

impl PaymentConfig {
    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.merchant_name.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__MERCHANT_NAME"));
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            gateway_enabled: false,
            publishable_key: None,
            merchant_name: default_merchant_name(),
        }
    }
}

fn default_merchant_name() -> String {
    "Membership Manager".to_string()
}
