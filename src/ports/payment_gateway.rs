//! Payment gateway port for external card processing.
//!
//! Defines the contract for payment gateway integrations (e.g., Stripe).
//! The whole collaborator is optional: when no gateway is wired, the
//! lifecycle layer falls back to caller-supplied card data and local
//! brand classification.
//!
//! # Design
//!
//! - **Gateway agnostic**: interface works with any card processor
//! - **Setup-focused**: covers customer provisioning and card-on-file
//!   setup, not charging (charges are driven elsewhere)
//! - **Optional card fields**: gateways may omit card details on a
//!   payment method; callers supply their own fallbacks

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ClientId, DomainError, ErrorCode};

/// Port for payment gateway integrations.
#[async_trait]
pub trait PaymentGatewayClient: Send + Sync {
    /// Find the gateway customer for this client, creating one if absent.
    ///
    /// Implementations key the lookup on the client id so repeated calls
    /// return the same customer.
    async fn get_or_create_customer(
        &self,
        client_id: &ClientId,
        email: Option<&str>,
        name: Option<&str>,
    ) -> Result<GatewayCustomer, PaymentGatewayError>;

    /// Create a setup intent for collecting a card.
    ///
    /// The intent is created for off-session usage so the stored card can
    /// back future recurring charges.
    async fn create_setup_intent(
        &self,
        customer_id: &str,
    ) -> Result<GatewaySetupIntent, PaymentGatewayError>;

    /// Create an ephemeral key scoped to a customer.
    ///
    /// Mobile clients need this to drive the setup intent securely.
    async fn create_ephemeral_key(
        &self,
        customer_id: &str,
    ) -> Result<GatewayEphemeralKey, PaymentGatewayError>;

    /// Tokenize raw card details into a gateway payment method.
    ///
    /// Server-side tokenization is a fallback path; clients should
    /// tokenize on-device whenever possible.
    async fn create_payment_method(
        &self,
        card: CardDetails,
    ) -> Result<GatewayPaymentMethod, PaymentGatewayError>;

    /// Attach an existing payment method to a customer.
    ///
    /// The returned record carries whatever card details the gateway
    /// exposes for the attached method.
    async fn attach_payment_method(
        &self,
        payment_method_id: &str,
        customer_id: &str,
    ) -> Result<GatewayPaymentMethod, PaymentGatewayError>;

    /// Fetch a payment method by its gateway id.
    async fn get_payment_method(
        &self,
        payment_method_id: &str,
    ) -> Result<GatewayPaymentMethod, PaymentGatewayError>;
}

/// Customer record in the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayCustomer {
    /// Gateway's customer ID.
    pub id: String,

    /// Customer email, if registered.
    pub email: Option<String>,

    /// Customer name, if registered.
    pub name: Option<String>,
}

/// Setup intent handed to clients for card collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySetupIntent {
    /// Gateway's intent ID.
    pub id: String,

    /// Secret the client uses to confirm the intent.
    pub client_secret: String,
}

/// Short-lived key scoping gateway access to one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayEphemeralKey {
    pub secret: String,
}

/// Card-on-file record in the payment gateway.
///
/// Card fields are optional because gateways may withhold them; callers
/// fall back to request-supplied values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayPaymentMethod {
    /// Gateway's payment method ID.
    pub id: String,

    pub brand: Option<String>,
    pub last4: Option<String>,
    pub exp_month: Option<u8>,
    pub exp_year: Option<u16>,
    pub holder_name: Option<String>,
}

/// Raw card details for server-side tokenization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDetails {
    pub number: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub cvc: Option<String>,
}

/// Errors from payment gateway operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentGatewayError {
    /// Error code for categorization.
    pub code: PaymentGatewayErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Gateway's own error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentGatewayError {
    /// Create a new gateway error.
    pub fn new(code: PaymentGatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    /// Attach the gateway's own error code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentGatewayErrorCode::NetworkError, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentGatewayErrorCode::AuthenticationError, message)
    }

    /// Create an invalid card error.
    pub fn invalid_card(message: impl Into<String>) -> Self {
        Self::new(PaymentGatewayErrorCode::InvalidCard, message)
    }

    /// Create a not found error.
    pub fn not_found(resource: &str) -> Self {
        Self::new(
            PaymentGatewayErrorCode::NotFound,
            format!("{} not found", resource),
        )
    }

    /// Create a provider-side error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentGatewayErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for PaymentGatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentGatewayError {}

impl From<PaymentGatewayError> for DomainError {
    fn from(err: PaymentGatewayError) -> Self {
        DomainError::new(ErrorCode::PaymentGatewayError, err.message)
            .with_detail("gateway_code", err.code.to_string())
    }
}

/// Payment gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentGatewayErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Invalid card details.
    InvalidCard,

    /// Resource not found.
    NotFound,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Gateway API error.
    ProviderError,

    /// Unknown error.
    Unknown,
}

impl PaymentGatewayErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentGatewayErrorCode::NetworkError | PaymentGatewayErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for PaymentGatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentGatewayErrorCode::NetworkError => "network_error",
            PaymentGatewayErrorCode::AuthenticationError => "authentication_error",
            PaymentGatewayErrorCode::InvalidCard => "invalid_card",
            PaymentGatewayErrorCode::NotFound => "not_found",
            PaymentGatewayErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentGatewayErrorCode::ProviderError => "provider_error",
            PaymentGatewayErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}
