//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `MembershipStore` - Membership aggregate persistence
//!
//! ## Collaborator Ports
//!
//! - `AuthProvider` - Resolves request credentials to an operator
//! - `PaymentGatewayClient` - Card processing gateway (optional)
//! - `EmailProvider` / `SmsProvider` - Plan delivery media (optional)

mod auth;
mod membership_store;
mod notification;
mod payment_gateway;

pub use auth::{AuthError, AuthProvider};
pub use membership_store::MembershipStore;
pub use notification::{EmailProvider, PlanNotification, SmsProvider};
pub use payment_gateway::{
    CardDetails, GatewayCustomer, GatewayEphemeralKey, GatewayPaymentMethod, GatewaySetupIntent,
    PaymentGatewayClient, PaymentGatewayError, PaymentGatewayErrorCode,
};
