//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - PostgreSQL membership persistence
//! - `memory` - In-memory persistence for tests and development
//! - `sendgrid` - Email plan delivery
//! - `twilio` - SMS plan delivery
//! - `payment` - Payment gateway clients
//! - `auth` - Operator resolution

pub mod auth;
pub mod memory;
pub mod payment;
pub mod postgres;
pub mod sendgrid;
pub mod twilio;

pub use auth::TrustedAuthProvider;
pub use memory::InMemoryMembershipStore;
pub use payment::MockPaymentGateway;
pub use postgres::PostgresMembershipStore;
pub use sendgrid::{SendGridConfig, SendGridEmailProvider};
pub use twilio::{TwilioConfig, TwilioSmsProvider};
