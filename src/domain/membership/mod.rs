//! Membership domain module.
//!
//! Handles the recurring-billing lifecycle for client memberships:
//! plan terms, billing dates, cards on file, and status transitions.
//!
//! # Module Structure
//!
//! - `aggregate` - Membership aggregate entity
//! - `billing_cycle` - next charge date calculator
//! - `card_brand` - card brand classification
//! - `errors` - membership error taxonomy
//! - `payment_method` - card-on-file value object
//! - `plan` - billing plan terms value object
//! - `status` - lifecycle status tokens
//! - `view` - client-facing read models

mod aggregate;
pub mod billing_cycle;
mod card_brand;
mod errors;
mod payment_method;
mod plan;
mod status;
mod view;

pub use aggregate::Membership;
pub use card_brand::{normalize_card_number, CardBrand};
pub use errors::MembershipError;
pub use payment_method::PaymentMethod;
pub use plan::PlanTerms;
pub use status::MembershipStatus;
pub use view::{MembershipView, PaymentMethodView, PaymentSetupView, PlanView};
