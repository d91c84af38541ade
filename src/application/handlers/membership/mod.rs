//! Membership handlers.
//!
//! Command and query handlers for membership lifecycle operations including:
//!
//! ## Commands
//! - Saving a billing plan (creating the record on first touch)
//! - Sending the plan to the client over email or SMS
//! - Attaching a payment method and activating the membership
//! - Cancelling and reactivating memberships
//! - Creating payment gateway setup sessions
//!
//! ## Queries
//! - Get one membership (with a default for never-seen clients)
//! - List an operator's memberships

mod attach_payment_method;
mod cancel_membership;
mod create_payment_setup;
mod creation;
mod get_or_default;
mod list_memberships;
mod reactivate_membership;
mod send_plan;
mod upsert_plan;

// Commands
pub use attach_payment_method::{
    AttachPaymentMethodCommand, AttachPaymentMethodHandler, AttachPaymentMethodResult,
};
pub use cancel_membership::{
    CancelMembershipCommand, CancelMembershipHandler, CancelMembershipResult,
};
pub use create_payment_setup::{
    CreatePaymentSetupCommand, CreatePaymentSetupHandler, CreatePaymentSetupResult,
};
pub use reactivate_membership::{
    ReactivateMembershipCommand, ReactivateMembershipHandler, ReactivateMembershipResult,
};
pub use send_plan::{SendPlanCommand, SendPlanHandler, SendPlanResult};
pub use upsert_plan::{UpsertPlanCommand, UpsertPlanHandler, UpsertPlanResult};

// Queries
pub use get_or_default::{
    GetOrDefaultMembershipCommand, GetOrDefaultMembershipHandler, GetOrDefaultMembershipResult,
};
pub use list_memberships::{ListMembershipsHandler, ListMembershipsQuery, ListMembershipsResult};
