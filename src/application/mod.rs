//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).
//! The [`MembershipLifecycle`] facade fronts the whole layer and adds per-key
//! write serialization.

pub mod handlers;

mod lifecycle;
mod notification_dispatcher;

pub use lifecycle::MembershipLifecycle;
pub use notification_dispatcher::{ContactDetails, NotificationDispatcher};

pub use handlers::{
    // Membership commands
    AttachPaymentMethodCommand, AttachPaymentMethodHandler, AttachPaymentMethodResult,
    CancelMembershipCommand, CancelMembershipHandler, CancelMembershipResult,
    CreatePaymentSetupCommand, CreatePaymentSetupHandler, CreatePaymentSetupResult,
    ReactivateMembershipCommand, ReactivateMembershipHandler, ReactivateMembershipResult,
    SendPlanCommand, SendPlanHandler, SendPlanResult,
    UpsertPlanCommand, UpsertPlanHandler, UpsertPlanResult,
    // Membership queries
    GetOrDefaultMembershipCommand, GetOrDefaultMembershipHandler, GetOrDefaultMembershipResult,
    ListMembershipsHandler, ListMembershipsQuery, ListMembershipsResult,
};
