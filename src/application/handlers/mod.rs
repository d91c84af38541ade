//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod membership;

pub use membership::{
    // Commands
    AttachPaymentMethodCommand, AttachPaymentMethodHandler, AttachPaymentMethodResult,
    CancelMembershipCommand, CancelMembershipHandler, CancelMembershipResult,
    CreatePaymentSetupCommand, CreatePaymentSetupHandler, CreatePaymentSetupResult,
    ReactivateMembershipCommand, ReactivateMembershipHandler, ReactivateMembershipResult,
    SendPlanCommand, SendPlanHandler, SendPlanResult,
    UpsertPlanCommand, UpsertPlanHandler, UpsertPlanResult,
    // Queries
    GetOrDefaultMembershipCommand, GetOrDefaultMembershipHandler, GetOrDefaultMembershipResult,
    ListMembershipsHandler, ListMembershipsQuery, ListMembershipsResult,
};
