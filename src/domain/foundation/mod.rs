//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, the timestamp value object, and error types
//! that form the vocabulary of the membership domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ClientId, MembershipId, OperatorId};
pub use timestamp::Timestamp;
