//! Membership store port.
//!
//! Defines the contract for persisting and retrieving Membership
//! aggregates. Implementations handle the actual database operations.
//!
//! # Design
//!
//! - **Create vs update are distinct commands**: the lifecycle layer
//!   decides which one applies before calling the store; the store never
//!   infers it from record shape
//! - **Unique constraint**: one membership per (client, operator) pair,
//!   surfaced as `AlreadyExists` on insert
//!
//! # Example
//!
//! ```ignore
//! async fn ensure_membership(
//!     store: &dyn MembershipStore,
//!     client_id: &ClientId,
//!     operator_id: &OperatorId,
//! ) -> Result<Membership, DomainError> {
//!     if let Some(existing) = store
//!         .find_by_client_and_operator(client_id, operator_id)
//!         .await?
//!     {
//!         return Ok(existing);
//!     }
//!
//!     let membership = Membership::not_configured(client_id.clone(), operator_id.clone());
//!     store.insert(&membership).await?;
//!     Ok(membership)
//! }
//! ```

use crate::domain::foundation::{ClientId, DomainError, OperatorId};
use crate::domain::membership::Membership;
use async_trait::async_trait;

/// Store port for Membership aggregate persistence.
///
/// Implementations must ensure:
/// - Unique (client_id, operator_id) constraint
/// - `insert` fails with `AlreadyExists` when another writer created the
///   row first, so callers can re-read instead of failing the operation
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Insert a brand-new membership.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if a membership for this (client, operator)
    ///   pair was created concurrently
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, membership: &Membership) -> Result<(), DomainError>;

    /// Update an existing membership.
    ///
    /// # Errors
    ///
    /// - `MembershipNotFound` if the membership doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, membership: &Membership) -> Result<(), DomainError>;

    /// Find the membership for a client under an operator.
    ///
    /// Returns `None` if not found. This is the primary lookup since each
    /// pair has at most one membership.
    async fn find_by_client_and_operator(
        &self,
        client_id: &ClientId,
        operator_id: &OperatorId,
    ) -> Result<Option<Membership>, DomainError>;

    /// List every membership belonging to an operator.
    ///
    /// Ordering is stable per store implementation (by creation time).
    async fn list_by_operator(
        &self,
        operator_id: &OperatorId,
    ) -> Result<Vec<Membership>, DomainError>;
}
