//! In-Memory Membership Store Adapter
//!
//! Keeps memberships in a process-local map. Useful for testing and
//! development; enforces the same (client, operator) uniqueness as the
//! PostgreSQL store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{ClientId, DomainError, ErrorCode, OperatorId};
use crate::domain::membership::Membership;
use crate::ports::MembershipStore;

/// In-memory store for membership aggregates.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMembershipStore {
    records: Arc<RwLock<HashMap<(ClientId, OperatorId), Membership>>>,
}

impl InMemoryMembershipStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored memberships (useful for tests).
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    /// Get the number of stored memberships.
    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl MembershipStore for InMemoryMembershipStore {
    async fn insert(&self, membership: &Membership) -> Result<(), DomainError> {
        let key = (membership.client_id.clone(), membership.operator_id.clone());
        let mut records = self.records.write().await;
        if records.contains_key(&key) {
            return Err(DomainError::new(
                ErrorCode::AlreadyExists,
                "Client already has a membership under this operator",
            ));
        }
        records.insert(key, membership.clone());
        Ok(())
    }

    async fn update(&self, membership: &Membership) -> Result<(), DomainError> {
        let key = (membership.client_id.clone(), membership.operator_id.clone());
        let mut records = self.records.write().await;
        match records.get_mut(&key) {
            Some(existing) => {
                *existing = membership.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::MembershipNotFound,
                "Membership not found",
            )),
        }
    }

    async fn find_by_client_and_operator(
        &self,
        client_id: &ClientId,
        operator_id: &OperatorId,
    ) -> Result<Option<Membership>, DomainError> {
        let records = self.records.read().await;
        Ok(records
            .get(&(client_id.clone(), operator_id.clone()))
            .cloned())
    }

    async fn list_by_operator(
        &self,
        operator_id: &OperatorId,
    ) -> Result<Vec<Membership>, DomainError> {
        let records = self.records.read().await;
        let mut memberships: Vec<Membership> = records
            .values()
            .filter(|m| &m.operator_id == operator_id)
            .cloned()
            .collect();
        memberships.sort_by_key(|m| m.created_at);
        Ok(memberships)
    }
}
