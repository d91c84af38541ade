//! Find-or-create support shared by membership handlers.
//!
//! Creation races with other writers on the same (client, operator) key:
//! the store's unique constraint decides the winner, and the loser
//! re-reads until the winning row becomes visible.

use std::time::Duration;

use crate::domain::foundation::{ClientId, ErrorCode, OperatorId};
use crate::domain::membership::{Membership, MembershipError};
use crate::ports::MembershipStore;

/// Re-read attempts after losing a creation race. The first attempt is
/// immediate; later attempts wait for the delays below.
const RELOAD_ATTEMPTS: usize = 3;
const RELOAD_DELAYS: [Duration; 2] = [Duration::from_millis(100), Duration::from_millis(200)];

/// Return the existing membership for the key, creating a NotConfigured
/// one when none exists. The bool reports whether this call created it.
///
/// # Errors
///
/// Returns `Internal` when the winning row of a lost creation race never
/// becomes visible, or on store failure.
pub(crate) async fn ensure_membership(
    store: &dyn MembershipStore,
    client_id: &ClientId,
    operator_id: &OperatorId,
) -> Result<(Membership, bool), MembershipError> {
    if let Some(existing) = store
        .find_by_client_and_operator(client_id, operator_id)
        .await?
    {
        return Ok((existing, false));
    }

    let membership = Membership::not_configured(client_id.clone(), operator_id.clone());
    match store.insert(&membership).await {
        Ok(()) => Ok((membership, true)),
        Err(err) if err.code == ErrorCode::AlreadyExists => {
            tracing::debug!(
                client_id = %client_id,
                "Lost membership creation race, re-reading"
            );
            let existing = reload_after_conflict(store, client_id, operator_id).await?;
            Ok((existing, false))
        }
        Err(err) => Err(err.into()),
    }
}

async fn reload_after_conflict(
    store: &dyn MembershipStore,
    client_id: &ClientId,
    operator_id: &OperatorId,
) -> Result<Membership, MembershipError> {
    for attempt in 0..RELOAD_ATTEMPTS {
        if attempt > 0 {
            tokio::time::sleep(RELOAD_DELAYS[attempt - 1]).await;
        }
        if let Some(found) = store
            .find_by_client_and_operator(client_id, operator_id)
            .await?
        {
            return Ok(found);
        }
    }

    tracing::error!(
        client_id = %client_id,
        operator_id = %operator_id,
        "Membership still not visible after losing creation race"
    );
    Err(MembershipError::internal(format!(
        "membership for client {} not visible after concurrent create",
        client_id
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::DomainError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Store whose insert always loses the race; the record becomes
    /// visible only after `visible_after_finds` lookups.
    struct RacingStore {
        finds: AtomicUsize,
        visible_after_finds: usize,
        record: Membership,
        inserts: Mutex<Vec<Membership>>,
    }

    impl RacingStore {
        fn new(record: Membership, visible_after_finds: usize) -> Self {
            Self {
                finds: AtomicUsize::new(0),
                visible_after_finds,
                record,
                inserts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MembershipStore for RacingStore {
        async fn insert(&self, membership: &Membership) -> Result<(), DomainError> {
            self.inserts.lock().unwrap().push(membership.clone());
            Err(DomainError::new(
                ErrorCode::AlreadyExists,
                "duplicate key value violates unique constraint",
            ))
        }

        async fn update(&self, _membership: &Membership) -> Result<(), DomainError> {
            Ok(())
        }

        async fn find_by_client_and_operator(
            &self,
            _client_id: &ClientId,
            _operator_id: &OperatorId,
        ) -> Result<Option<Membership>, DomainError> {
            let seen = self.finds.fetch_add(1, Ordering::SeqCst) + 1;
            if seen > self.visible_after_finds {
                Ok(Some(self.record.clone()))
            } else {
                Ok(None)
            }
        }

        async fn list_by_operator(
            &self,
            _operator_id: &OperatorId,
        ) -> Result<Vec<Membership>, DomainError> {
            Ok(vec![])
        }
    }

    struct EmptyStore {
        inserted: Mutex<Vec<Membership>>,
    }

    impl EmptyStore {
        fn new() -> Self {
            Self {
                inserted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MembershipStore for EmptyStore {
        async fn insert(&self, membership: &Membership) -> Result<(), DomainError> {
            self.inserted.lock().unwrap().push(membership.clone());
            Ok(())
        }

        async fn update(&self, _membership: &Membership) -> Result<(), DomainError> {
            Ok(())
        }

        async fn find_by_client_and_operator(
            &self,
            _client_id: &ClientId,
            _operator_id: &OperatorId,
        ) -> Result<Option<Membership>, DomainError> {
            let inserted = self.inserted.lock().unwrap();
            Ok(inserted.first().cloned())
        }

        async fn list_by_operator(
            &self,
            _operator_id: &OperatorId,
        ) -> Result<Vec<Membership>, DomainError> {
            Ok(vec![])
        }
    }

    fn client_id() -> ClientId {
        ClientId::new("client-race").unwrap()
    }

    fn operator_id() -> OperatorId {
        OperatorId::new("op-race").unwrap()
    }

    #[tokio::test]
    async fn creates_when_absent() {
        let store = EmptyStore::new();

        let (membership, created) = ensure_membership(&store, &client_id(), &operator_id())
            .await
            .unwrap();

        assert!(created);
        assert_eq!(membership.client_id, client_id());
        assert_eq!(store.inserted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn returns_existing_without_insert() {
        let store = EmptyStore::new();
        let existing = Membership::not_configured(client_id(), operator_id());
        store.inserted.lock().unwrap().push(existing.clone());

        let (membership, created) = ensure_membership(&store, &client_id(), &operator_id())
            .await
            .unwrap();

        assert!(!created);
        assert_eq!(membership.id, existing.id);
        // No second insert happened.
        assert_eq!(store.inserted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reloads_after_losing_creation_race() {
        let winner = Membership::not_configured(client_id(), operator_id());
        // First find misses (triggering the insert), second find during
        // reload hits.
        let store = RacingStore::new(winner.clone(), 1);

        let (membership, created) = ensure_membership(&store, &client_id(), &operator_id())
            .await
            .unwrap();

        assert!(!created);
        assert_eq!(membership.id, winner.id);
    }

    #[tokio::test]
    async fn reload_retries_until_row_visible() {
        let winner = Membership::not_configured(client_id(), operator_id());
        // Initial miss + two reload misses; visible on the third reload.
        let store = RacingStore::new(winner.clone(), 3);

        let (membership, created) = ensure_membership(&store, &client_id(), &operator_id())
            .await
            .unwrap();

        assert!(!created);
        assert_eq!(membership.id, winner.id);
        assert_eq!(store.finds.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn fails_when_row_never_becomes_visible() {
        let winner = Membership::not_configured(client_id(), operator_id());
        let store = RacingStore::new(winner, usize::MAX);

        let result = ensure_membership(&store, &client_id(), &operator_id()).await;

        assert!(matches!(result, Err(MembershipError::Internal(_))));
    }
}
