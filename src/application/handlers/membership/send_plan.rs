//! SendPlanHandler - delivers the saved plan to the client.

use std::sync::Arc;

use crate::application::{ContactDetails, NotificationDispatcher};
use crate::domain::foundation::{ClientId, OperatorId};
use crate::domain::membership::{Membership, MembershipError};
use crate::ports::{MembershipStore, PlanNotification};

/// Command to send a membership's plan over a notification channel.
///
/// `channel` overrides the plan's stored channel for this send only;
/// when it differs from the stored value it also becomes the new stored
/// channel.
#[derive(Debug, Clone)]
pub struct SendPlanCommand {
    pub client_id: ClientId,
    pub operator_id: OperatorId,
    pub channel: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub client_name: Option<String>,
}

/// Result of a plan send.
#[derive(Debug, Clone)]
pub struct SendPlanResult {
    pub membership: Membership,
    /// Whether the provider accepted the message. Informational; the
    /// attempt is recorded on the membership regardless.
    pub delivered: bool,
    /// The channel the send actually used.
    pub channel: String,
}

/// Handler for plan delivery.
pub struct SendPlanHandler {
    store: Arc<dyn MembershipStore>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl SendPlanHandler {
    pub fn new(store: Arc<dyn MembershipStore>, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { store, dispatcher }
    }

    pub async fn handle(&self, cmd: SendPlanCommand) -> Result<SendPlanResult, MembershipError> {
        // 1. Load the membership; sending requires an existing record
        let mut membership = self
            .store
            .find_by_client_and_operator(&cmd.client_id, &cmd.operator_id)
            .await?
            .ok_or_else(|| MembershipError::not_found(&cmd.client_id, &cmd.operator_id))?;

        // 2. A send from an unusual status is allowed, but worth a trace
        if membership.delivery_is_anomalous() {
            tracing::warn!(
                client_id = %cmd.client_id,
                status = membership.status.as_str(),
                "Sending plan from an unexpected membership status"
            );
        }

        // 3. Resolve the plan and the effective channel
        let (notification, effective_channel) = {
            let plan = membership.plan_for_delivery()?;
            let channel = cmd
                .channel
                .clone()
                .unwrap_or_else(|| plan.channel.clone());
            (PlanNotification::from(plan), channel)
        };

        // 4. Best-effort delivery; failures never abort the operation
        let contact = ContactDetails {
            email: cmd.client_email,
            phone: cmd.client_phone,
            name: cmd.client_name,
        };
        let delivered = self
            .dispatcher
            .dispatch(&effective_channel, &contact, &notification)
            .await;

        // 5. Record the attempt; status is deliberately left alone
        membership.record_plan_delivery(&effective_channel);
        self.store.update(&membership).await?;

        tracing::info!(
            client_id = %cmd.client_id,
            channel = %effective_channel,
            delivered = delivered,
            "Plan sent to client"
        );

        Ok(SendPlanResult {
            membership,
            delivered,
            channel: effective_channel,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::DomainError;
    use crate::domain::membership::{MembershipStatus, PlanTerms};
    use crate::ports::EmailProvider;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;
    use std::time::Duration;

    struct MockStore {
        memberships: Mutex<Vec<Membership>>,
    }

    impl MockStore {
        fn with_membership(membership: Membership) -> Self {
            Self {
                memberships: Mutex::new(vec![membership]),
            }
        }

        fn empty() -> Self {
            Self {
                memberships: Mutex::new(Vec::new()),
            }
        }

        fn stored(&self) -> Vec<Membership> {
            self.memberships.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MembershipStore for MockStore {
        async fn insert(&self, membership: &Membership) -> Result<(), DomainError> {
            self.memberships.lock().unwrap().push(membership.clone());
            Ok(())
        }

        async fn update(&self, membership: &Membership) -> Result<(), DomainError> {
            let mut memberships = self.memberships.lock().unwrap();
            if let Some(m) = memberships.iter_mut().find(|m| m.id == membership.id) {
                *m = membership.clone();
            }
            Ok(())
        }

        async fn find_by_client_and_operator(
            &self,
            client_id: &ClientId,
            operator_id: &OperatorId,
        ) -> Result<Option<Membership>, DomainError> {
            let memberships = self.memberships.lock().unwrap();
            Ok(memberships
                .iter()
                .find(|m| &m.client_id == client_id && &m.operator_id == operator_id)
                .cloned())
        }

        async fn list_by_operator(
            &self,
            _operator_id: &OperatorId,
        ) -> Result<Vec<Membership>, DomainError> {
            Ok(vec![])
        }
    }

    struct RecordingEmail {
        sends: Mutex<Vec<String>>,
    }

    impl RecordingEmail {
        fn new() -> Self {
            Self {
                sends: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl EmailProvider for RecordingEmail {
        async fn send_plan(&self, to: &str, _client_name: &str, _plan: &PlanNotification) -> bool {
            self.sends.lock().unwrap().push(to.to_string());
            true
        }
    }

    fn client_id() -> ClientId {
        ClientId::new("client-send").unwrap()
    }

    fn operator_id() -> OperatorId {
        OperatorId::new("op-send").unwrap()
    }

    fn drafted_membership(channel: &str) -> Membership {
        let mut membership = Membership::not_configured(client_id(), operator_id());
        membership.upsert_plan(
            PlanTerms::new(dec!(49.99), "USD", 15, channel, None).unwrap(),
        );
        membership
    }

    fn email_dispatcher(provider: Arc<RecordingEmail>) -> Arc<NotificationDispatcher> {
        Arc::new(NotificationDispatcher::new(
            Some(provider),
            None,
            Duration::from_secs(2),
        ))
    }

    fn send_command() -> SendPlanCommand {
        SendPlanCommand {
            client_id: client_id(),
            operator_id: operator_id(),
            channel: None,
            client_email: Some("client@example.com".to_string()),
            client_phone: Some("+15550001111".to_string()),
            client_name: Some("Jane Doe".to_string()),
        }
    }

    #[tokio::test]
    async fn sends_over_stored_channel_and_stamps_last_sent() {
        let store = Arc::new(MockStore::with_membership(drafted_membership("email")));
        let provider = Arc::new(RecordingEmail::new());
        let handler = SendPlanHandler::new(store.clone(), email_dispatcher(provider.clone()));

        let result = handler.handle(send_command()).await.unwrap();

        assert!(result.delivered);
        assert_eq!(result.channel, "email");
        // A send never mutates status.
        assert_eq!(result.membership.status, MembershipStatus::PlanDraft);
        assert!(result.membership.last_sent_at.is_some());
        assert_eq!(provider.sends.lock().unwrap().len(), 1);
        let stored = store.stored();
        assert_eq!(stored[0].status, MembershipStatus::PlanDraft);
        assert!(stored[0].last_sent_at.is_some());
    }

    #[tokio::test]
    async fn channel_override_is_used_and_persisted() {
        let store = Arc::new(MockStore::with_membership(drafted_membership("sms")));
        let provider = Arc::new(RecordingEmail::new());
        let handler = SendPlanHandler::new(store.clone(), email_dispatcher(provider.clone()));

        let mut cmd = send_command();
        cmd.channel = Some("email".to_string());
        let result = handler.handle(cmd).await.unwrap();

        assert!(result.delivered);
        assert_eq!(result.channel, "email");
        assert_eq!(result.membership.plan.as_ref().unwrap().channel, "email");
        assert_eq!(provider.sends.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn matching_override_leaves_stored_channel_unchanged() {
        let store = Arc::new(MockStore::with_membership(drafted_membership("email")));
        let provider = Arc::new(RecordingEmail::new());
        let handler = SendPlanHandler::new(store, email_dispatcher(provider));

        let mut cmd = send_command();
        cmd.channel = Some("email".to_string());
        let result = handler.handle(cmd).await.unwrap();

        assert_eq!(result.membership.plan.as_ref().unwrap().channel, "email");
    }

    #[tokio::test]
    async fn fails_when_no_plan_saved() {
        let bare = Membership::not_configured(client_id(), operator_id());
        let store = Arc::new(MockStore::with_membership(bare));
        let provider = Arc::new(RecordingEmail::new());
        let handler = SendPlanHandler::new(store.clone(), email_dispatcher(provider.clone()));

        let result = handler.handle(send_command()).await;

        assert!(matches!(result, Err(MembershipError::InvalidState { .. })));
        // No send was attempted and nothing changed.
        assert!(provider.sends.lock().unwrap().is_empty());
        assert_eq!(store.stored()[0].status, MembershipStatus::NotConfigured);
    }

    #[tokio::test]
    async fn fails_when_membership_missing() {
        let store = Arc::new(MockStore::empty());
        let handler = SendPlanHandler::new(store, email_dispatcher(Arc::new(RecordingEmail::new())));

        let result = handler.handle(send_command()).await;

        assert!(matches!(result, Err(MembershipError::NotFound { .. })));
    }

    #[tokio::test]
    async fn resend_from_active_is_allowed() {
        let mut membership = drafted_membership("email");
        membership.status = MembershipStatus::Active;
        let store = Arc::new(MockStore::with_membership(membership));
        let provider = Arc::new(RecordingEmail::new());
        let handler = SendPlanHandler::new(store.clone(), email_dispatcher(provider.clone()));

        let result = handler.handle(send_command()).await.unwrap();

        assert!(result.delivered);
        assert_eq!(result.membership.status, MembershipStatus::Active);
        assert_eq!(provider.sends.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delivery_failure_still_records_the_attempt() {
        let store = Arc::new(MockStore::with_membership(drafted_membership("email")));
        // No providers wired at all.
        let handler = SendPlanHandler::new(store.clone(), Arc::new(NotificationDispatcher::disabled()));

        let result = handler.handle(send_command()).await.unwrap();

        assert!(!result.delivered);
        assert_eq!(result.membership.status, MembershipStatus::PlanDraft);
        assert!(result.membership.last_sent_at.is_some());
        assert!(store.stored()[0].last_sent_at.is_some());
    }

    #[tokio::test]
    async fn missing_contact_details_fail_delivery_but_not_operation() {
        let store = Arc::new(MockStore::with_membership(drafted_membership("email")));
        let provider = Arc::new(RecordingEmail::new());
        let handler = SendPlanHandler::new(store, email_dispatcher(provider.clone()));

        let mut cmd = send_command();
        cmd.client_email = None;
        let result = handler.handle(cmd).await.unwrap();

        assert!(!result.delivered);
        assert!(result.membership.last_sent_at.is_some());
        assert!(provider.sends.lock().unwrap().is_empty());
    }
}
