//! MembershipLifecycle - the single entry point for membership operations.
//!
//! Wires every handler behind one facade, resolves operators through the
//! auth port, and serializes mutations per (client, operator) key so
//! concurrent read-modify-write cycles cannot clobber each other.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::application::handlers::membership::{
    AttachPaymentMethodCommand, AttachPaymentMethodHandler, CancelMembershipCommand,
    CancelMembershipHandler, CreatePaymentSetupCommand, CreatePaymentSetupHandler,
    GetOrDefaultMembershipCommand, GetOrDefaultMembershipHandler, ListMembershipsHandler,
    ListMembershipsQuery, ReactivateMembershipCommand, ReactivateMembershipHandler,
    SendPlanCommand, SendPlanHandler, UpsertPlanCommand, UpsertPlanHandler,
};
use crate::application::NotificationDispatcher;
use crate::domain::foundation::{ClientId, OperatorId};
use crate::domain::membership::{MembershipError, MembershipView, PaymentSetupView};
use crate::ports::{AuthError, AuthProvider, MembershipStore, PaymentGatewayClient};

/// Per-key mutexes serializing mutations of a single membership.
///
/// Entries are created on first touch and never evicted; the key space
/// is bounded by the operators' client lists.
struct KeyedLocks {
    locks: Mutex<HashMap<(ClientId, OperatorId), Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn acquire(
        &self,
        client_id: &ClientId,
        operator_id: &OperatorId,
    ) -> OwnedMutexGuard<()> {
        let entry = {
            let mut locks = self.locks.lock().await;
            locks
                .entry((client_id.clone(), operator_id.clone()))
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        entry.lock_owned().await
    }
}

/// Facade over the membership lifecycle.
///
/// Every mutating operation takes the per-key lock before touching the
/// store; reads that cannot write (listing) skip it. Results are view
/// models, ready for serialization at whatever surface sits above.
pub struct MembershipLifecycle {
    auth: Arc<dyn AuthProvider>,
    get_or_default: GetOrDefaultMembershipHandler,
    list: ListMembershipsHandler,
    upsert_plan: UpsertPlanHandler,
    send_plan: SendPlanHandler,
    attach_payment_method: AttachPaymentMethodHandler,
    cancel: CancelMembershipHandler,
    reactivate: ReactivateMembershipHandler,
    create_payment_setup: CreatePaymentSetupHandler,
    locks: KeyedLocks,
}

impl MembershipLifecycle {
    pub fn new(
        store: Arc<dyn MembershipStore>,
        auth: Arc<dyn AuthProvider>,
        dispatcher: Arc<NotificationDispatcher>,
        gateway: Option<Arc<dyn PaymentGatewayClient>>,
        publishable_key: Option<String>,
        merchant_name: String,
    ) -> Self {
        Self {
            auth,
            get_or_default: GetOrDefaultMembershipHandler::new(store.clone()),
            list: ListMembershipsHandler::new(store.clone()),
            upsert_plan: UpsertPlanHandler::new(store.clone()),
            send_plan: SendPlanHandler::new(store.clone(), dispatcher),
            attach_payment_method: AttachPaymentMethodHandler::new(
                store.clone(),
                gateway.clone(),
            ),
            cancel: CancelMembershipHandler::new(store.clone()),
            reactivate: ReactivateMembershipHandler::new(store),
            create_payment_setup: CreatePaymentSetupHandler::new(
                gateway,
                publishable_key,
                merchant_name,
            ),
            locks: KeyedLocks::new(),
        }
    }

    /// Resolve a request credential to the operator it belongs to.
    pub async fn resolve_operator(
        &self,
        credential: &str,
    ) -> Result<OperatorId, MembershipError> {
        self.auth
            .resolve_operator(credential)
            .await
            .map_err(|err| match err {
                AuthError::MissingCredential | AuthError::UnknownOperator => {
                    MembershipError::validation("credential", err.to_string())
                }
                AuthError::Unavailable(detail) => {
                    tracing::error!(error = %detail, "Auth provider unavailable");
                    MembershipError::internal(detail)
                }
            })
    }

    /// Fetch a client's membership, materializing a default record on
    /// first read.
    pub async fn get_or_default(
        &self,
        cmd: GetOrDefaultMembershipCommand,
    ) -> Result<MembershipView, MembershipError> {
        // May insert, so it serializes like a mutation.
        let _guard = self.locks.acquire(&cmd.client_id, &cmd.operator_id).await;
        let result = self.get_or_default.handle(cmd).await?;
        Ok(MembershipView::from(&result.membership))
    }

    /// List every membership under an operator.
    pub async fn list(
        &self,
        query: ListMembershipsQuery,
    ) -> Result<Vec<MembershipView>, MembershipError> {
        let result = self.list.handle(query).await?;
        Ok(result.memberships.iter().map(MembershipView::from).collect())
    }

    /// Create or replace a membership's plan.
    pub async fn upsert_plan(
        &self,
        cmd: UpsertPlanCommand,
    ) -> Result<MembershipView, MembershipError> {
        let _guard = self.locks.acquire(&cmd.client_id, &cmd.operator_id).await;
        let result = self.upsert_plan.handle(cmd).await?;
        Ok(MembershipView::from(&result.membership))
    }

    /// Deliver the plan to the client over a notification channel.
    pub async fn send_plan(
        &self,
        cmd: SendPlanCommand,
    ) -> Result<MembershipView, MembershipError> {
        let _guard = self.locks.acquire(&cmd.client_id, &cmd.operator_id).await;
        let result = self.send_plan.handle(cmd).await?;
        Ok(MembershipView::from(&result.membership))
    }

    /// Attach a payment method, activating the membership when payment
    /// was the last missing piece.
    pub async fn attach_payment_method(
        &self,
        cmd: AttachPaymentMethodCommand,
    ) -> Result<MembershipView, MembershipError> {
        let _guard = self.locks.acquire(&cmd.client_id, &cmd.operator_id).await;
        let result = self.attach_payment_method.handle(cmd).await?;
        Ok(MembershipView::from(&result.membership))
    }

    /// Cancel a membership. Idempotent.
    pub async fn cancel(
        &self,
        cmd: CancelMembershipCommand,
    ) -> Result<MembershipView, MembershipError> {
        let _guard = self.locks.acquire(&cmd.client_id, &cmd.operator_id).await;
        let result = self.cancel.handle(cmd).await?;
        Ok(MembershipView::from(&result.membership))
    }

    /// Reactivate a cancelled membership.
    pub async fn reactivate(
        &self,
        cmd: ReactivateMembershipCommand,
    ) -> Result<MembershipView, MembershipError> {
        let _guard = self.locks.acquire(&cmd.client_id, &cmd.operator_id).await;
        let result = self.reactivate.handle(cmd).await?;
        Ok(MembershipView::from(&result.membership))
    }

    /// Create a payment gateway setup session for card collection.
    ///
    /// Touches no membership state, so no lock is taken.
    pub async fn create_payment_setup(
        &self,
        cmd: CreatePaymentSetupCommand,
    ) -> Result<PaymentSetupView, MembershipError> {
        let result = self.create_payment_setup.handle(cmd).await?;
        Ok(result.setup)
    }
}
