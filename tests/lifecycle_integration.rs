//! Integration tests for the membership lifecycle.
//!
//! These tests drive the full application layer over the in-memory store:
//! 1. Operator resolution through the auth port
//! 2. Plan configuration, delivery, and payment capture
//! 3. Cancellation and reactivation
//! 4. Per-key serialization of concurrent mutations
//!
//! Uses in-memory implementations to exercise the flows without external
//! dependencies.

use async_trait::async_trait;
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use membership_manager::adapters::{
    InMemoryMembershipStore, MockPaymentGateway, TrustedAuthProvider,
};
use membership_manager::application::{
    AttachPaymentMethodCommand, CancelMembershipCommand, CreatePaymentSetupCommand,
    GetOrDefaultMembershipCommand, ListMembershipsQuery, MembershipLifecycle,
    NotificationDispatcher, ReactivateMembershipCommand, SendPlanCommand, UpsertPlanCommand,
};
use membership_manager::domain::foundation::{ClientId, OperatorId};
use membership_manager::domain::membership::{
    Membership, MembershipError, MembershipStatus, PlanTerms,
};
use membership_manager::ports::{
    EmailProvider, GatewayPaymentMethod, MembershipStore, PaymentGatewayClient, PlanNotification,
    SmsProvider,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Email provider that records sends instead of calling out.
#[derive(Default)]
struct RecordingEmail {
    sends: Mutex<Vec<(String, String)>>,
    reject: bool,
}

impl RecordingEmail {
    fn rejecting() -> Self {
        Self {
            sends: Mutex::new(Vec::new()),
            reject: true,
        }
    }

    fn sends(&self) -> Vec<(String, String)> {
        self.sends.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailProvider for RecordingEmail {
    async fn send_plan(&self, to: &str, client_name: &str, _plan: &PlanNotification) -> bool {
        self.sends
            .lock()
            .unwrap()
            .push((to.to_string(), client_name.to_string()));
        !self.reject
    }
}

/// SMS provider that records sends instead of calling out.
#[derive(Default)]
struct RecordingSms {
    sends: Mutex<Vec<String>>,
}

impl RecordingSms {
    fn sends(&self) -> Vec<String> {
        self.sends.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsProvider for RecordingSms {
    async fn send_plan(&self, to: &str, _client_name: &str, _plan: &PlanNotification) -> bool {
        self.sends.lock().unwrap().push(to.to_string());
        true
    }
}

struct Harness {
    lifecycle: MembershipLifecycle,
    store: InMemoryMembershipStore,
    email: Arc<RecordingEmail>,
    sms: Arc<RecordingSms>,
    gateway: Option<MockPaymentGateway>,
}

fn harness() -> Harness {
    harness_with(Arc::new(RecordingEmail::default()), None)
}

fn harness_with(email: Arc<RecordingEmail>, gateway: Option<MockPaymentGateway>) -> Harness {
    init_tracing();

    let store = InMemoryMembershipStore::new();
    let sms = Arc::new(RecordingSms::default());
    let dispatcher = Arc::new(NotificationDispatcher::new(
        Some(email.clone() as Arc<dyn EmailProvider>),
        Some(sms.clone() as Arc<dyn SmsProvider>),
        Duration::from_secs(2),
    ));
    let gateway_port = gateway
        .clone()
        .map(|g| Arc::new(g) as Arc<dyn PaymentGatewayClient>);

    let lifecycle = MembershipLifecycle::new(
        Arc::new(store.clone()),
        Arc::new(TrustedAuthProvider::new()),
        dispatcher,
        gateway_port,
        Some("pk_test_abc".to_string()),
        "Membership Manager".to_string(),
    );

    Harness {
        lifecycle,
        store,
        email,
        sms,
        gateway,
    }
}

fn client(id: &str) -> ClientId {
    ClientId::new(id).unwrap()
}

fn operator() -> OperatorId {
    OperatorId::new("op-1").unwrap()
}

fn plan_command(client_id: &str) -> UpsertPlanCommand {
    UpsertPlanCommand {
        client_id: client(client_id),
        operator_id: operator(),
        amount: dec!(49.99),
        currency: Some("USD".to_string()),
        billing_day: 15,
        channel: "email".to_string(),
        message: Some("Monthly maintenance".to_string()),
    }
}

fn attach_command(client_id: &str) -> AttachPaymentMethodCommand {
    AttachPaymentMethodCommand {
        client_id: client(client_id),
        operator_id: operator(),
        payment_method_id: None,
        card_number: Some("4242 4242 4242 4242".to_string()),
        exp_month: Some(11),
        exp_year: Some(2028),
        cvv: None,
        holder_name: Some("Ana Torres".to_string()),
        requester_email: None,
    }
}

// =============================================================================
// Lifecycle Flows
// =============================================================================

#[tokio::test]
async fn full_lifecycle_from_first_contact_to_reactivation() {
    let h = harness();

    // First observation materializes an unconfigured record.
    let view = h
        .lifecycle
        .get_or_default(GetOrDefaultMembershipCommand {
            client_id: client("client-1"),
            operator_id: operator(),
        })
        .await
        .unwrap();
    assert_eq!(view.status, "not_configured");

    // Configuring the plan moves it to draft.
    let view = h.lifecycle.upsert_plan(plan_command("client-1")).await.unwrap();
    assert_eq!(view.status, "plan_draft");
    assert_eq!(view.plan.as_ref().unwrap().amount, dec!(49.99));

    // Delivery stamps the attempt but leaves status alone.
    let view = h
        .lifecycle
        .send_plan(SendPlanCommand {
            client_id: client("client-1"),
            operator_id: operator(),
            channel: None,
            client_email: Some("ana@example.com".to_string()),
            client_phone: None,
            client_name: Some("Ana".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(view.status, "plan_draft");
    assert!(view.last_sent_at.is_some());
    assert_eq!(
        h.email.sends(),
        vec![("ana@example.com".to_string(), "Ana".to_string())]
    );

    // Payment capture stores the card. A draft is not awaiting payment,
    // so nothing activates yet.
    let view = h
        .lifecycle
        .attach_payment_method(attach_command("client-1"))
        .await
        .unwrap();
    assert_eq!(view.status, "plan_draft");
    let pm = view.payment_method.as_ref().unwrap();
    assert_eq!(pm.brand, "visa");
    assert_eq!(pm.last4, "4242");
    assert!(view.next_charge_at.is_none());

    // Cancel stops billing; reactivation needs only the stored plan and
    // card, and starts the billing clock.
    let view = h
        .lifecycle
        .cancel(CancelMembershipCommand {
            client_id: client("client-1"),
            operator_id: operator(),
            reason: Some("moving away".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(view.status, "cancelled");

    let view = h
        .lifecycle
        .reactivate(ReactivateMembershipCommand {
            client_id: client("client-1"),
            operator_id: operator(),
        })
        .await
        .unwrap();
    assert_eq!(view.status, "active");
    assert!(view.next_charge_at.is_some());

    assert_eq!(h.store.count().await, 1);
}

#[tokio::test]
async fn attach_activates_a_membership_awaiting_payment() {
    let h = harness();

    // Seeded records can carry the awaiting state even though no
    // operation produces it.
    let mut seeded = Membership::not_configured(client("client-1"), operator());
    seeded.upsert_plan(PlanTerms::new(dec!(49.99), "USD", 15, "email", None).unwrap());
    seeded.status = MembershipStatus::AwaitingPayment;
    h.store.insert(&seeded).await.unwrap();

    let view = h
        .lifecycle
        .attach_payment_method(attach_command("client-1"))
        .await
        .unwrap();

    assert_eq!(view.status, "active");
    assert!(view.next_charge_at.is_some());
    // The computed charge date falls on the plan's billing day.
    assert_eq!(
        chrono::Datelike::day(&view.next_charge_at.unwrap()),
        15
    );
}

#[tokio::test]
async fn channel_override_routes_to_sms() {
    let h = harness();

    h.lifecycle.upsert_plan(plan_command("client-1")).await.unwrap();

    let view = h
        .lifecycle
        .send_plan(SendPlanCommand {
            client_id: client("client-1"),
            operator_id: operator(),
            channel: Some("sms".to_string()),
            client_email: None,
            client_phone: Some("+15550100".to_string()),
            client_name: Some("Ana".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(h.sms.sends(), vec!["+15550100".to_string()]);
    assert!(h.email.sends().is_empty());
    // The stored channel follows the override.
    assert_eq!(view.plan.as_ref().unwrap().channel, "sms");
}

#[tokio::test]
async fn rejected_delivery_still_records_the_attempt() {
    let h = harness_with(Arc::new(RecordingEmail::rejecting()), None);

    h.lifecycle.upsert_plan(plan_command("client-1")).await.unwrap();

    let view = h
        .lifecycle
        .send_plan(SendPlanCommand {
            client_id: client("client-1"),
            operator_id: operator(),
            channel: None,
            client_email: Some("ana@example.com".to_string()),
            client_phone: None,
            client_name: Some("Ana".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(h.email.sends().len(), 1);
    assert!(view.last_sent_at.is_some());
    assert_eq!(view.status, "plan_draft");
}

#[tokio::test]
async fn sending_an_unconfigured_plan_fails() {
    let h = harness();

    h.lifecycle
        .get_or_default(GetOrDefaultMembershipCommand {
            client_id: client("client-1"),
            operator_id: operator(),
        })
        .await
        .unwrap();

    let result = h
        .lifecycle
        .send_plan(SendPlanCommand {
            client_id: client("client-1"),
            operator_id: operator(),
            channel: None,
            client_email: Some("ana@example.com".to_string()),
            client_phone: None,
            client_name: Some("Ana".to_string()),
        })
        .await;

    assert!(matches!(result, Err(MembershipError::InvalidState { .. })));
    assert!(h.email.sends().is_empty());
}

// =============================================================================
// Gateway Flows
// =============================================================================

#[tokio::test]
async fn gateway_attach_uses_the_registered_card() {
    let gateway = MockPaymentGateway::new();
    gateway.add_payment_method(GatewayPaymentMethod {
        id: "pm_77".to_string(),
        brand: Some("mastercard".to_string()),
        last4: Some("5100".to_string()),
        exp_month: Some(3),
        exp_year: Some(2030),
        holder_name: Some("Ana Torres".to_string()),
    });
    let h = harness_with(Arc::new(RecordingEmail::default()), Some(gateway));

    h.lifecycle.upsert_plan(plan_command("client-1")).await.unwrap();

    let view = h
        .lifecycle
        .attach_payment_method(AttachPaymentMethodCommand {
            client_id: client("client-1"),
            operator_id: operator(),
            payment_method_id: Some("pm_77".to_string()),
            card_number: None,
            exp_month: None,
            exp_year: None,
            cvv: None,
            holder_name: None,
            requester_email: Some("ana@example.com".to_string()),
        })
        .await
        .unwrap();

    let pm = view.payment_method.as_ref().unwrap();
    assert_eq!(pm.brand, "mastercard");
    assert_eq!(pm.last4, "5100");
    assert_eq!(pm.exp_year, 2030);

    let gateway = h.gateway.as_ref().unwrap();
    assert!(gateway.was_called("get_or_create_customer"));
    assert!(gateway.was_called("attach_payment_method"));
}

#[tokio::test]
async fn views_never_leak_the_gateway_reference() {
    let gateway = MockPaymentGateway::new();
    gateway.add_payment_method(GatewayPaymentMethod {
        id: "pm_secret_handle".to_string(),
        brand: Some("visa".to_string()),
        last4: Some("4242".to_string()),
        exp_month: Some(1),
        exp_year: Some(2030),
        holder_name: Some("Ana".to_string()),
    });
    let h = harness_with(Arc::new(RecordingEmail::default()), Some(gateway));

    h.lifecycle.upsert_plan(plan_command("client-1")).await.unwrap();
    let view = h
        .lifecycle
        .attach_payment_method(AttachPaymentMethodCommand {
            client_id: client("client-1"),
            operator_id: operator(),
            payment_method_id: Some("pm_secret_handle".to_string()),
            card_number: None,
            exp_month: None,
            exp_year: None,
            cvv: None,
            holder_name: None,
            requester_email: None,
        })
        .await
        .unwrap();

    let json = serde_json::to_string(&view).unwrap();
    assert!(!json.contains("pm_secret_handle"));
    assert!(json.contains("paymentMethod"));
}

#[tokio::test]
async fn payment_setup_serves_gateway_artifacts() {
    let gateway = MockPaymentGateway::new();
    let h = harness_with(Arc::new(RecordingEmail::default()), Some(gateway));

    let setup = h
        .lifecycle
        .create_payment_setup(CreatePaymentSetupCommand {
            client_id: client("client-1"),
            operator_id: operator(),
            requester_email: Some("ana@example.com".to_string()),
        })
        .await
        .unwrap();

    assert!(setup.customer_id.starts_with("cus_mock_"));
    assert!(setup.client_secret.contains("_secret"));
    assert_eq!(setup.publishable_key.as_deref(), Some("pk_test_abc"));
    assert_eq!(setup.merchant_name.as_deref(), Some("Membership Manager"));
}

#[tokio::test]
async fn payment_setup_without_gateway_falls_back_to_mock_artifacts() {
    let h = harness();

    let setup = h
        .lifecycle
        .create_payment_setup(CreatePaymentSetupCommand {
            client_id: client("client-1"),
            operator_id: operator(),
            requester_email: None,
        })
        .await
        .unwrap();

    assert!(setup.client_secret.starts_with("seti_mock_secret_"));
    assert_eq!(setup.customer_id, "client-1");
}

// =============================================================================
// Operator Resolution and Listing
// =============================================================================

#[tokio::test]
async fn credential_resolves_to_operator_and_scopes_the_listing() {
    let h = harness();

    let op = h.lifecycle.resolve_operator("op-1").await.unwrap();
    assert_eq!(op.as_str(), "op-1");

    h.lifecycle.upsert_plan(plan_command("client-a")).await.unwrap();
    h.lifecycle.upsert_plan(plan_command("client-b")).await.unwrap();
    h.lifecycle
        .upsert_plan(UpsertPlanCommand {
            operator_id: OperatorId::new("op-other").unwrap(),
            ..plan_command("client-c")
        })
        .await
        .unwrap();

    let listed = h
        .lifecycle
        .list(ListMembershipsQuery { operator_id: op })
        .await
        .unwrap();

    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|v| v.status == "plan_draft"));
}

#[tokio::test]
async fn blank_credential_is_a_validation_error() {
    let h = harness();

    let result = h.lifecycle.resolve_operator("  ").await;

    assert!(matches!(
        result,
        Err(MembershipError::ValidationFailed { .. })
    ));
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn concurrent_first_touches_materialize_one_record() {
    let h = harness();
    let lifecycle = Arc::new(h.lifecycle);

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let lifecycle = lifecycle.clone();
            tokio::spawn(async move {
                lifecycle
                    .get_or_default(GetOrDefaultMembershipCommand {
                        client_id: client("client-1"),
                        operator_id: operator(),
                    })
                    .await
            })
        })
        .collect();

    for task in futures::future::join_all(tasks).await {
        assert!(task.unwrap().is_ok());
    }

    assert_eq!(h.store.count().await, 1);
}

#[tokio::test]
async fn concurrent_mutations_of_different_clients_do_not_interfere() {
    let h = harness();
    let lifecycle = Arc::new(h.lifecycle);

    let tasks: Vec<_> = (0..4)
        .map(|i| {
            let lifecycle = lifecycle.clone();
            tokio::spawn(async move {
                lifecycle
                    .upsert_plan(plan_command(&format!("client-{}", i)))
                    .await
            })
        })
        .collect();

    for task in futures::future::join_all(tasks).await {
        assert!(task.unwrap().is_ok());
    }

    assert_eq!(h.store.count().await, 4);
}
