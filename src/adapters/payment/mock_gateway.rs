//! Mock payment gateway for testing and gateway-less deployments.
//!
//! Provides a configurable in-process implementation of
//! `PaymentGatewayClient`. Supports:
//! - Pre-configured responses
//! - Error injection
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::foundation::ClientId;
use crate::domain::membership::{normalize_card_number, CardBrand};
use crate::ports::{
    CardDetails, GatewayCustomer, GatewayEphemeralKey, GatewayPaymentMethod, GatewaySetupIntent,
    PaymentGatewayClient, PaymentGatewayError,
};

/// Mock payment gateway.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentGateway::new();
///
/// // Configure responses
/// mock.add_payment_method(GatewayPaymentMethod { id: "pm_1".into(), ... });
///
/// // Inject errors
/// mock.set_method_error("attach_payment_method", PaymentGatewayError::network("down"));
///
/// // Use in tests
/// let customer = mock.get_or_create_customer(&client_id, None, None).await?;
/// ```
#[derive(Default)]
pub struct MockPaymentGateway {
    /// Inner state (thread-safe for async tests).
    inner: Arc<Mutex<MockState>>,
}

/// Internal mutable state.
#[derive(Default)]
struct MockState {
    /// Customers keyed by the client id that owns them.
    customers: HashMap<String, GatewayCustomer>,

    /// Known payment methods by gateway id.
    payment_methods: HashMap<String, GatewayPaymentMethod>,

    /// Next customer to return.
    next_customer: Option<GatewayCustomer>,

    /// Next setup intent to return.
    next_setup_intent: Option<GatewaySetupIntent>,

    /// Next ephemeral key to return.
    next_ephemeral_key: Option<GatewayEphemeralKey>,

    /// Next payment method to return.
    next_payment_method: Option<GatewayPaymentMethod>,

    /// Error to return on next call.
    next_error: Option<PaymentGatewayError>,

    /// Specific errors by method name.
    method_errors: HashMap<String, PaymentGatewayError>,

    /// Track method calls for assertions.
    call_log: Vec<MethodCall>,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockPaymentGateway {
    /// Create a new mock gateway with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the customer to return on the next `get_or_create_customer` call.
    pub fn set_customer(&self, customer: GatewayCustomer) {
        self.inner.lock().unwrap().next_customer = Some(customer);
    }

    /// Set the setup intent to return.
    pub fn set_setup_intent(&self, intent: GatewaySetupIntent) {
        self.inner.lock().unwrap().next_setup_intent = Some(intent);
    }

    /// Set the ephemeral key to return.
    pub fn set_ephemeral_key(&self, key: GatewayEphemeralKey) {
        self.inner.lock().unwrap().next_ephemeral_key = Some(key);
    }

    /// Set the payment method to return on the next create or attach call.
    pub fn set_payment_method(&self, payment_method: GatewayPaymentMethod) {
        self.inner.lock().unwrap().next_payment_method = Some(payment_method);
    }

    /// Add a payment method to the "database".
    pub fn add_payment_method(&self, payment_method: GatewayPaymentMethod) {
        let id = payment_method.id.clone();
        self.inner
            .lock()
            .unwrap()
            .payment_methods
            .insert(id, payment_method);
    }

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: PaymentGatewayError) {
        self.inner.lock().unwrap().next_error = Some(error);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: PaymentGatewayError) {
        self.inner
            .lock()
            .unwrap()
            .method_errors
            .insert(method.to_string(), error);
    }

    /// Clear all configured errors.
    pub fn clear_errors(&self) {
        let mut state = self.inner.lock().unwrap();
        state.next_error = None;
        state.method_errors.clear();
    }

    /// Get all recorded method calls.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.inner.lock().unwrap().call_log.clone()
    }

    /// Check if a method was called.
    pub fn was_called(&self, method: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .any(|c| c.method == method)
    }

    /// Get count of calls to a method.
    pub fn call_count(&self, method: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().call_log.clear();
    }

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.inner.lock().unwrap().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), PaymentGatewayError> {
        let mut state = self.inner.lock().unwrap();

        // Method-specific error first
        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }

        // Global error (consumes it)
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(())
    }
}

impl Clone for MockPaymentGateway {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn mock_id(prefix: &str) -> String {
    let uuid = uuid::Uuid::new_v4().to_string();
    let short = uuid.split('-').next().unwrap_or("0");
    format!("{}_mock_{}", prefix, short)
}

#[async_trait]
impl PaymentGatewayClient for MockPaymentGateway {
    async fn get_or_create_customer(
        &self,
        client_id: &ClientId,
        email: Option<&str>,
        name: Option<&str>,
    ) -> Result<GatewayCustomer, PaymentGatewayError> {
        self.record_call(
            "get_or_create_customer",
            vec![client_id.to_string(), email.unwrap_or("").to_string()],
        );
        self.check_error("get_or_create_customer")?;

        let mut state = self.inner.lock().unwrap();

        if let Some(scripted) = state.next_customer.take() {
            state
                .customers
                .insert(client_id.as_str().to_string(), scripted.clone());
            return Ok(scripted);
        }

        if let Some(existing) = state.customers.get(client_id.as_str()) {
            return Ok(existing.clone());
        }

        let customer = GatewayCustomer {
            id: mock_id("cus"),
            email: email.map(str::to_string),
            name: name.map(str::to_string),
        };
        state
            .customers
            .insert(client_id.as_str().to_string(), customer.clone());

        Ok(customer)
    }

    async fn create_setup_intent(
        &self,
        customer_id: &str,
    ) -> Result<GatewaySetupIntent, PaymentGatewayError> {
        self.record_call("create_setup_intent", vec![customer_id.to_string()]);
        self.check_error("create_setup_intent")?;

        let mut state = self.inner.lock().unwrap();

        let intent = state.next_setup_intent.take().unwrap_or_else(|| {
            let id = mock_id("seti");
            GatewaySetupIntent {
                client_secret: format!("{}_secret", id),
                id,
            }
        });

        Ok(intent)
    }

    async fn create_ephemeral_key(
        &self,
        customer_id: &str,
    ) -> Result<GatewayEphemeralKey, PaymentGatewayError> {
        self.record_call("create_ephemeral_key", vec![customer_id.to_string()]);
        self.check_error("create_ephemeral_key")?;

        let mut state = self.inner.lock().unwrap();

        let key = state
            .next_ephemeral_key
            .take()
            .unwrap_or_else(|| GatewayEphemeralKey {
                secret: mock_id("ek"),
            });

        Ok(key)
    }

    async fn create_payment_method(
        &self,
        card: CardDetails,
    ) -> Result<GatewayPaymentMethod, PaymentGatewayError> {
        self.record_call("create_payment_method", vec![card.exp_month.to_string()]);
        self.check_error("create_payment_method")?;

        let mut state = self.inner.lock().unwrap();

        let payment_method = state.next_payment_method.take().unwrap_or_else(|| {
            let digits = normalize_card_number(&card.number);
            let last4 = digits
                .chars()
                .skip(digits.chars().count().saturating_sub(4))
                .collect::<String>();
            GatewayPaymentMethod {
                id: mock_id("pm"),
                brand: Some(CardBrand::classify(&card.number).as_str().to_string()),
                last4: Some(last4),
                exp_month: Some(card.exp_month),
                exp_year: Some(card.exp_year),
                holder_name: None,
            }
        });

        state
            .payment_methods
            .insert(payment_method.id.clone(), payment_method.clone());

        Ok(payment_method)
    }

    async fn attach_payment_method(
        &self,
        payment_method_id: &str,
        customer_id: &str,
    ) -> Result<GatewayPaymentMethod, PaymentGatewayError> {
        self.record_call(
            "attach_payment_method",
            vec![payment_method_id.to_string(), customer_id.to_string()],
        );
        self.check_error("attach_payment_method")?;

        let mut state = self.inner.lock().unwrap();

        if let Some(scripted) = state.next_payment_method.take() {
            state
                .payment_methods
                .insert(scripted.id.clone(), scripted.clone());
            return Ok(scripted);
        }

        state
            .payment_methods
            .get(payment_method_id)
            .cloned()
            .ok_or_else(|| PaymentGatewayError::not_found("Payment method"))
    }

    async fn get_payment_method(
        &self,
        payment_method_id: &str,
    ) -> Result<GatewayPaymentMethod, PaymentGatewayError> {
        self.record_call("get_payment_method", vec![payment_method_id.to_string()]);
        self.check_error("get_payment_method")?;

        let state = self.inner.lock().unwrap();
        state
            .payment_methods
            .get(payment_method_id)
            .cloned()
            .ok_or_else(|| PaymentGatewayError::not_found("Payment method"))
    }
}
