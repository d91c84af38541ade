//! CreatePaymentSetupHandler - prepares a gateway card-collection session.

use std::sync::Arc;

use crate::domain::foundation::{ClientId, OperatorId, Timestamp};
use crate::domain::membership::{MembershipError, PaymentSetupView};
use crate::ports::PaymentGatewayClient;

/// Command to create a payment setup session for a client.
#[derive(Debug, Clone)]
pub struct CreatePaymentSetupCommand {
    pub client_id: ClientId,
    pub operator_id: OperatorId,
    /// Email of the authenticated requester, forwarded to the gateway
    /// customer record.
    pub requester_email: Option<String>,
}

/// Result of a payment setup request.
#[derive(Debug, Clone)]
pub struct CreatePaymentSetupResult {
    pub setup: PaymentSetupView,
}

/// Handler for payment setup sessions.
///
/// Without a gateway this degrades to mock credentials so client apps
/// can exercise their card-collection flow against a dev deployment.
pub struct CreatePaymentSetupHandler {
    gateway: Option<Arc<dyn PaymentGatewayClient>>,
    publishable_key: Option<String>,
    merchant_name: String,
}

impl CreatePaymentSetupHandler {
    pub fn new(
        gateway: Option<Arc<dyn PaymentGatewayClient>>,
        publishable_key: Option<String>,
        merchant_name: String,
    ) -> Self {
        Self {
            gateway,
            publishable_key,
            merchant_name,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreatePaymentSetupCommand,
    ) -> Result<CreatePaymentSetupResult, MembershipError> {
        // 1. Without a gateway, hand back mock credentials
        let Some(gateway) = &self.gateway else {
            tracing::warn!(
                client_id = %cmd.client_id,
                "No payment gateway configured; returning mock setup credentials"
            );
            let millis = Timestamp::now().as_unix_millis();
            return Ok(CreatePaymentSetupResult {
                setup: PaymentSetupView {
                    client_secret: format!("seti_mock_secret_{}", millis),
                    customer_id: cmd.client_id.to_string(),
                    ephemeral_key: format!("ephkey_mock_{}", millis),
                    publishable_key: self.publishable_key.clone(),
                    merchant_name: Some(self.merchant_name.clone()),
                },
            });
        };

        // 2. Resolve the gateway customer for this client
        let customer = gateway
            .get_or_create_customer(&cmd.client_id, cmd.requester_email.as_deref(), None)
            .await
            .map_err(|err| {
                tracing::error!(client_id = %cmd.client_id, error = %err, "Gateway customer lookup failed");
                MembershipError::internal(err.to_string())
            })?;

        // 3. Create the setup intent and its ephemeral key
        let intent = gateway.create_setup_intent(&customer.id).await.map_err(|err| {
            tracing::error!(client_id = %cmd.client_id, error = %err, "Setup intent creation failed");
            MembershipError::internal(err.to_string())
        })?;
        let ephemeral_key = gateway
            .create_ephemeral_key(&customer.id)
            .await
            .map_err(|err| {
                tracing::error!(client_id = %cmd.client_id, error = %err, "Ephemeral key creation failed");
                MembershipError::internal(err.to_string())
            })?;

        tracing::info!(
            client_id = %cmd.client_id,
            customer_id = %customer.id,
            "Payment setup session created"
        );

        Ok(CreatePaymentSetupResult {
            setup: PaymentSetupView {
                client_secret: intent.client_secret,
                customer_id: customer.id,
                ephemeral_key: ephemeral_key.secret,
                publishable_key: self.publishable_key.clone(),
                merchant_name: Some(self.merchant_name.clone()),
            },
        })
    }
}
