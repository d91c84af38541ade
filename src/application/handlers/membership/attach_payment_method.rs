//! AttachPaymentMethodHandler - stores a card and activates the
//! membership when payment was the missing piece.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::foundation::{ClientId, OperatorId};
use crate::domain::membership::{
    normalize_card_number, CardBrand, Membership, MembershipError, PaymentMethod,
};
use crate::ports::{
    CardDetails, GatewayPaymentMethod, MembershipStore, PaymentGatewayClient, PaymentGatewayError,
};

/// Expiry month assumed when neither gateway nor request supplies one.
const DEFAULT_EXP_MONTH: u8 = 12;
/// Expiry year assumed when neither gateway nor request supplies one.
const DEFAULT_EXP_YEAR: u16 = 2025;

/// Command to attach a payment method to a membership.
///
/// Card data can arrive three ways: a gateway payment method id from
/// on-device tokenization, raw card fields for server-side tokenization,
/// or raw card fields alone when no gateway is configured.
#[derive(Debug, Clone)]
pub struct AttachPaymentMethodCommand {
    pub client_id: ClientId,
    pub operator_id: OperatorId,
    pub payment_method_id: Option<String>,
    pub card_number: Option<String>,
    pub exp_month: Option<u8>,
    pub exp_year: Option<u16>,
    pub cvv: Option<String>,
    pub holder_name: Option<String>,
    /// Email of the authenticated requester, used for gateway customer
    /// creation.
    pub requester_email: Option<String>,
}

/// Result of attaching a payment method.
#[derive(Debug, Clone)]
pub struct AttachPaymentMethodResult {
    pub membership: Membership,
    /// Whether this attach transitioned the membership to active.
    pub activated: bool,
}

/// Handler for payment method attachment.
pub struct AttachPaymentMethodHandler {
    store: Arc<dyn MembershipStore>,
    gateway: Option<Arc<dyn PaymentGatewayClient>>,
}

impl AttachPaymentMethodHandler {
    pub fn new(
        store: Arc<dyn MembershipStore>,
        gateway: Option<Arc<dyn PaymentGatewayClient>>,
    ) -> Self {
        Self { store, gateway }
    }

    pub async fn handle(
        &self,
        cmd: AttachPaymentMethodCommand,
    ) -> Result<AttachPaymentMethodResult, MembershipError> {
        // 1. Resolve card data, via the gateway when one is configured
        let payment_method = self.resolve_payment_method(&cmd).await?;

        // 2. Load the membership; attaching requires an existing record
        let mut membership = self
            .store
            .find_by_client_and_operator(&cmd.client_id, &cmd.operator_id)
            .await?
            .ok_or_else(|| MembershipError::not_found(&cmd.client_id, &cmd.operator_id))?;

        // 3. Attach; the aggregate decides whether this activates
        let brand = payment_method.brand.clone();
        let last4 = payment_method.last4.clone();
        let activated = membership.attach_payment_method(payment_method, Utc::now().fixed_offset());

        // 4. Persist
        self.store.update(&membership).await?;

        tracing::info!(
            client_id = %cmd.client_id,
            brand = %brand,
            last4 = %last4,
            activated = activated,
            "Payment method attached"
        );

        Ok(AttachPaymentMethodResult {
            membership,
            activated,
        })
    }

    /// Resolves the payment method group from the command.
    ///
    /// Paths, in order: attach a client-tokenized gateway payment method
    /// (gateway failures fall back to request card data); tokenize raw
    /// card data through the gateway (failures are errors); classify raw
    /// card data locally.
    async fn resolve_payment_method(
        &self,
        cmd: &AttachPaymentMethodCommand,
    ) -> Result<PaymentMethod, MembershipError> {
        if let Some(gateway) = &self.gateway {
            if let Some(payment_method_id) = &cmd.payment_method_id {
                match self
                    .gateway_attach(gateway.as_ref(), payment_method_id, cmd)
                    .await
                {
                    Ok(pm) => {
                        tracing::info!(
                            client_id = %cmd.client_id,
                            payment_method_id = %pm.id,
                            "Gateway payment method attached to customer"
                        );
                        return resolve_from_gateway(pm, cmd);
                    }
                    Err(err) => {
                        tracing::warn!(
                            client_id = %cmd.client_id,
                            error = %err,
                            "Gateway attach failed; using request card data instead"
                        );
                    }
                }
            } else if let Some(card_number) = &cmd.card_number {
                return self
                    .tokenize_via_gateway(gateway.as_ref(), card_number, cmd)
                    .await;
            }
        }

        resolve_from_request(cmd)
    }

    async fn gateway_attach(
        &self,
        gateway: &dyn PaymentGatewayClient,
        payment_method_id: &str,
        cmd: &AttachPaymentMethodCommand,
    ) -> Result<GatewayPaymentMethod, PaymentGatewayError> {
        let customer = gateway
            .get_or_create_customer(&cmd.client_id, cmd.requester_email.as_deref(), None)
            .await?;
        gateway
            .attach_payment_method(payment_method_id, &customer.id)
            .await
    }

    /// Server-side tokenization fallback. Gateway failures here are
    /// errors, not fallbacks: the caller asked for a gateway-backed card.
    async fn tokenize_via_gateway(
        &self,
        gateway: &dyn PaymentGatewayClient,
        card_number: &str,
        cmd: &AttachPaymentMethodCommand,
    ) -> Result<PaymentMethod, MembershipError> {
        tracing::warn!(
            client_id = %cmd.client_id,
            "Tokenizing raw card data server-side; clients should tokenize on-device"
        );
        let clean = normalize_card_number(card_number);
        let card = CardDetails {
            number: clean,
            exp_month: cmd.exp_month.unwrap_or(DEFAULT_EXP_MONTH),
            exp_year: cmd.exp_year.unwrap_or(DEFAULT_EXP_YEAR),
            cvc: cmd.cvv.clone(),
        };

        let created = gateway.create_payment_method(card).await.map_err(|err| {
            tracing::error!(client_id = %cmd.client_id, error = %err, "Gateway card tokenization failed");
            MembershipError::internal(err.to_string())
        })?;
        let customer = gateway
            .get_or_create_customer(&cmd.client_id, cmd.requester_email.as_deref(), None)
            .await
            .map_err(|err| {
                tracing::error!(client_id = %cmd.client_id, error = %err, "Gateway customer lookup failed");
                MembershipError::internal(err.to_string())
            })?;
        gateway
            .attach_payment_method(&created.id, &customer.id)
            .await
            .map_err(|err| {
                tracing::error!(client_id = %cmd.client_id, error = %err, "Gateway attach failed");
                MembershipError::internal(err.to_string())
            })?;

        resolve_from_gateway(created, cmd)
    }
}

/// Builds the payment method group from gateway data, falling back to
/// request fields where the gateway withheld a value.
fn resolve_from_gateway(
    pm: GatewayPaymentMethod,
    cmd: &AttachPaymentMethodCommand,
) -> Result<PaymentMethod, MembershipError> {
    let request_number = cmd
        .card_number
        .as_deref()
        .map(normalize_card_number)
        .unwrap_or_default();

    let brand = pm
        .brand
        .unwrap_or_else(|| CardBrand::classify(&request_number).as_str().to_string());
    let last4 = match pm.last4 {
        Some(last4) => last4,
        None if request_number.chars().count() >= 4 => last_four(&request_number),
        None => {
            return Err(MembershipError::validation(
                "card_number",
                "The gateway returned no card digits and none were supplied",
            ))
        }
    };

    Ok(PaymentMethod::new(
        brand,
        last4,
        pm.exp_month
            .or(cmd.exp_month)
            .unwrap_or(DEFAULT_EXP_MONTH),
        pm.exp_year.or(cmd.exp_year).unwrap_or(DEFAULT_EXP_YEAR),
        pm.holder_name
            .or_else(|| cmd.holder_name.clone())
            .unwrap_or_default(),
        Some(pm.id),
    )?)
}

/// Builds the payment method group from request data alone, classifying
/// the brand locally.
fn resolve_from_request(
    cmd: &AttachPaymentMethodCommand,
) -> Result<PaymentMethod, MembershipError> {
    let normalized = cmd
        .card_number
        .as_deref()
        .map(normalize_card_number)
        .unwrap_or_default();
    if normalized.chars().count() < 4 {
        return Err(MembershipError::validation(
            "card_number",
            "A card number with at least 4 digits is required",
        ));
    }

    let brand = CardBrand::classify(&normalized);
    Ok(PaymentMethod::new(
        brand.as_str(),
        last_four(&normalized),
        cmd.exp_month.unwrap_or(DEFAULT_EXP_MONTH),
        cmd.exp_year.unwrap_or(DEFAULT_EXP_YEAR),
        cmd.holder_name.clone().unwrap_or_default(),
        None,
    )?)
}

fn last_four(digits: &str) -> String {
    let skip = digits.chars().count().saturating_sub(4);
    digits.chars().skip(skip).collect()
}
