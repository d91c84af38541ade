//! Twilio SMS Provider - plan delivery over the Twilio Messages API.
//!
//! Sends through a Twilio Messaging Service rather than a single from
//! number. An adapter missing any credential (account SID, auth token,
//! messaging service SID) stays inert and reports every send as not
//! delivered.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::ports::{PlanNotification, SmsProvider};

/// Single-segment SMS length; longer bodies are truncated.
const MAX_SMS_CHARS: usize = 160;

/// Configuration for the Twilio provider.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// Account SID, also part of the request path.
    pub account_sid: String,
    /// Auth token for basic auth.
    auth_token: SecretString,
    /// Messaging Service SID used as the sender.
    pub messaging_service_sid: String,
    /// Base URL for the API (default: https://api.twilio.com).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl TwilioConfig {
    /// Creates a new configuration from the three Twilio credentials.
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        messaging_service_sid: impl Into<String>,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: SecretString::new(auth_token.into()),
            messaging_service_sid: messaging_service_sid.into(),
            base_url: "https://api.twilio.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn auth_token(&self) -> &str {
        self.auth_token.expose_secret()
    }

    fn is_configured(&self) -> bool {
        !self.account_sid.trim().is_empty()
            && !self.auth_token().trim().is_empty()
            && !self.messaging_service_sid.trim().is_empty()
    }
}

/// Twilio implementation of the SMS provider port.
pub struct TwilioSmsProvider {
    config: TwilioConfig,
    client: Client,
}

impl TwilioSmsProvider {
    /// Creates a new Twilio provider with the given configuration.
    pub fn new(config: TwilioConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.base_url, self.config.account_sid
        )
    }
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

#[async_trait]
impl SmsProvider for TwilioSmsProvider {
    async fn send_plan(&self, to: &str, client_name: &str, plan: &PlanNotification) -> bool {
        if !self.config.is_configured() {
            warn!(to = %to, "Twilio credentials not configured; skipping SMS delivery");
            return false;
        }

        let body = plan_sms_body(client_name, plan);

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(self.config.auth_token()))
            .form(&[
                ("To", to),
                ("MessagingServiceSid", &self.config.messaging_service_sid),
                ("Body", &body),
            ])
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                match response.json::<MessageResponse>().await {
                    Ok(message) => info!(to = %to, sid = %message.sid, "Plan SMS accepted by Twilio"),
                    Err(_) => info!(to = %to, "Plan SMS accepted by Twilio"),
                }
                true
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                error!(to = %to, status = %status, body = %body, "Twilio rejected plan SMS");
                false
            }
            Err(e) => {
                error!(to = %to, error = %e, "Failed to reach Twilio");
                false
            }
        }
    }
}

/// Display symbol for a currency code. Unmapped codes render as themselves.
fn currency_symbol(currency: &str) -> String {
    match currency.to_uppercase().as_str() {
        "USD" | "MXN" => "$".to_string(),
        "EUR" => "€".to_string(),
        _ => currency.to_string(),
    }
}

fn plan_sms_body(client_name: &str, plan: &PlanNotification) -> String {
    let symbol = currency_symbol(&plan.currency);
    let extra = plan
        .message
        .as_deref()
        .map(|m| format!("Message: {}\n", m))
        .unwrap_or_default();

    let body = format!(
        "Hi {client_name},\n\nMembership plan:\nAmount: {symbol}{amount:.2}/month\nBilling: day {billing_day}\n\n{extra}To complete your subscription, add your payment method.",
        client_name = client_name,
        symbol = symbol,
        amount = plan.amount,
        billing_day = plan.billing_day,
        extra = extra,
    );

    truncate_sms(body)
}

fn truncate_sms(body: String) -> String {
    if body.chars().count() <= MAX_SMS_CHARS {
        return body;
    }
    let mut truncated: String = body.chars().take(MAX_SMS_CHARS - 3).collect();
    truncated.push_str("...");
    truncated
}
