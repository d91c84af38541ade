//! SendGrid Email Provider - plan delivery over the SendGrid v3 mail API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = SendGridConfig::new(api_key, "billing@example.com")
//!     .with_from_name("Billing")
//!     .with_base_url("https://api.sendgrid.com");
//!
//! let provider = SendGridEmailProvider::new(config);
//! ```
//!
//! An adapter constructed with a blank API key stays inert: every send is
//! skipped with a warning and reported as not delivered.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::ports::{EmailProvider, PlanNotification};

/// Configuration for the SendGrid provider.
#[derive(Debug, Clone)]
pub struct SendGridConfig {
    /// API key for authentication. Blank disables the adapter.
    api_key: SecretString,
    /// Sender address shown to the client.
    pub from_email: String,
    /// Sender display name.
    pub from_name: String,
    /// Base URL for the API (default: https://api.sendgrid.com).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl SendGridConfig {
    /// Creates a new configuration with the given API key and sender address.
    pub fn new(api_key: impl Into<String>, from_email: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            from_email: from_email.into(),
            from_name: "Membership Manager".to_string(),
            base_url: "https://api.sendgrid.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the sender display name.
    pub fn with_from_name(mut self, name: impl Into<String>) -> Self {
        self.from_name = name.into();
        self
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

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// SendGrid implementation of the email provider port.
pub struct SendGridEmailProvider {
    config: SendGridConfig,
    client: Client,
}

impl SendGridEmailProvider {
    /// Creates a new SendGrid provider with the given configuration.
    pub fn new(config: SendGridConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn mail_send_url(&self) -> String {
        format!("{}/v3/mail/send", self.config.base_url)
    }
}

#[async_trait]
impl EmailProvider for SendGridEmailProvider {
    async fn send_plan(&self, to: &str, client_name: &str, plan: &PlanNotification) -> bool {
        if self.config.api_key().trim().is_empty() {
            warn!(to = %to, "SendGrid API key not configured; skipping email delivery");
            return false;
        }

        let request = MailSendRequest {
            personalizations: vec![Personalization {
                to: vec![EmailAddress {
                    email: to.to_string(),
                    name: Some(client_name.to_string()),
                }],
            }],
            from: EmailAddress {
                email: self.config.from_email.clone(),
                name: Some(self.config.from_name.clone()),
            },
            subject: "Your Membership Plan".to_string(),
            content: vec![MailContent {
                content_type: "text/html".to_string(),
                value: plan_email_body(client_name, plan),
            }],
        };

        let response = self
            .client
            .post(self.mail_send_url())
            .bearer_auth(self.config.api_key())
            .json(&request)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                info!(to = %to, "Plan email accepted by SendGrid");
                true
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                error!(to = %to, status = %status, body = %body, "SendGrid rejected plan email");
                false
            }
            Err(e) => {
                error!(to = %to, error = %e, "Failed to reach SendGrid");
                false
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct MailSendRequest {
    personalizations: Vec<Personalization>,
    from: EmailAddress,
    subject: String,
    content: Vec<MailContent>,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<EmailAddress>,
}

#[derive(Debug, Serialize)]
struct EmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct MailContent {
    #[serde(rename = "type")]
    content_type: String,
    value: String,
}

/// Display symbol for a currency code. Unmapped codes render as themselves.
fn currency_symbol(currency: &str) -> String {
    match currency.to_uppercase().as_str() {
        "USD" | "MXN" => "$".to_string(),
        "EUR" => "€".to_string(),
        _ => currency.to_string(),
    }
}

fn plan_email_body(client_name: &str, plan: &PlanNotification) -> String {
    let symbol = currency_symbol(&plan.currency);
    let extra = plan
        .message
        .as_deref()
        .map(|m| format!("<p><strong>Additional message:</strong><br>{}</p>", m))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<style>
  body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
  .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
  .plan-details {{ background-color: #f9f9f9; padding: 15px; margin: 15px 0; border-left: 4px solid #4a90d9; }}
  .amount {{ font-size: 24px; font-weight: bold; }}
</style>
</head>
<body>
<div class="container">
  <h1>Your Membership Plan</h1>
  <p>Dear {client_name},</p>
  <p>Here are the details of your membership plan:</p>
  <div class="plan-details">
    <p><strong>Monthly amount:</strong> <span class="amount">{symbol}{amount:.2}</span></p>
    <p><strong>Billing day:</strong> day {billing_day} of each month</p>
  </div>
  {extra}
  <p>To complete your subscription, please add your payment method.</p>
  <p>Thank you for your trust.</p>
</div>
</body>
</html>"#,
        client_name = client_name,
        symbol = symbol,
        amount = plan.amount,
        billing_day = plan.billing_day,
        extra = extra,
    )
}
