//! Channel-based plan delivery.
//!
//! Routes a plan notification to the email or SMS provider named by the
//! channel string. Delivery is strictly best-effort: every failure mode
//! (unknown channel, missing contact data, unconfigured provider, slow
//! provider) degrades to `false` and a log line, never an error.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::ports::{EmailProvider, PlanNotification, SmsProvider};

/// Contact data accompanying a delivery request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
}

/// Dispatches plan notifications to the channel-appropriate provider.
///
/// Both providers are optional; a deployment without one simply reports
/// sends on that channel as unsuccessful.
pub struct NotificationDispatcher {
    email: Option<Arc<dyn EmailProvider>>,
    sms: Option<Arc<dyn SmsProvider>>,
    send_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        email: Option<Arc<dyn EmailProvider>>,
        sms: Option<Arc<dyn SmsProvider>>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            email,
            sms,
            send_timeout,
        }
    }

    /// Dispatcher with no providers wired; every dispatch reports false.
    pub fn disabled() -> Self {
        Self::new(None, None, Duration::from_secs(10))
    }

    /// Deliver a plan notification over `channel`.
    ///
    /// Channel matching is case-insensitive. Returns whether the provider
    /// accepted the message; the result is informational only.
    pub async fn dispatch(
        &self,
        channel: &str,
        contact: &ContactDetails,
        plan: &PlanNotification,
    ) -> bool {
        let sent = match channel.to_lowercase().as_str() {
            "email" => self.dispatch_email(contact, plan).await,
            "sms" => self.dispatch_sms(contact, plan).await,
            other => {
                tracing::warn!(channel = other, "Unrecognized notification channel");
                false
            }
        };

        if sent {
            tracing::info!(channel = channel, "Plan notification sent");
        } else {
            tracing::warn!(
                channel = channel,
                "Plan notification not sent (provider unconfigured, contact data missing, or send failed)"
            );
        }
        sent
    }

    async fn dispatch_email(&self, contact: &ContactDetails, plan: &PlanNotification) -> bool {
        let (to, name) = match (&contact.email, &contact.name) {
            (Some(to), Some(name)) => (to, name),
            _ => {
                tracing::warn!("Cannot send email: client email or name not provided");
                return false;
            }
        };
        let Some(provider) = &self.email else {
            return false;
        };

        match timeout(self.send_timeout, provider.send_plan(to, name, plan)).await {
            Ok(sent) => sent,
            Err(_) => {
                tracing::warn!(timeout_secs = self.send_timeout.as_secs(), "Email send timed out");
                false
            }
        }
    }

    async fn dispatch_sms(&self, contact: &ContactDetails, plan: &PlanNotification) -> bool {
        let (to, name) = match (&contact.phone, &contact.name) {
            (Some(to), Some(name)) => (to, name),
            _ => {
                tracing::warn!("Cannot send SMS: client phone or name not provided");
                return false;
            }
        };
        let Some(provider) = &self.sms else {
            return false;
        };

        match timeout(self.send_timeout, provider.send_plan(to, name, plan)).await {
            Ok(sent) => sent,
            Err(_) => {
                tracing::warn!(timeout_secs = self.send_timeout.as_secs(), "SMS send timed out");
                false
            }
        }
    }
}
