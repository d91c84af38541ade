//! Notification configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Notification configuration (SendGrid email, Twilio SMS)
///
/// Every credential defaults to empty; a channel with blank credentials is
/// simply disabled. Validation only rejects half-configured channels.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// SendGrid API key (blank disables email)
    #[serde(default)]
    pub sendgrid_api_key: String,

    /// Sender email address
    #[serde(default)]
    pub sendgrid_from_email: String,

    /// Sender display name
    #[serde(default = "default_from_name")]
    pub sendgrid_from_name: String,

    /// Twilio account SID
    #[serde(default)]
    pub twilio_account_sid: String,

    /// Twilio auth token
    #[serde(default)]
    pub twilio_auth_token: String,

    /// Twilio Messaging Service SID used as the sender
    #[serde(default)]
    pub twilio_messaging_service_sid: String,

    /// Deadline for a single provider send, in seconds
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,
}

impl NotificationConfig {
    /// Get the provider send deadline as Duration
    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }

    /// Check if email delivery is configured
    pub fn email_enabled(&self) -> bool {
        !self.sendgrid_api_key.is_empty()
    }

    /// Check if SMS delivery is configured
    pub fn sms_enabled(&self) -> bool {
        !self.twilio_account_sid.is_empty()
            && !self.twilio_auth_token.is_empty()
            && !self.twilio_messaging_service_sid.is_empty()
    }

    /// Validate notification configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.send_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        if self.email_enabled() && !self.sendgrid_from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }

        let twilio_fields = [
            &self.twilio_account_sid,
            &self.twilio_auth_token,
            &self.twilio_messaging_service_sid,
        ];
        let set = twilio_fields.iter().filter(|f| !f.is_empty()).count();
        if set != 0 && set != twilio_fields.len() {
            return Err(ValidationError::IncompleteTwilioConfig);
        }

        Ok(())
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            sendgrid_api_key: String::new(),
            sendgrid_from_email: String::new(),
            sendgrid_from_name: default_from_name(),
            twilio_account_sid: String::new(),
            twilio_auth_token: String::new(),
            twilio_messaging_service_sid: String::new(),
            send_timeout_secs: default_send_timeout(),
        }
    }
}

fn default_from_name() -> String {
    "Membership Manager".to_string()
}

fn default_send_timeout() -> u64 {
    10
}
