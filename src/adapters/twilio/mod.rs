//! Twilio SMS adapter.
//!
//! Implements the `SmsProvider` port over the Twilio Messages API using a
//! Messaging Service as the sender. An adapter missing any credential
//! downgrades every send to a logged no-op.

mod sms_provider;

pub use sms_provider::{TwilioConfig, TwilioSmsProvider};
