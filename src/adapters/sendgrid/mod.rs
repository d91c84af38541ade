//! SendGrid email adapter.
//!
//! Implements the `EmailProvider` port over the SendGrid v3 mail API.
//! Secrets are handled via `secrecy::SecretString`; an adapter without an
//! API key downgrades every send to a logged no-op.

mod email_provider;

pub use email_provider::{SendGridConfig, SendGridEmailProvider};
