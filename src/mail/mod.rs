//! Outbound email.
//!
//! A small trait seam over the email provider so handlers stay testable.
//! The production implementation is Resend ([`resend`]); a disabled no-op
//! stands in when no API key is configured, so mail failures never block a
//! deployment that doesn't care about notifications.

pub mod resend;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::MailConfig;
pub use resend::ResendMailer;

/// Errors from the mail provider.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("mail API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("no contact recipient configured; set LOCALLIST_CONTACT_RECIPIENT")]
    MissingRecipient,
}

/// One outbound message.
#[derive(Debug, Clone)]
pub struct OutboundMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Provider-agnostic mail sender.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutboundMail) -> Result<(), MailError>;
}

/// No-op sender used when mail is not configured; logs and drops.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, mail: OutboundMail) -> Result<(), MailError> {
        tracing::warn!(to = %mail.to, subject = %mail.subject, "Mail disabled; dropping message");
        Ok(())
    }
}

/// Build the configured mailer: Resend when an API key is present, the
/// disabled no-op otherwise.
pub fn from_config(http: reqwest::Client, cfg: &MailConfig) -> std::sync::Arc<dyn Mailer> {
    match cfg.resend_api_key.as_deref() {
        Some(key) if !key.is_empty() => std::sync::Arc::new(ResendMailer::new(
            http,
            cfg.api_base.clone(),
            key.to_string(),
            cfg.from_address.clone(),
        )),
        _ => std::sync::Arc::new(DisabledMailer),
    }
}
