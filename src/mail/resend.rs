//! Resend mail provider.

use async_trait::async_trait;

use super::{MailError, Mailer, OutboundMail};

/// Mailer backed by the Resend REST API.
pub struct ResendMailer {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    from_address: String,
}

impl ResendMailer {
    pub fn new(http: reqwest::Client, api_base: String, api_key: String, from_address: String) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            from_address,
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, mail: OutboundMail) -> Result<(), MailError> {
        let url = format!("{}/emails", self.api_base);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "from": self.from_address,
                "to": [mail.to],
                "subject": mail.subject,
                "html": mail.html,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
