//! hCaptcha token verification.
//!
//! The public signup endpoint requires a CAPTCHA token minted by the signup
//! form; this client checks it against the hCaptcha siteverify service
//! before any ad is created.

use serde::Deserialize;
use thiserror::Error;

use crate::config::{CaptchaConfig, ConfigError};

/// Errors from CAPTCHA verification.
#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("captcha configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("captcha verification request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Verifier bound to the configured hCaptcha secret.
pub struct CaptchaVerifier {
    http: reqwest::Client,
    verify_url: String,
    secret_key: Option<String>,
}

impl CaptchaVerifier {
    pub fn from_config(http: reqwest::Client, cfg: &CaptchaConfig) -> Self {
        Self {
            http,
            verify_url: cfg.verify_url.clone(),
            secret_key: cfg.secret_key.clone(),
        }
    }

    /// Check a client-supplied token. Returns `Ok(true)` only when the
    /// service confirms it.
    pub async fn verify(&self, token: &str) -> Result<bool, CaptchaError> {
        let secret = self
            .secret_key
            .as_deref()
            .ok_or(ConfigError::MissingCaptchaSecret)?;

        let response = self
            .http
            .post(&self.verify_url)
            .form(&[("response", token), ("secret", secret)])
            .send()
            .await?;

        let body: VerifyResponse = response.json().await?;
        if !body.success && !body.error_codes.is_empty() {
            tracing::debug!(error_codes = ?body.error_codes, "Captcha verification rejected");
        }

        Ok(body.success)
    }
}
