//! Object storage signed upload URLs.
//!
//! The signup form uploads ad photos directly from the browser; this client
//! asks the storage service (Supabase storage API) for a time-limited signed
//! upload URL, namespaced under the tenant's domain and a timestamp so paths
//! never collide.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{ConfigError, StorageConfig};

/// Errors from the storage service.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("storage API returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// A signed upload grant returned to the browser.
#[derive(Debug, Clone)]
pub struct SignedUpload {
    /// Absolute URL the client PUTs the file to.
    pub signed_url: String,
    /// Bucket-relative object path.
    pub path: String,
}

#[derive(Debug, Deserialize)]
struct SignUploadResponse {
    url: String,
}

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\-._]").expect("static pattern compiles"));

/// Strip characters that are unsafe in object paths.
pub fn sanitize_file_name(file_name: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(file_name, "").to_string()
}

/// Client for the signed-upload endpoint of the storage service.
pub struct StorageClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl StorageClient {
    /// Build a client from configuration; fails when the storage URL or
    /// service key is missing.
    pub fn from_config(http: reqwest::Client, cfg: &StorageConfig) -> Result<Self, StorageError> {
        let base_url = cfg
            .url
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingStorageCredentials)?;
        let service_key = cfg
            .service_key
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingStorageCredentials)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            bucket: cfg.bucket.clone(),
        })
    }

    /// Create a signed upload URL for one file, placed under
    /// `{tenant_domain}/{millis}-{sanitized name}`.
    pub async fn prepare_upload(
        &self,
        tenant_domain: &str,
        file_name: &str,
    ) -> Result<SignedUpload, StorageError> {
        let path = format!(
            "{}/{}-{}",
            tenant_domain,
            Utc::now().timestamp_millis(),
            sanitize_file_name(file_name)
        );

        let url = format!(
            "{}/object/upload/sign/{}/{}",
            self.base_url, self.bucket, path
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.service_key)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: SignUploadResponse = response.json().await?;
        // The service returns a URL relative to the storage API root.
        let signed_url = if body.url.starts_with("http") {
            body.url
        } else {
            format!("{}/{}", self.base_url, body.url.trim_start_matches('/'))
        };

        Ok(SignedUpload { signed_url, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_lose_unsafe_characters() {
        assert_eq!(sanitize_file_name("shop front.jpg"), "shopfront.jpg");
        assert_eq!(sanitize_file_name("a/b\\c.png"), "abc.png");
        assert_eq!(sanitize_file_name("logo-v2_final.webp"), "logo-v2_final.webp");
        assert_eq!(sanitize_file_name("café.jpg"), "caf.jpg");
    }
}
