//! Google Sheets values client.
//!
//! Thin REST client over the Sheets v4 `values` endpoints (`get`, `clear`,
//! `update`, `batchUpdate`), authenticated with a service-account JWT bearer
//! token. Only the reconciler talks to it; any error here is fatal for the
//! sync operation in progress.

pub mod auth;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use url::Url;

use crate::config::{ConfigError, SheetsConfig};
use auth::ServiceAccountAuth;

/// Errors from the Sheets API surface.
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("sheets configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid sheets API base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
    #[error("failed to sign service account assertion: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("sheets request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("sheets API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("token endpoint returned {status}: {body}")]
    TokenEndpoint { status: u16, body: String },
}

/// One contiguous block of cell values, addressed in A1 notation.
#[derive(Debug, Clone, Serialize)]
pub struct ValueRange {
    pub range: String,
    pub values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct GetValuesResponse {
    #[serde(default)]
    values: Option<Vec<Vec<JsonValue>>>,
}

/// Client bound to one spreadsheet.
pub struct SheetsClient {
    http: reqwest::Client,
    api_base: String,
    spreadsheet_id: String,
    auth: ServiceAccountAuth,
}

impl SheetsClient {
    /// Build a client from configuration; fails when the sheet id or service
    /// account credentials are missing.
    pub fn from_config(http: reqwest::Client, cfg: &SheetsConfig) -> Result<Self, SheetsError> {
        let api_base: Url = cfg.api_base.parse()?;
        let (sheet_id, client_email, private_key) = cfg.require_credentials()?;
        let auth = ServiceAccountAuth::new(client_email, private_key, &cfg.token_uri)?;

        Ok(Self {
            http,
            api_base: api_base.as_str().trim_end_matches('/').to_string(),
            spreadsheet_id: sheet_id.to_string(),
            auth,
        })
    }

    /// Read all cell values in `range`. Absent cells and an entirely empty
    /// range come back as empty vectors; non-string cells are coerced to
    /// their display text.
    pub async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let token = self.auth.bearer_token(&self.http).await?;
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.api_base, self.spreadsheet_id, range
        );

        let response = self.http.get(&url).bearer_auth(token).send().await?;
        let response = check_status(response).await?;
        let body: GetValuesResponse = response.json().await?;

        Ok(body
            .values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    /// Clear every value in `range`, leaving formatting untouched.
    pub async fn clear(&self, range: &str) -> Result<(), SheetsError> {
        let token = self.auth.bearer_token(&self.http).await?;
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}:clear",
            self.api_base, self.spreadsheet_id, range
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Write `values` starting at the first cell of `range`.
    pub async fn update(&self, range: &str, values: &[Vec<String>]) -> Result<(), SheetsError> {
        let token = self.auth.bearer_token(&self.http).await?;
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.api_base, self.spreadsheet_id, range
        );

        let response = self
            .http
            .put(&url)
            .bearer_auth(token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&serde_json::json!({ "values": values }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Write several disjoint ranges in one request (id write-back).
    pub async fn batch_update(&self, data: &[ValueRange]) -> Result<(), SheetsError> {
        let token = self.auth.bearer_token(&self.http).await?;
        let url = format!(
            "{}/v4/spreadsheets/{}/values:batchUpdate",
            self.api_base, self.spreadsheet_id
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&serde_json::json!({
                "valueInputOption": "USER_ENTERED",
                "data": data,
            }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(SheetsError::Api {
        status: status.as_u16(),
        body,
    })
}

fn cell_to_string(cell: JsonValue) -> String {
    match cell {
        JsonValue::String(s) => s,
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_rejects_malformed_api_base() {
        let cfg = SheetsConfig {
            api_base: "not a url".to_string(),
            ..SheetsConfig::default()
        };

        let result = SheetsClient::from_config(reqwest::Client::new(), &cfg);
        assert!(matches!(result, Err(SheetsError::BaseUrl(_))));
    }

    #[test]
    fn cells_coerce_to_display_text() {
        assert_eq!(cell_to_string(serde_json::json!("Joe's Cafe")), "Joe's Cafe");
        assert_eq!(cell_to_string(serde_json::json!(51.5)), "51.5");
        assert_eq!(cell_to_string(serde_json::json!(true)), "true");
        assert_eq!(cell_to_string(JsonValue::Null), "");
    }
}
