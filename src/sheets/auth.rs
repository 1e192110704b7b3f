//! Service-account authentication for the Sheets API.
//!
//! Mints an RS256-signed JWT assertion from the service account key,
//! exchanges it at the Google token endpoint, and caches the resulting
//! bearer token until shortly before expiry.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::SheetsError;

const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Refresh this long before the token actually expires.
const EXPIRY_SLACK_SECONDS: i64 = 60;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Bearer-token source backed by a Google service account key.
pub struct ServiceAccountAuth {
    client_email: String,
    encoding_key: EncodingKey,
    token_uri: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// Parse the PEM private key and prepare the signer.
    pub fn new(
        client_email: &str,
        private_key_pem: &str,
        token_uri: &str,
    ) -> Result<Self, SheetsError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())?;

        Ok(Self {
            client_email: client_email.to_string(),
            encoding_key,
            token_uri: token_uri.to_string(),
            cached: Mutex::new(None),
        })
    }

    /// Return a valid bearer token, minting a new one when the cache is
    /// empty or near expiry.
    pub async fn bearer_token(&self, http: &reqwest::Client) -> Result<String, SheetsError> {
        let mut cached = self.cached.lock().await;

        let now = Utc::now();
        if let Some(token) = cached.as_ref()
            && token.expires_at > now + Duration::seconds(EXPIRY_SLACK_SECONDS)
        {
            return Ok(token.token.clone());
        }

        let assertion = self.sign_assertion(now)?;
        let response = http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::TokenEndpoint {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        let expires_at = now + Duration::seconds(token.expires_in);
        tracing::debug!(client_email = %self.client_email, "Minted new Sheets access token");

        let bearer = token.access_token.clone();
        *cached = Some(CachedToken {
            token: token.access_token,
            expires_at,
        });

        Ok(bearer)
    }

    fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String, SheetsError> {
        let claims = Claims {
            iss: &self.client_email,
            scope: SPREADSHEETS_SCOPE,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        Ok(encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.encoding_key,
        )?)
    }
}
