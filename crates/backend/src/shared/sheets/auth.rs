use chrono::{DateTime, Duration, Utc};
use contracts::domain::a002_sheet_connection::ServiceAccountKey;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Claims of the signed service-account assertion
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Mints OAuth2 access tokens from a service-account key and caches them
/// until shortly before expiry.
pub struct TokenProvider {
    key: ServiceAccountKey,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(key: ServiceAccountKey, http: reqwest::Client) -> Self {
        Self {
            key,
            http,
            cached: Mutex::new(None),
        }
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Return a valid access token, minting a fresh one when the cached
    /// token is absent or within a minute of expiry.
    pub async fn access_token(&self) -> Result<String, super::SheetsError> {
        {
            let cached = self
                .cached
                .lock()
                .map_err(|_| super::SheetsError::Token("token cache poisoned".into()))?;
            if let Some(entry) = cached.as_ref() {
                if entry.expires_at > Utc::now() + Duration::seconds(60) {
                    return Ok(entry.token.clone());
                }
            }
        }

        let entry = self.mint_token().await?;
        let token = entry.token.clone();
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| super::SheetsError::Token("token cache poisoned".into()))?;
        *cached = Some(entry);
        Ok(token)
    }

    async fn mint_token(&self) -> Result<CachedToken, super::SheetsError> {
        let now = Utc::now();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| super::SheetsError::InvalidCredentials(format!("bad private key: {e}")))?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .map_err(|e| super::SheetsError::Token(format!("failed to sign assertion: {e}")))?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Token request failed with status {}: {}", status, body);
            return Err(super::SheetsError::Token(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| super::SheetsError::Token(format!("bad token response: {e}")))?;

        Ok(CachedToken {
            expires_at: now + Duration::seconds(token.expires_in),
            token: token.access_token,
        })
    }
}
