//! Service-account OAuth for the Google Sheets API.
//!
//! Flow: sign a JWT assertion (RS256) with the service-account key, exchange
//! it at the token endpoint for a bearer token, reuse the token until shortly
//! before it expires.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use tokio::sync::Mutex;
use tracing::{debug, info};

use common::Error;

use crate::credentials::ServiceAccountKey;

pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the token actually expires.
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Parsed service-account key plus the current bearer token.
pub struct ServiceAccountAuth {
    pub client_email: String,
    token_uri: String,
    signing_key: SigningKey<Sha256>,
    client: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for ServiceAccountAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountAuth")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

impl ServiceAccountAuth {
    /// Build from a resolved key. Pure construction: no network traffic.
    ///
    /// Accepts PKCS#8 (`PRIVATE KEY`) and PKCS#1 (`RSA PRIVATE KEY`) PEM.
    pub fn new(key: &ServiceAccountKey) -> Result<Self, Error> {
        let pem = key.private_key.trim();
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| Error::Configuration(format!("Failed to parse RSA private key: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| Error::Http(format!("failed to build token HTTP client: {e}")))?;

        Ok(Self {
            client_email: key.client_email.clone(),
            token_uri: key.token_uri.clone(),
            signing_key: SigningKey::<Sha256>::new(private_key),
            client,
            token: Mutex::new(None),
        })
    }

    /// Build the signed JWT assertion for `now`.
    pub fn assertion(&self, now: DateTime<Utc>) -> Result<String, Error> {
        let iat = now.timestamp();
        let header = json!({ "alg": "RS256", "typ": "JWT" });
        let claims = json!({
            "iss": self.client_email,
            "scope": SHEETS_READONLY_SCOPE,
            "aud": self.token_uri,
            "iat": iat,
            "exp": iat + ASSERTION_LIFETIME_SECS,
        });

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
        );
        let signature = self.signing_key.sign(signing_input.as_bytes());

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        ))
    }

    /// Return a valid bearer token, exchanging a fresh assertion if needed.
    pub async fn access_token(&self) -> Result<String, Error> {
        let mut guard = self.token.lock().await;
        let now = Utc::now();

        if let Some(cached) = guard.as_ref() {
            if cached.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now {
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.exchange(now).await?;
        let token = fresh.token.clone();
        *guard = Some(fresh);
        Ok(token)
    }

    async fn exchange(&self, now: DateTime<Utc>) -> Result<CachedToken, Error> {
        let assertion = self.assertion(now)?;
        debug!("Exchanging JWT assertion at {}", self.token_uri);

        let resp = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| Error::Http(format!("token request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(500).collect();
            return Err(if status.is_client_error() {
                Error::Authentication(format!(
                    "token endpoint rejected credential for {} ({}): {}",
                    self.client_email,
                    status.as_u16(),
                    excerpt
                ))
            } else {
                Error::Http(format!("token endpoint returned {}: {}", status.as_u16(), excerpt))
            });
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| Error::Authentication(format!("malformed token response: {e}")))?;

        info!(
            "Obtained Sheets access token for {} (expires in {}s)",
            self.client_email, token.expires_in
        );

        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}
