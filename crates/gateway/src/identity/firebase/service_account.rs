//! Service-account OAuth2 access tokens.
//!
//! Admin endpoints of the identity provider require an OAuth2 access token.
//! The token is obtained with the JWT bearer grant: a short-lived assertion
//! signed with the service account's private key is exchanged at the token
//! endpoint. Access tokens are cached until shortly before they expire.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use moka::Expiry;
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::identity::IdentityError;

/// OAuth2 token endpoint (also the assertion audience).
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Scopes needed for user management.
const SCOPES: &str = "https://www.googleapis.com/auth/cloud-platform \
                      https://www.googleapis.com/auth/identitytoolkit";

/// Lifetime requested for each assertion.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Access tokens are dropped this long before their real expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(300);

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// A cached access token and its remaining usable lifetime.
#[derive(Clone)]
struct AccessToken {
    value: SecretString,
    lifetime: Duration,
}

struct AccessTokenExpiry;

impl Expiry<(), Arc<AccessToken>> for AccessTokenExpiry {
    fn expire_after_create(
        &self,
        _key: &(),
        value: &Arc<AccessToken>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.lifetime)
    }
}

/// Signs assertions for a service account and caches the resulting tokens.
pub struct ServiceAccountSigner {
    http: reqwest::Client,
    client_email: String,
    key: EncodingKey,
    tokens: Cache<(), Arc<AccessToken>>,
}

impl ServiceAccountSigner {
    /// Create a signer from a PEM-encoded RSA private key.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Jwt` if the key is not a valid RSA PEM key.
    pub fn new(
        http: reqwest::Client,
        client_email: String,
        private_key: &SecretString,
    ) -> Result<Self, IdentityError> {
        let key = EncodingKey::from_rsa_pem(private_key.expose_secret().as_bytes())?;

        let tokens = Cache::builder()
            .max_capacity(1)
            .expire_after(AccessTokenExpiry)
            .build();

        Ok(Self {
            http,
            client_email,
            key,
            tokens,
        })
    }

    /// Service-account email the tokens are issued to.
    #[must_use]
    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    /// Get a valid access token, minting one if the cache is empty.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::AccessToken` if the token exchange fails.
    pub async fn access_token(&self) -> Result<SecretString, IdentityError> {
        let token = self
            .tokens
            .try_get_with((), self.mint())
            .await
            .map_err(|e: Arc<IdentityError>| IdentityError::AccessToken(e.to_string()))?;

        Ok(token.value.clone())
    }

    async fn mint(&self) -> Result<Arc<AccessToken>, IdentityError> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: SCOPES,
            aud: TOKEN_URL,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)?;

        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                client_email = %self.client_email,
                body = %body.chars().take(200).collect::<String>(),
                "Service-account token exchange failed"
            );
            return Err(IdentityError::Upstream {
                status: status.as_u16(),
                message: "token exchange failed".to_string(),
            });
        }

        let body: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(body.expires_in).saturating_sub(EXPIRY_MARGIN);
        tracing::debug!(lifetime_secs = lifetime.as_secs(), "Minted service-account access token");

        Ok(Arc::new(AccessToken {
            value: SecretString::from(body.access_token),
            lifetime,
        }))
    }
}

impl std::fmt::Debug for ServiceAccountSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountSigner")
            .field("client_email", &self.client_email)
            .field("key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_non_pem_key() {
        let result = ServiceAccountSigner::new(
            reqwest::Client::new(),
            "svc@project.iam.gserviceaccount.com".to_string(),
            &SecretString::from("not a key"),
        );
        assert!(matches!(result, Err(IdentityError::Jwt(_))));
    }
}
