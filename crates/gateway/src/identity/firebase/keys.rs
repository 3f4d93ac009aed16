//! Public signing keys for ID token verification.
//!
//! Google publishes the keys that sign ID tokens as a JWK set. The set is
//! cached for the `max-age` advertised in the response's `Cache-Control`
//! header and refetched once when a token names an unknown key id.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::JwkSet;
use moka::Expiry;
use moka::future::Cache;

use crate::identity::IdentityError;

/// JWK endpoint for ID token signing keys.
const JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Cache lifetime when the response carries no usable `max-age`.
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(3600);

/// A fetched key set and how long it may be reused.
#[derive(Debug)]
struct CachedKeySet {
    keys: JwkSet,
    max_age: Duration,
}

/// Expires each key set after its advertised `max-age`.
struct KeySetExpiry;

impl Expiry<(), Arc<CachedKeySet>> for KeySetExpiry {
    fn expire_after_create(
        &self,
        _key: &(),
        value: &Arc<CachedKeySet>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.max_age)
    }
}

/// Cached client for the published signing keys.
pub struct SigningKeys {
    http: reqwest::Client,
    cache: Cache<(), Arc<CachedKeySet>>,
}

impl SigningKeys {
    /// Create an empty key cache.
    pub fn new(http: reqwest::Client) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .expire_after(KeySetExpiry)
            .build();

        Self { http, cache }
    }

    /// Get the decoding key for `kid`.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::UnknownSigningKey` if the key is not published
    /// even after a refresh, or a transport error if the keys cannot be fetched.
    pub async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, IdentityError> {
        let set = self.current().await?;
        if let Some(jwk) = set.keys.find(kid) {
            return Ok(DecodingKey::from_jwk(jwk)?);
        }

        // Keys rotate; refetch once before giving up
        tracing::debug!(kid, "Signing key not in cached set, refreshing");
        self.cache.invalidate(&()).await;

        let set = self.current().await?;
        let jwk = set
            .keys
            .find(kid)
            .ok_or_else(|| IdentityError::UnknownSigningKey(kid.to_string()))?;
        Ok(DecodingKey::from_jwk(jwk)?)
    }

    async fn current(&self) -> Result<Arc<CachedKeySet>, IdentityError> {
        self.cache
            .try_get_with((), self.fetch())
            .await
            .map_err(|e: Arc<IdentityError>| IdentityError::Unavailable(e.to_string()))
    }

    async fn fetch(&self) -> Result<Arc<CachedKeySet>, IdentityError> {
        let response = self.http.get(JWKS_URL).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "Failed to fetch token signing keys"
            );
            return Err(IdentityError::Upstream {
                status: status.as_u16(),
                message: "signing key fetch failed".to_string(),
            });
        }

        let max_age = response
            .headers()
            .get(reqwest::header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_max_age)
            .unwrap_or(DEFAULT_MAX_AGE);

        let keys: JwkSet = response.json().await?;
        tracing::debug!(
            count = keys.keys.len(),
            max_age_secs = max_age.as_secs(),
            "Fetched token signing keys"
        );

        Ok(Arc::new(CachedKeySet { keys, max_age }))
    }
}

/// Extract `max-age` from a `Cache-Control` header value.
fn parse_max_age(cache_control: &str) -> Option<Duration> {
    cache_control
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|secs| secs.trim().parse::<u64>().ok())
        .filter(|&secs| secs > 0)
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_max_age() {
        assert_eq!(
            parse_max_age("public, max-age=19302, must-revalidate, no-transform"),
            Some(Duration::from_secs(19302))
        );
    }

    #[test]
    fn test_parse_max_age_missing() {
        assert_eq!(parse_max_age("no-cache"), None);
    }

    #[test]
    fn test_parse_max_age_zero_is_ignored() {
        assert_eq!(parse_max_age("max-age=0"), None);
    }

    #[test]
    fn test_parse_max_age_garbage() {
        assert_eq!(parse_max_age("max-age=soon"), None);
    }
}
