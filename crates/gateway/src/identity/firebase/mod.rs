//! Firebase Authentication admin client.
//!
//! # Capabilities
//!
//! - **Token verification** needs only the project id: ID tokens are RS256
//!   JWTs checked against Google's published signing keys.
//! - **Claim management** additionally needs a service account
//!   (`FIREBASE_CLIENT_EMAIL` + `FIREBASE_PRIVATE_KEY`). Without one the client
//!   runs in development mode and claim reads/writes fail.
//!
//! Claims are read with Identity Toolkit `accounts:lookup` and written with
//! `accounts:update`. Writing replaces every custom claim of the identity.

mod keys;
mod service_account;

use std::time::Duration;

use chrono::Utc;
use futures::future::BoxFuture;
use jsonwebtoken::{Algorithm, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ethical_kb_core::Uid;

use self::keys::SigningKeys;
use self::service_account::ServiceAccountSigner;
use super::{Capabilities, Claims, DecodedToken, IdentityError, IdentityProvider};
use crate::config::FirebaseConfig;

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

const ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// Maximum serialized size of custom claims.
const MAX_CLAIMS_BYTES: usize = 1000;

/// Clock skew tolerated for `iat`, `exp` and `auth_time`.
const LEEWAY_SECS: u64 = 60;

/// Firebase Authentication admin client.
pub struct FirebaseAdmin {
    http: reqwest::Client,
    project_id: Option<String>,
    signer: Option<ServiceAccountSigner>,
    keys: SigningKeys,
}

impl std::fmt::Debug for FirebaseAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseAdmin")
            .field("project_id", &self.project_id)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    local_id: [&'a str; 1],
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<UserRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    local_id: String,
    custom_attributes: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    local_id: &'a str,
    custom_attributes: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseAdmin {
    /// Create the client from configuration.
    ///
    /// Missing or unusable service-account credentials are not an error: the
    /// client starts in development mode and logs a warning.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Http` if the HTTP client cannot be built.
    pub fn new(config: &FirebaseConfig, timeout: Duration) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        if config.project_id.is_none() {
            tracing::warn!("No Firebase project id configured, token verification is disabled");
        }

        let signer = match (&config.project_id, &config.client_email, &config.private_key) {
            (Some(_), Some(client_email), Some(private_key)) => {
                match ServiceAccountSigner::new(http.clone(), client_email.clone(), private_key) {
                    Ok(signer) => Some(signer),
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            "Invalid Firebase service-account key, running in development mode"
                        );
                        None
                    }
                }
            }
            _ => {
                tracing::warn!(
                    missing = ?config.missing_credentials(),
                    "Firebase service-account credentials not configured, running in development mode"
                );
                None
            }
        };

        if let (Some(project_id), Some(signer)) = (&config.project_id, &signer) {
            tracing::info!(
                project_id = %project_id,
                client_email = %signer.client_email(),
                "Firebase admin client initialized"
            );
        }

        Ok(Self {
            keys: SigningKeys::new(http.clone()),
            http,
            project_id: config.project_id.clone(),
            signer,
        })
    }

    fn project_id(&self) -> Result<&str, IdentityError> {
        self.project_id
            .as_deref()
            .ok_or(IdentityError::MissingProjectId)
    }

    /// Project id and signer, both required for claim management.
    fn admin(&self) -> Result<(&str, &ServiceAccountSigner), IdentityError> {
        let project_id = self.project_id()?;
        let signer = self
            .signer
            .as_ref()
            .ok_or(IdentityError::ClaimManagementUnavailable)?;
        Ok((project_id, signer))
    }

    async fn verify(&self, token: &str) -> Result<DecodedToken, IdentityError> {
        let project_id = self.project_id()?;

        let header = jsonwebtoken::decode_header(token)?;
        if header.alg != Algorithm::RS256 {
            return Err(IdentityError::InvalidToken(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| IdentityError::InvalidToken("missing key id".to_string()))?;

        let key = self.keys.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = LEEWAY_SECS;
        validation.set_audience(&[project_id]);
        validation.set_issuer(&[format!("{ISSUER_PREFIX}{project_id}")]);
        validation.set_required_spec_claims(&["exp", "iat", "aud", "iss", "sub"]);

        let claims = jsonwebtoken::decode::<Claims>(token, &key, &validation)?.claims;
        check_token_times(&claims, Utc::now().timestamp())?;

        let uid = claims
            .get("sub")
            .and_then(Value::as_str)
            .ok_or_else(|| IdentityError::InvalidToken("missing subject".to_string()))
            .and_then(|sub| {
                Uid::parse(sub).map_err(|e| IdentityError::InvalidToken(format!("subject: {e}")))
            })?;

        Ok(DecodedToken { uid, claims })
    }

    async fn lookup(&self, uid: &Uid) -> Result<Claims, IdentityError> {
        let (project_id, signer) = self.admin()?;
        let access_token = signer.access_token().await?;

        let response = self
            .http
            .post(format!(
                "{IDENTITY_TOOLKIT_URL}/projects/{project_id}/accounts:lookup"
            ))
            .bearer_auth(access_token.expose_secret())
            .json(&LookupRequest {
                local_id: [uid.as_str()],
            })
            .send()
            .await?;

        let body: LookupResponse = parse_response(response).await?;
        let user = body
            .users
            .into_iter()
            .find(|u| u.local_id == uid.as_str())
            .ok_or_else(|| IdentityError::UserNotFound(uid.to_string()))?;

        parse_custom_attributes(user.custom_attributes.as_deref())
    }

    async fn update(&self, uid: &Uid, claims: Claims) -> Result<(), IdentityError> {
        let (project_id, signer) = self.admin()?;

        let custom_attributes = serde_json::to_string(&claims)?;
        if custom_attributes.len() > MAX_CLAIMS_BYTES {
            return Err(IdentityError::ClaimsTooLarge {
                size: custom_attributes.len(),
                max: MAX_CLAIMS_BYTES,
            });
        }

        let access_token = signer.access_token().await?;
        let response = self
            .http
            .post(format!(
                "{IDENTITY_TOOLKIT_URL}/projects/{project_id}/accounts:update"
            ))
            .bearer_auth(access_token.expose_secret())
            .json(&UpdateRequest {
                local_id: uid.as_str(),
                custom_attributes,
            })
            .send()
            .await?;

        let _: Value = parse_response(response).await?;
        Ok(())
    }
}

impl IdentityProvider for FirebaseAdmin {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            verify_tokens: self.project_id.is_some(),
            manage_claims: self.project_id.is_some() && self.signer.is_some(),
        }
    }

    fn verify_id_token<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, Result<DecodedToken, IdentityError>> {
        Box::pin(self.verify(token))
    }

    fn custom_claims<'a>(&'a self, uid: &'a Uid) -> BoxFuture<'a, Result<Claims, IdentityError>> {
        Box::pin(self.lookup(uid))
    }

    fn set_custom_claims<'a>(
        &'a self,
        uid: &'a Uid,
        claims: Claims,
    ) -> BoxFuture<'a, Result<(), IdentityError>> {
        Box::pin(self.update(uid, claims))
    }
}

/// Decode a success body or turn an error body into `IdentityError`.
async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, IdentityError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorEnvelope>(&text)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| text.chars().take(200).collect());

        if message.starts_with("USER_NOT_FOUND") {
            return Err(IdentityError::UserNotFound(message));
        }

        tracing::error!(status = %status, message = %message, "Identity Toolkit request failed");
        return Err(IdentityError::Upstream {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_str(&text)?)
}

/// Parse the `customAttributes` JSON string of a user record.
fn parse_custom_attributes(raw: Option<&str>) -> Result<Claims, IdentityError> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(Claims::new());
    };

    match serde_json::from_str::<Value>(raw)? {
        Value::Object(claims) => Ok(claims),
        Value::Null => Ok(Claims::new()),
        other => Err(IdentityError::InvalidClaims(format!(
            "expected an object, got {other}"
        ))),
    }
}

/// Check `iat` and `auth_time` are not in the future.
fn check_token_times(claims: &Claims, now: i64) -> Result<(), IdentityError> {
    #[allow(clippy::cast_possible_wrap)] // leeway is a small constant
    let latest = now + LEEWAY_SECS as i64;

    let auth_time = claims
        .get("auth_time")
        .and_then(Value::as_i64)
        .ok_or_else(|| IdentityError::InvalidToken("missing auth_time".to_string()))?;
    if auth_time > latest {
        return Err(IdentityError::InvalidToken(
            "auth_time is in the future".to_string(),
        ));
    }

    if claims
        .get("iat")
        .and_then(Value::as_i64)
        .is_some_and(|iat| iat > latest)
    {
        return Err(IdentityError::InvalidToken("issued in the future".to_string()));
    }

    Ok(())
}
