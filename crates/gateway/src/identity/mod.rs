//! Admin identity gateway.
//!
//! Wraps the identity provider's admin capabilities behind three operations
//! that never fail past this boundary:
//!
//! - [`IdentityGateway::verify_token`] → [`TokenVerification`]
//! - [`IdentityGateway::get_role`] → [`Role`] (`user` when unset, `guest` on failure)
//! - [`IdentityGateway::set_role`] → [`RoleAssignment`]
//!
//! The gateway is constructed once at process start and shared through
//! [`AppState`](crate::state::AppState). Cloning it only clones an `Arc`.
//!
//! # Example
//!
//! ```rust,ignore
//! let gateway = IdentityGateway::from_config(&config);
//!
//! match gateway.verify_token(token).await {
//!     TokenVerification::Verified(decoded) => {
//!         let role = gateway.get_role(&decoded.uid).await;
//!     }
//!     TokenVerification::Rejected { reason } => { /* deny */ }
//! }
//! ```

mod error;
pub mod firebase;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
mod provider;

use std::sync::Arc;

use serde_json::Value;

use ethical_kb_core::{Role, Uid};

pub use error::IdentityError;
pub use firebase::FirebaseAdmin;
pub use provider::{Capabilities, Claims, DecodedToken, IdentityProvider, UnavailableProvider};

use crate::config::GatewayConfig;

/// Outcome of verifying a bearer token.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum TokenVerification {
    /// The token is valid.
    Verified(DecodedToken),
    /// The token is expired, malformed, revoked or otherwise unusable.
    Rejected {
        /// Why the token was rejected (for logs, not for clients).
        reason: String,
    },
}

impl TokenVerification {
    /// The verified subject, if any.
    #[must_use]
    pub const fn uid(&self) -> Option<&Uid> {
        match self {
            Self::Verified(decoded) => Some(&decoded.uid),
            Self::Rejected { .. } => None,
        }
    }
}

/// Outcome of writing a role claim.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleAssignment {
    /// The claim was written.
    Applied,
    /// The claim could not be written.
    Failed {
        /// Why the write failed.
        reason: String,
    },
}

/// Shared handle to the identity provider.
#[derive(Clone)]
pub struct IdentityGateway {
    provider: Arc<dyn IdentityProvider>,
}

impl std::fmt::Debug for IdentityGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityGateway")
            .field("capabilities", &self.capabilities())
            .finish_non_exhaustive()
    }
}

impl IdentityGateway {
    /// Create a gateway over an existing provider.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Build the production gateway from configuration.
    ///
    /// Never fails: missing credentials start the provider in development
    /// mode, and a client construction failure falls back to a provider that
    /// rejects everything. Both cases are logged as warnings.
    #[must_use]
    pub fn from_config(config: &GatewayConfig) -> Self {
        match FirebaseAdmin::new(&config.firebase, config.identity_timeout) {
            Ok(admin) => Self::new(Arc::new(admin)),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Identity provider initialization failed, all identity checks will deny"
                );
                Self::new(Arc::new(UnavailableProvider::new(e.to_string())))
            }
        }
    }

    /// Capabilities of the underlying provider.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.provider.capabilities()
    }

    /// Verify a bearer token.
    ///
    /// Every provider error is converted into [`TokenVerification::Rejected`].
    pub async fn verify_token(&self, token: &str) -> TokenVerification {
        if token.trim().is_empty() {
            return TokenVerification::Rejected {
                reason: "empty token".to_string(),
            };
        }

        match self.provider.verify_id_token(token).await {
            Ok(decoded) => TokenVerification::Verified(decoded),
            Err(e) => {
                tracing::debug!(error = %e, "Token verification failed");
                TokenVerification::Rejected {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Look up the role claim of an identity.
    ///
    /// Returns the `role` claim when present, [`Role::User`] when the identity
    /// has none, and [`Role::Guest`] when the lookup fails or the stored value
    /// is not a known role.
    pub async fn get_role(&self, uid: &Uid) -> Role {
        let claims = match self.provider.custom_claims(uid).await {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!(uid = %uid, error = %e, "Role lookup failed, treating as guest");
                return Role::Guest;
            }
        };

        match claims.get(Role::CLAIM) {
            None | Some(Value::Null) => Role::User,
            Some(Value::String(value)) => value.parse::<Role>().unwrap_or_else(|_| {
                tracing::warn!(uid = %uid, role = %value, "Unrecognized role claim, treating as guest");
                Role::Guest
            }),
            Some(other) => {
                tracing::warn!(uid = %uid, role = %other, "Non-string role claim, treating as guest");
                Role::Guest
            }
        }
    }

    /// Write the role claim of an identity.
    ///
    /// The caller must already have established that the invoking identity
    /// holds [`Role::Admin`].
    pub async fn set_role(&self, uid: &Uid, role: Role) -> RoleAssignment {
        let mut claims = Claims::new();
        claims.insert(
            Role::CLAIM.to_string(),
            Value::String(role.as_str().to_string()),
        );

        match self.provider.set_custom_claims(uid, claims).await {
            Ok(()) => {
                tracing::info!(uid = %uid, role = %role, "Role claim updated");
                RoleAssignment::Applied
            }
            Err(e) => {
                tracing::error!(uid = %uid, role = %role, error = %e, "Failed to update role claim");
                RoleAssignment::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
