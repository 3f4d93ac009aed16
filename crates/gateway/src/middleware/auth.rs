//! Authentication extractors.
//!
//! Credentials come from the `Authorization: Bearer` header or the session
//! cookies and are verified by the identity gateway on every request. Roles
//! are read from the identity provider each time and never cached.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::{AppError, set_sentry_user};
use crate::identity::TokenVerification;
use crate::models::{SessionCredential, VerifiedUser};
use crate::state::AppState;

/// Extractor that requires a verified caller.
///
/// Rejects with `401` when no credential is present or the identity provider
/// rejects it.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.uid)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireUser(pub VerifiedUser);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let credential = SessionCredential::from_headers(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        match state.identity().verify_token(credential.token()).await {
            TokenVerification::Verified(decoded) => {
                let user = VerifiedUser::from(decoded);
                set_sentry_user(&user.uid, user.email());
                Ok(Self(user))
            }
            TokenVerification::Rejected { reason } => {
                tracing::debug!(
                    source = ?credential.source(),
                    reason = %reason,
                    "Rejected caller credential"
                );
                Err(AppError::Unauthorized("Invalid or expired token".to_string()))
            }
        }
    }
}

/// Extractor that requires a verified caller holding the `admin` role claim.
///
/// Rejects with `401` like [`RequireUser`], and with `403` when the caller's
/// role is anything other than `admin` (including a failed role lookup).
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub VerifiedUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;

        let role = state.identity().get_role(&user.uid).await;
        if !role.is_admin() {
            tracing::warn!(uid = %user.uid, role = %role, "Non-admin caller attempted admin operation");
            return Err(AppError::Forbidden("Admin role required".to_string()));
        }

        Ok(Self(user))
    }
}
