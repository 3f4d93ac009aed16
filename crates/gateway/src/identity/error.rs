//! Identity provider error types.

use thiserror::Error;

/// Errors that can occur when talking to the identity provider.
///
/// These never cross the [`IdentityGateway`](super::IdentityGateway) boundary:
/// the gateway converts them into typed failure results.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// No project id is configured, so tokens cannot be verified.
    #[error("identity provider project id is not configured")]
    MissingProjectId,

    /// Service-account credentials are absent (development mode).
    #[error("claim management unavailable: service-account credentials are not configured")]
    ClaimManagementUnavailable,

    /// The provider client could not be constructed.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),

    /// Token failed a structural or claim check.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token signature or standard claim validation failed.
    #[error("token validation failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Token was signed with a key that is not published.
    #[error("unknown signing key: {0}")]
    UnknownSigningKey(String),

    /// No identity exists for the subject.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Stored custom claims are not a JSON object.
    #[error("invalid custom claims: {0}")]
    InvalidClaims(String),

    /// Serialized custom claims exceed the provider's limit.
    #[error("custom claims payload is {size} bytes (max {max})")]
    ClaimsTooLarge {
        /// Serialized size in bytes.
        size: usize,
        /// Maximum allowed size in bytes.
        max: usize,
    },

    /// The service-account access token could not be obtained.
    #[error("access token error: {0}")]
    AccessToken(String),

    /// The provider returned a non-success status.
    #[error("identity provider returned {status}: {message}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Provider error message.
        message: String,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
