//! The identity provider seam.
//!
//! [`IdentityProvider`] is object safe so the gateway can hold any provider
//! behind an `Arc<dyn IdentityProvider>`. Production uses
//! [`FirebaseAdmin`](super::firebase::FirebaseAdmin); tests substitute an
//! in-memory implementation.

use futures::future::BoxFuture;
use serde_json::{Map, Value};

use ethical_kb_core::Uid;

use super::IdentityError;

/// Custom claims attached to an identity (a JSON object).
pub type Claims = Map<String, Value>;

/// A successfully verified ID token.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    /// Subject identifier (`sub`).
    pub uid: Uid,
    /// Every claim carried by the token.
    pub claims: Claims,
}

/// What a provider is able to do with its current configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// ID tokens can be verified.
    pub verify_tokens: bool,
    /// Custom claims can be read and written.
    pub manage_claims: bool,
}

impl Capabilities {
    /// Every capability available.
    pub const FULL: Self = Self {
        verify_tokens: true,
        manage_claims: true,
    };

    /// Nothing available.
    pub const NONE: Self = Self {
        verify_tokens: false,
        manage_claims: false,
    };
}

/// Admin capabilities of an external identity provider.
///
/// Each operation is a single round-trip; implementations keep no local state
/// about identities or roles.
pub trait IdentityProvider: Send + Sync {
    /// Capabilities available with the current configuration.
    fn capabilities(&self) -> Capabilities;

    /// Verify an ID token and return its subject and claims.
    fn verify_id_token<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, Result<DecodedToken, IdentityError>>;

    /// Read the custom claims of an identity.
    ///
    /// An identity without custom claims yields an empty map.
    fn custom_claims<'a>(&'a self, uid: &'a Uid) -> BoxFuture<'a, Result<Claims, IdentityError>>;

    /// Replace the custom claims of an identity.
    fn set_custom_claims<'a>(
        &'a self,
        uid: &'a Uid,
        claims: Claims,
    ) -> BoxFuture<'a, Result<(), IdentityError>>;
}

/// Provider used when the real client could not be constructed.
///
/// Every operation fails, so tokens are rejected and roles resolve to guest.
#[derive(Debug, Clone)]
pub struct UnavailableProvider {
    reason: String,
}

impl UnavailableProvider {
    /// Create a provider that fails every call with `reason`.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> IdentityError {
        IdentityError::Unavailable(self.reason.clone())
    }
}

impl IdentityProvider for UnavailableProvider {
    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE
    }

    fn verify_id_token<'a>(
        &'a self,
        _token: &'a str,
    ) -> BoxFuture<'a, Result<DecodedToken, IdentityError>> {
        Box::pin(async move { Err(self.error()) })
    }

    fn custom_claims<'a>(&'a self, _uid: &'a Uid) -> BoxFuture<'a, Result<Claims, IdentityError>> {
        Box::pin(async move { Err(self.error()) })
    }

    fn set_custom_claims<'a>(
        &'a self,
        _uid: &'a Uid,
        _claims: Claims,
    ) -> BoxFuture<'a, Result<(), IdentityError>> {
        Box::pin(async move { Err(self.error()) })
    }
}
