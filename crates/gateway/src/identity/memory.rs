//! In-memory identity provider for tests.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::RwLock;

use ethical_kb_core::{Role, Uid};

use super::{Capabilities, Claims, DecodedToken, IdentityError, IdentityProvider};

/// Identity provider backed by in-process maps.
///
/// Tokens map to subjects; subjects map to custom claims. A subject that was
/// never registered behaves like a failed lookup.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    tokens: Arc<RwLock<HashMap<String, Uid>>>,
    users: Arc<RwLock<HashMap<Uid, Claims>>>,
}

impl InMemoryProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user with the given custom claims.
    ///
    /// # Panics
    ///
    /// Panics if `uid` is not a valid subject identifier.
    #[must_use]
    pub fn with_user(self, uid: &str, claims: Claims) -> Self {
        let uid = Uid::parse(uid).expect("test uid must be valid");
        self.users
            .try_write()
            .expect("provider is not shared yet")
            .insert(uid, claims);
        self
    }

    /// Register a user carrying a role claim.
    #[must_use]
    pub fn with_role(self, uid: &str, role: Role) -> Self {
        let mut claims = Claims::new();
        claims.insert(
            Role::CLAIM.to_string(),
            Value::String(role.as_str().to_string()),
        );
        self.with_user(uid, claims)
    }

    /// Register a token that verifies as `uid`.
    ///
    /// # Panics
    ///
    /// Panics if `uid` is not a valid subject identifier.
    #[must_use]
    pub fn with_token(self, token: &str, uid: &str) -> Self {
        let uid = Uid::parse(uid).expect("test uid must be valid");
        self.tokens
            .try_write()
            .expect("provider is not shared yet")
            .insert(token.to_string(), uid);
        self
    }

    /// Remove a user so later lookups fail.
    pub async fn remove_user(&self, uid: &Uid) {
        self.users.write().await.remove(uid);
    }
}

impl IdentityProvider for InMemoryProvider {
    fn capabilities(&self) -> Capabilities {
        Capabilities::FULL
    }

    fn verify_id_token<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, Result<DecodedToken, IdentityError>> {
        Box::pin(async move {
            let uid = self
                .tokens
                .read()
                .await
                .get(token)
                .cloned()
                .ok_or_else(|| IdentityError::InvalidToken("unknown token".to_string()))?;

            let mut claims = self
                .users
                .read()
                .await
                .get(&uid)
                .cloned()
                .unwrap_or_default();
            claims.insert("sub".to_string(), Value::String(uid.to_string()));

            Ok(DecodedToken { uid, claims })
        })
    }

    fn custom_claims<'a>(&'a self, uid: &'a Uid) -> BoxFuture<'a, Result<Claims, IdentityError>> {
        Box::pin(async move {
            self.users
                .read()
                .await
                .get(uid)
                .cloned()
                .ok_or_else(|| IdentityError::UserNotFound(uid.to_string()))
        })
    }

    fn set_custom_claims<'a>(
        &'a self,
        uid: &'a Uid,
        claims: Claims,
    ) -> BoxFuture<'a, Result<(), IdentityError>> {
        Box::pin(async move {
            let mut users = self.users.write().await;
            let entry = users
                .get_mut(uid)
                .ok_or_else(|| IdentityError::UserNotFound(uid.to_string()))?;
            *entry = claims;
            Ok(())
        })
    }
}
