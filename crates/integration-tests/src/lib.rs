//! Integration tests for the Ethical AI Knowledge Base gateway.
//!
//! The assembled router (routes plus the full middleware stack) is driven
//! in-process with `tower::ServiceExt::oneshot`; the identity provider is the
//! in-memory implementation, so no network access is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ethical-kb-integration-tests
//! ```
//!
//! # Fixture Identities
//!
//! | Token | Uid | Role claim |
//! |-------|-----|------------|
//! | `admin-token` | `admin-1` | `admin` |
//! | `user-token` | `user-1` | `user` |
//! | `plain-token` | `plain-1` | none |
//! | `orphan-token` | `orphan-1` | user record missing |
//!
//! `target-1` is a user with role `user` and no token.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use ethical_kb_core::Role;
use ethical_kb_gateway::{
    build_app,
    config::GatewayConfig,
    identity::{Claims, IdentityGateway, memory::InMemoryProvider},
    state::AppState,
};
use serde_json::Value;
use tower::ServiceExt;

/// Allow-list used unless a test supplies its own.
pub const TEST_ORIGINS: &str = "http://localhost:3000,https://example.com";

/// An assembled gateway plus handles on its fixtures.
pub struct TestContext {
    pub app: Router,
    pub provider: InMemoryProvider,
    pub identity: IdentityGateway,
}

impl TestContext {
    /// Context with [`TEST_ORIGINS`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_origins(TEST_ORIGINS)
    }

    /// Context with a custom `ALLOWED_ORIGINS` value.
    #[must_use]
    pub fn with_origins(origins: &str) -> Self {
        let config = GatewayConfig::from_vars(&|key: &str| match key {
            "ALLOWED_ORIGINS" => Some(origins.to_string()),
            _ => None,
        })
        .unwrap();

        let provider = InMemoryProvider::new()
            .with_role("admin-1", Role::Admin)
            .with_role("user-1", Role::User)
            .with_user("plain-1", Claims::new())
            .with_role("target-1", Role::User)
            .with_token("admin-token", "admin-1")
            .with_token("user-token", "user-1")
            .with_token("plain-token", "plain-1")
            .with_token("orphan-token", "orphan-1");

        let identity = IdentityGateway::new(Arc::new(provider.clone()));
        let app = build_app(AppState::new(config, identity.clone()));

        Self {
            app,
            provider,
            identity,
        }
    }

    /// Send a request through the full stack.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// `GET` request with optional extra headers.
#[must_use]
pub fn get(path: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::get(path);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
