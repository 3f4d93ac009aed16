//! Application state shared across handlers and middleware.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::identity::IdentityGateway;
use crate::middleware::cors::AllowedOrigins;
use crate::route_table::RouteTable;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The identity gateway inside it
/// is constructed exactly once, at process start.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: GatewayConfig,
    identity: IdentityGateway,
    routes: RouteTable,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Gateway configuration
    /// * `identity` - Identity gateway shared by every request
    #[must_use]
    pub fn new(config: GatewayConfig, identity: IdentityGateway) -> Self {
        Self::with_routes(config, identity, RouteTable::default())
    }

    /// Create a new application state with a custom route table.
    #[must_use]
    pub fn with_routes(config: GatewayConfig, identity: IdentityGateway, routes: RouteTable) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                identity,
                routes,
            }),
        }
    }

    /// Get a reference to the gateway configuration.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    /// Get a reference to the CORS allow-list.
    #[must_use]
    pub fn allowed_origins(&self) -> &AllowedOrigins {
        &self.inner.config.allowed_origins
    }

    /// Get a reference to the identity gateway.
    #[must_use]
    pub fn identity(&self) -> &IdentityGateway {
        &self.inner.identity
    }

    /// Get a reference to the route classification table.
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.inner.routes
    }
}
