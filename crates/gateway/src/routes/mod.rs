//! HTTP route handlers for the gateway.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness (token verification available)
//!
//! # API (CORS policy applies)
//! GET  /api/auth/session           - Verified caller and role
//! GET  /api/admin/users/{uid}/role - Read a user's role (admin only)
//! PUT  /api/admin/users/{uid}/role - Assign a user's role (admin only)
//! ```
//!
//! Page routes are served by the front end; anything else falls through to a
//! JSON `404`.

pub mod api;
pub mod health;

use axum::{Router, http::Uri, routing::get};

use crate::error::AppError;
use crate::state::AppState;

/// Create the health routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/ready", get(health::readiness))
}

/// Create all routes for the gateway.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest("/api", api::api_routes())
        .fallback(not_found)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
