//! Ethical AI Knowledge Base edge gateway library.
//!
//! Decides CORS, redirect and header policy for every request and exposes
//! the identity gateway that verifies tokens and manages role claims. Built
//! as a library so the router can be driven in-process by tests and reused
//! by the operator CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod route_table;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Build the application router with the full middleware stack.
///
/// Sentry layers are not included; the binary adds them outermost.
pub fn build_app(state: AppState) -> Router {
    middleware::apply(routes::routes(), state)
}
