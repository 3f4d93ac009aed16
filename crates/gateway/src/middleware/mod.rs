//! HTTP middleware stack for the gateway.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, capture errors), added in `main`
//! 2. `TraceLayer` (request tracing, `http_request` span)
//! 3. Request ID (fresh UUID per request, recorded in the span)
//! 4. Security headers (HSTS, CSP, API cache opt-out)
//! 5. Edge policy (CORS, origin rejection, protected page redirects)
//!
//! Request ID sits outside the edge policy so redirects and rejections carry
//! the header too.

pub mod auth;
pub mod cors;
pub mod edge;
pub mod request_id;
pub mod security_headers;

use axum::{Router, body::Body, http::Request, middleware};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::state::AppState;

pub use auth::{RequireAdmin, RequireUser};
pub use cors::{AllowedOrigins, OriginCheck};
pub use edge::edge_middleware;
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;

/// Wrap a router in the middleware stack and attach state.
pub fn apply(router: Router<AppState>, state: AppState) -> Router {
    router
        .layer(middleware::from_fn_with_state(state.clone(), edge_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .with_state(state)
}

fn make_request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = tracing::field::Empty,
    )
}
