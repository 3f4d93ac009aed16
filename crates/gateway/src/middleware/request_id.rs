//! Request ID middleware for request tracing and correlation.
//!
//! Every request outside the static-asset matcher gets a fresh UUID v4. An
//! incoming `x-request-id` header is ignored so identifiers are never supplied
//! by the client. The request ID is:
//! - Stored in the request extensions as [`RequestId`]
//! - Recorded in the current tracing span
//! - Added to the Sentry scope for error correlation
//! - Returned in the response headers, including redirects and rejections

use std::fmt;

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

use crate::route_table::is_static_asset;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Identifier assigned to a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Middleware that stamps every request and response with a fresh request ID.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    if is_static_asset(request.uri().path()) {
        return next.run(request).await;
    }

    let request_id = RequestId::generate();
    let request_id_str = request_id.to_string();

    Span::current().record("request_id", request_id_str.as_str());

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id_str);
    });

    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id_str) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Extension, Router, body::Body, http::StatusCode, middleware, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route(
                "/echo",
                get(|Extension(id): Extension<RequestId>| async move { id.to_string() }),
            )
            .route("/logo.png", get(|| async { "png" }))
            .layer(middleware::from_fn(request_id_middleware))
    }

    #[tokio::test]
    async fn test_request_id_matches_extension() {
        let response = app()
            .oneshot(axum::http::Request::get("/echo").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let header = response.headers()[REQUEST_ID_HEADER].to_str().unwrap().to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(header.as_bytes(), body.as_ref());
        assert!(Uuid::parse_str(&header).is_ok());
    }

    #[tokio::test]
    async fn test_incoming_request_id_is_replaced() {
        let response = app()
            .oneshot(
                axum::http::Request::get("/echo")
                    .header(REQUEST_ID_HEADER, "client-chosen")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_ne!(response.headers()[REQUEST_ID_HEADER], "client-chosen");
    }

    #[tokio::test]
    async fn test_static_assets_are_not_stamped() {
        let response = app()
            .oneshot(axum::http::Request::get("/logo.png").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.headers().get(REQUEST_ID_HEADER).is_none());
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }
}
