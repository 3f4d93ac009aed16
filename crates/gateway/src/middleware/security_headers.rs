//! Security headers middleware for XSS, clickjacking, and transport protection.
//!
//! Adds the baseline headers to every response. API routes additionally opt
//! out of caching and indexing.

use axum::{
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY,
            X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
        },
    },
    middleware::Next,
    response::Response,
};

use crate::route_table::RouteClass;
use crate::state::AppState;

/// Content Security Policy for pages backed by Firebase Authentication.
///
/// ```text
/// default-src 'self';
/// script-src 'self' https://apis.google.com https://www.gstatic.com;
/// style-src 'self' 'unsafe-inline';
/// font-src 'self' data:;
/// img-src 'self' data: blob: https://firebasestorage.googleapis.com;
/// connect-src 'self' https://*.googleapis.com https://*.firebaseio.com wss://*.firebaseio.com;
/// frame-src https://*.firebaseapp.com;
/// object-src 'none';
/// base-uri 'self';
/// form-action 'self';
/// frame-ancestors 'none';
/// upgrade-insecure-requests
/// ```
pub const CONTENT_SECURITY_POLICY_VALUE: &str = "default-src 'self'; \
     script-src 'self' https://apis.google.com https://www.gstatic.com; \
     style-src 'self' 'unsafe-inline'; \
     font-src 'self' data:; \
     img-src 'self' data: blob: https://firebasestorage.googleapis.com; \
     connect-src 'self' https://*.googleapis.com https://*.firebaseio.com wss://*.firebaseio.com; \
     frame-src https://*.firebaseapp.com; \
     object-src 'none'; \
     base-uri 'self'; \
     form-action 'self'; \
     frame-ancestors 'none'; \
     upgrade-insecure-requests";

/// `Cache-Control` for API responses.
pub const API_CACHE_CONTROL: &str = "no-store, no-cache, must-revalidate, private";

/// `X-Robots-Tag` for API responses.
pub const API_ROBOTS_TAG: &str = "noindex, nofollow";

/// Add security headers to all responses.
///
/// Headers applied:
/// - `Strict-Transport-Security: max-age=63072000; includeSubDomains; preload`
/// - `X-Frame-Options: DENY` - Prevent clickjacking
/// - `X-Content-Type-Options: nosniff` - Prevent MIME sniffing
/// - `Referrer-Policy: strict-origin-when-cross-origin`
/// - `Permissions-Policy` - Deny device and tracking features
/// - `Content-Security-Policy` - See [`CONTENT_SECURITY_POLICY_VALUE`]
/// - `X-XSS-Protection: 1; mode=block`
/// - `X-DNS-Prefetch-Control: off`
///
/// API routes also get `Cache-Control` ([`API_CACHE_CONTROL`]) and
/// `X-Robots-Tag` ([`API_ROBOTS_TAG`]).
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let is_api = state.routes().classify(request.uri().path()) == RouteClass::Api;

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=63072000; includeSubDomains; preload"),
    );
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "camera=(), \
             microphone=(), \
             geolocation=(), \
             payment=(), \
             usb=(), \
             browsing-topics=(), \
             interest-cohort=()",
        ),
    );
    headers.insert(
        CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY_VALUE),
    );
    headers.insert(X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
    headers.insert(
        HeaderName::from_static("x-dns-prefetch-control"),
        HeaderValue::from_static("off"),
    );

    if is_api {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(API_CACHE_CONTROL));
        headers.insert(
            HeaderName::from_static("x-robots-tag"),
            HeaderValue::from_static(API_ROBOTS_TAG),
        );
    }

    response
}
