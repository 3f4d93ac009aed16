//! Edge policy through the assembled router: CORS, redirects, request IDs
//! and security headers.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use ethical_kb_integration_tests::{TestContext, body_json, get};
use uuid::Uuid;

// ============================================================================
// CORS
// ============================================================================

#[tokio::test]
async fn test_allowed_origin_is_echoed() {
    let ctx = TestContext::new();

    let response = ctx
        .send(get("/api/auth/session", &[("origin", "http://localhost:3000")]))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_subdomain_of_https_entry_is_allowed() {
    let ctx = TestContext::with_origins("https://example.com");

    let response = ctx
        .send(get("/api/auth/session", &[("origin", "https://app.example.com")]))
        .await;

    assert_ne!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example.com"
    );
}

#[tokio::test]
async fn test_disallowed_origin_is_rejected_with_json() {
    let ctx = TestContext::new();

    let response = ctx
        .send(get("/api/auth/session", &[("origin", "https://evil.test")]))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response.headers().contains_key("x-request-id"));
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );

    let body = body_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_lookalike_origin_is_rejected() {
    let ctx = TestContext::with_origins("https://example.com");

    for origin in ["https://evilexample.com", "https://example.com.evil.test"] {
        let response = ctx.send(get("/api/auth/session", &[("origin", origin)])).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{origin}");
    }
}

#[tokio::test]
async fn test_suffix_match_ignores_request_scheme() {
    let ctx = TestContext::with_origins("https://example.com");

    let response = ctx
        .send(get("/api/auth/session", &[("origin", "http://app.example.com")]))
        .await;

    assert_ne!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://app.example.com"
    );
}

#[tokio::test]
async fn test_missing_origin_is_same_origin() {
    let ctx = TestContext::new();

    let response = ctx.send(get("/api/auth/session", &[])).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn test_preflight_on_any_api_path() {
    let ctx = TestContext::new();

    for path in ["/api/auth/session", "/api/does/not/exist", "/api"] {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri(path)
            .header("origin", "https://example.com")
            .header("access-control-request-method", "PUT")
            .body(Body::empty())
            .unwrap();

        let response = ctx.send(request).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT, "{path}");
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://example.com");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_METHODS],
            "GET,POST,PUT,DELETE,OPTIONS"
        );
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Content-Type, Authorization, X-API-Key"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "86400");
    }
}

#[tokio::test]
async fn test_preflight_from_unknown_origin_advertises_first_entry() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/admin/users/u/role")
        .header("origin", "https://evil.test")
        .body(Body::empty())
        .unwrap();

    let response = ctx.send(request).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
}

// ============================================================================
// Protected Pages
// ============================================================================

#[tokio::test]
async fn test_protected_page_without_cookie_redirects_to_login() {
    let ctx = TestContext::new();

    let response = ctx.send(get("/admin/users", &[])).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/login?redirect=%2Fadmin%2Fusers"
    );
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_every_protected_prefix_redirects() {
    let ctx = TestContext::new();

    for path in ["/admin", "/adoption-interest", "/documents/7", "/chat"] {
        let response = ctx.send(get(path, &[])).await;
        assert_eq!(response.status(), StatusCode::FOUND, "{path}");
    }
}

#[tokio::test]
async fn test_protected_page_with_session_cookie_passes_through() {
    let ctx = TestContext::new();

    for cookie in ["__session=anything", "authToken=anything"] {
        let response = ctx.send(get("/admin/users", &[("cookie", cookie)])).await;
        assert_ne!(response.status(), StatusCode::FOUND, "{cookie}");
        assert!(response.headers().get(header::LOCATION).is_none());
    }
}

#[tokio::test]
async fn test_unnormalized_protected_path_redirects() {
    let ctx = TestContext::new();

    let response = ctx.send(get("//admin/users", &[])).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/login?redirect=%2Fadmin%2Fusers"
    );

    let response = ctx.send(get("/ngos/../chat", &[])).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/login?redirect=%2Fchat");
}

#[tokio::test]
async fn test_empty_session_cookie_still_redirects() {
    let ctx = TestContext::new();

    let response = ctx.send(get("/chat", &[("cookie", "__session=")])).await;

    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn test_auth_and_public_pages_pass_through() {
    let ctx = TestContext::new();

    for path in ["/login", "/signup", "/forgot-password", "/", "/about", "/administrator"] {
        let response = ctx.send(get(path, &[])).await;
        assert_ne!(response.status(), StatusCode::FOUND, "{path}");
    }
}

// ============================================================================
// Request IDs
// ============================================================================

#[tokio::test]
async fn test_request_ids_are_fresh_uuids() {
    let ctx = TestContext::new();

    let first = ctx.send(get("/health", &[])).await;
    let second = ctx.send(get("/health", &[])).await;

    let first = first.headers()["x-request-id"].to_str().unwrap().to_string();
    let second = second.headers()["x-request-id"].to_str().unwrap().to_string();

    assert!(Uuid::parse_str(&first).is_ok());
    assert!(Uuid::parse_str(&second).is_ok());
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_static_assets_skip_middleware() {
    let ctx = TestContext::new();

    for path in ["/_next/static/chunks/app.js", "/favicon.ico", "/images/logo.svg"] {
        let response = ctx.send(get(path, &[])).await;
        assert!(response.headers().get("x-request-id").is_none(), "{path}");
    }

    let response = ctx.send(get("/admin/logo.png", &[])).await;
    assert_ne!(response.status(), StatusCode::FOUND);
}

// ============================================================================
// Security Headers
// ============================================================================

#[tokio::test]
async fn test_security_headers_on_pages() {
    let ctx = TestContext::new();

    let response = ctx.send(get("/health", &[])).await;

    let headers = response.headers();
    for name in [
        "strict-transport-security",
        "x-frame-options",
        "x-content-type-options",
        "referrer-policy",
        "permissions-policy",
        "content-security-policy",
        "x-xss-protection",
        "x-dns-prefetch-control",
    ] {
        assert!(headers.contains_key(name), "missing {name}");
    }
    assert!(headers.get("x-robots-tag").is_none());
}

#[tokio::test]
async fn test_api_responses_are_not_cached_or_indexed() {
    let ctx = TestContext::new();

    let response = ctx.send(get("/api/auth/session", &[])).await;

    let headers = response.headers();
    assert_eq!(
        headers[header::CACHE_CONTROL],
        "no-store, no-cache, must-revalidate, private"
    );
    assert_eq!(headers["x-robots-tag"], "noindex, nofollow");
}

#[tokio::test]
async fn test_redirects_carry_security_headers() {
    let ctx = TestContext::new();

    let response = ctx.send(get("/documents", &[])).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");
}
