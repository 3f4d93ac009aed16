//! Session and role administration endpoints with the in-memory identity
//! provider.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use ethical_kb_core::{Role, Uid};
use ethical_kb_integration_tests::{TestContext, body_json, get};
use serde_json::json;

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

fn put_role(uid: &str, token: &str, role: &str) -> Request<Body> {
    Request::builder()
        .method(Method::PUT)
        .uri(format!("/api/admin/users/{uid}/role"))
        .header(header::AUTHORIZATION, bearer(token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "role": role }).to_string()))
        .unwrap()
}

// ============================================================================
// Session
// ============================================================================

#[tokio::test]
async fn test_session_requires_credential() {
    let ctx = TestContext::new();

    let response = ctx.send(get("/api/auth/session", &[])).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_session_rejects_unknown_token() {
    let ctx = TestContext::new();

    let response = ctx
        .send(get("/api/auth/session", &[("authorization", bearer("forged").as_str())]))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_with_bearer_token() {
    let ctx = TestContext::new();

    let response = ctx
        .send(get("/api/auth/session", &[("authorization", bearer("admin-token").as_str())]))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "uid": "admin-1", "role": "admin" })
    );
}

#[tokio::test]
async fn test_session_with_cookie_and_no_role_claim_is_user() {
    let ctx = TestContext::new();

    let response = ctx
        .send(get("/api/auth/session", &[("cookie", "authToken=plain-token")]))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["role"], "user");
}

#[tokio::test]
async fn test_session_with_failed_lookup_is_guest() {
    let ctx = TestContext::new();

    let response = ctx
        .send(get("/api/auth/session", &[("authorization", bearer("orphan-token").as_str())]))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["role"], "guest");
}

// ============================================================================
// Admin: read role
// ============================================================================

#[tokio::test]
async fn test_get_role_requires_credential() {
    let ctx = TestContext::new();

    let response = ctx.send(get("/api/admin/users/target-1/role", &[])).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_role_forbidden_for_non_admin() {
    let ctx = TestContext::new();

    for token in ["user-token", "plain-token", "orphan-token"] {
        let response = ctx
            .send(get(
                "/api/admin/users/target-1/role",
                &[("authorization", bearer(token).as_str())],
            ))
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{token}");
    }
}

#[tokio::test]
async fn test_get_role_as_admin() {
    let ctx = TestContext::new();

    let response = ctx
        .send(get(
            "/api/admin/users/target-1/role",
            &[("authorization", bearer("admin-token").as_str())],
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "uid": "target-1", "role": "user" })
    );
}

#[tokio::test]
async fn test_get_role_of_unknown_user_is_guest() {
    let ctx = TestContext::new();

    let response = ctx
        .send(get(
            "/api/admin/users/nobody/role",
            &[("authorization", bearer("admin-token").as_str())],
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["role"], "guest");
}

// ============================================================================
// Admin: assign role
// ============================================================================

#[tokio::test]
async fn test_set_role_as_admin() {
    let ctx = TestContext::new();

    let response = ctx.send(put_role("target-1", "admin-token", "admin")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "uid": "target-1", "role": "admin" })
    );

    let target = Uid::parse("target-1").unwrap();
    assert_eq!(ctx.identity.get_role(&target).await, Role::Admin);
}

#[tokio::test]
async fn test_set_role_forbidden_for_non_admin() {
    let ctx = TestContext::new();

    let response = ctx.send(put_role("target-1", "user-token", "admin")).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let target = Uid::parse("target-1").unwrap();
    assert_eq!(ctx.identity.get_role(&target).await, Role::User);
}

#[tokio::test]
async fn test_set_unknown_role_is_bad_request() {
    let ctx = TestContext::new();

    let response = ctx.send(put_role("target-1", "admin-token", "superuser")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_set_role_of_unknown_user_is_bad_gateway() {
    let ctx = TestContext::new();

    let response = ctx.send(put_role("nobody", "admin-token", "user")).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["error"], "Identity provider error");
}

#[tokio::test]
async fn test_demoted_admin_loses_access() {
    let ctx = TestContext::new();

    let response = ctx.send(put_role("admin-1", "admin-token", "user")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .send(get(
            "/api/admin/users/target-1/role",
            &[("authorization", bearer("admin-token").as_str())],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_removed_user_falls_back_to_guest() {
    let ctx = TestContext::new();
    let uid = Uid::parse("user-1").unwrap();

    ctx.provider.remove_user(&uid).await;

    assert_eq!(ctx.identity.get_role(&uid).await, Role::Guest);
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_and_readiness() {
    let ctx = TestContext::new();

    let response = ctx.send(get("/health", &[])).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx.send(get("/health/ready", &[])).await;
    assert_eq!(response.status(), StatusCode::OK);
}
