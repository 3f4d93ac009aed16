//! Edge policy: one decision per request.
//!
//! | Route class | Decision |
//! |-------------|----------|
//! | `Api` + `OPTIONS` | `204` preflight |
//! | `Api` + foreign `Origin` | `403` JSON |
//! | `Api` otherwise | handler, CORS headers echo the origin |
//! | `Protected` without session cookie | `302` to the login page |
//! | anything else | handler |
//!
//! Static assets never reach the policy. The session cookie only has to be
//! present here; its validity is checked by the identity gateway in handlers.

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::middleware::cors::{self, OriginCheck};
use crate::models::SessionCredential;
use crate::route_table::{LOGIN_PATH, RouteClass, is_static_asset, normalize_path};
use crate::state::AppState;

/// Apply the edge policy to a request.
pub async fn edge_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if is_static_asset(path) {
        return next.run(request).await;
    }

    match state.routes().classify(path) {
        RouteClass::Api => api_policy(&state, request, next).await,
        RouteClass::Protected => protected_policy(request, next).await,
        RouteClass::Auth | RouteClass::Public => next.run(request).await,
    }
}

async fn api_policy(state: &AppState, request: Request, next: Next) -> Response {
    let origins = state.allowed_origins();
    let check = cors::check_origin(origins, request.headers());

    if request.method() == Method::OPTIONS {
        return cors::preflight_response(origins, &check);
    }

    match check {
        OriginCheck::SameOrigin => next.run(request).await,
        OriginCheck::Allowed(origin) => {
            let mut response = next.run(request).await;
            cors::apply_cors_headers(response.headers_mut(), &origin);
            response
        }
        OriginCheck::Rejected(origin) => {
            tracing::warn!(
                origin = %origin,
                path = %request.uri().path(),
                "Rejected API request from origin outside allow-list"
            );
            AppError::OriginNotAllowed(origin).into_response()
        }
    }
}

async fn protected_policy(request: Request, next: Next) -> Response {
    if SessionCredential::from_cookies(request.headers()).is_some() {
        return next.run(request).await;
    }

    let path = normalize_path(request.uri().path());
    tracing::debug!(path = %path, "No session cookie on protected page, redirecting to login");
    login_redirect(&path)
}

/// Location of the login page that returns to `path` afterwards.
#[must_use]
pub fn login_location(path: &str) -> String {
    format!("{LOGIN_PATH}?redirect={}", urlencoding::encode(path))
}

/// `302 Found` to the login page.
#[must_use]
pub fn login_redirect(path: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, login_location(path))]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_location_encodes_path() {
        assert_eq!(login_location("/admin/users"), "/login?redirect=%2Fadmin%2Fusers");
        assert_eq!(login_location("/chat"), "/login?redirect=%2Fchat");
    }

    #[test]
    fn test_login_redirect_is_found() {
        let response = login_redirect("/documents/42");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/login?redirect=%2Fdocuments%2F42"
        );
    }
}
