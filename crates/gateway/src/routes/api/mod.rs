//! JSON API routes.

pub mod admin;
pub mod session;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create the admin API routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new().route(
        "/users/{uid}/role",
        get(admin::get_user_role).put(admin::set_user_role),
    )
}

/// Create the API routes router, mounted under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/session", get(session::current_session))
        .nest("/admin", admin_routes())
}
