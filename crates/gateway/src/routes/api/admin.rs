//! Role administration endpoints.
//!
//! Both handlers require the caller to hold the `admin` role claim. Role
//! changes take effect on the target's next token refresh.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use ethical_kb_core::{Role, Uid};

use crate::error::{AppError, Result};
use crate::identity::RoleAssignment;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// A user's role.
#[derive(Debug, Serialize)]
pub struct UserRoleResponse {
    pub uid: Uid,
    pub role: Role,
}

/// Body of a role assignment.
///
/// The role is taken as a string so unknown values map to `400`.
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

fn parse_uid(raw: &str) -> Result<Uid> {
    Uid::parse(raw).map_err(|e| AppError::BadRequest(format!("Invalid uid: {e}")))
}

/// `GET /api/admin/users/{uid}/role`
pub async fn get_user_role(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(uid): Path<String>,
) -> Result<Json<UserRoleResponse>> {
    let uid = parse_uid(&uid)?;
    let role = state.identity().get_role(&uid).await;
    Ok(Json(UserRoleResponse { uid, role }))
}

/// `PUT /api/admin/users/{uid}/role`
pub async fn set_user_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(uid): Path<String>,
    Json(body): Json<SetRoleRequest>,
) -> Result<Json<UserRoleResponse>> {
    let uid = parse_uid(&uid)?;
    let role: Role = body
        .role
        .parse()
        .map_err(|e: ethical_kb_core::RoleError| AppError::BadRequest(e.to_string()))?;

    match state.identity().set_role(&uid, role).await {
        RoleAssignment::Applied => {
            tracing::info!(admin = %admin.uid, target = %uid, role = %role, "Role assigned");
            Ok(Json(UserRoleResponse { uid, role }))
        }
        RoleAssignment::Failed { reason } => Err(AppError::IdentityProvider(reason)),
    }
}
