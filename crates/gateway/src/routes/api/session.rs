//! Current session endpoint.

use axum::{Json, extract::State};
use serde::Serialize;

use ethical_kb_core::{Role, Uid};

use crate::middleware::RequireUser;
use crate::state::AppState;

/// Verified caller and their current role.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub uid: Uid,
    pub role: Role,
}

/// `GET /api/auth/session`
pub async fn current_session(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Json<SessionResponse> {
    let role = state.identity().get_role(&user.uid).await;
    Json(SessionResponse { uid: user.uid, role })
}
