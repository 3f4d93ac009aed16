//! Role management commands.
//!
//! # Environment Variables
//!
//! - `FIREBASE_PROJECT_ID` - Project id
//! - `FIREBASE_CLIENT_EMAIL` - Service-account email
//! - `FIREBASE_PRIVATE_KEY` - Service-account PEM key
//!
//! The operator running these commands is trusted; no caller token is checked.

use ethical_kb_core::{Role, Uid};
use ethical_kb_gateway::identity::{IdentityGateway, RoleAssignment};

use super::{CommandError, gateway};

fn claims_gateway() -> Result<IdentityGateway, CommandError> {
    let gateway = gateway()?;
    if !gateway.capabilities().manage_claims {
        return Err(CommandError::ClaimManagementUnavailable);
    }
    Ok(gateway)
}

/// Show a user's role.
///
/// A user unknown to the identity provider is reported as `guest`.
pub async fn get(uid: &str) -> Result<Role, CommandError> {
    let uid = Uid::parse(uid)?;
    let gateway = claims_gateway()?;

    let role = gateway.get_role(&uid).await;
    tracing::info!("{uid}: {role}");

    Ok(role)
}

/// Assign a role, replacing the user's custom claims.
pub async fn set(uid: &str, role: &str) -> Result<(), CommandError> {
    let uid = Uid::parse(uid)?;
    let role: Role = role.parse()?;
    let gateway = claims_gateway()?;

    tracing::info!("Assigning role {role} to {uid}...");
    match gateway.set_role(&uid, role).await {
        RoleAssignment::Applied => {
            tracing::info!("Role assigned. It takes effect when the user's token refreshes.");
            Ok(())
        }
        RoleAssignment::Failed { reason } => Err(CommandError::Identity(reason)),
    }
}
