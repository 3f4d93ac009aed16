//! ID token commands.

use ethical_kb_gateway::identity::TokenVerification;

use super::{CommandError, gateway};

/// Verify an ID token and show its subject and claims.
pub async fn verify(token: &str) -> Result<(), CommandError> {
    let gateway = gateway()?;

    match gateway.verify_token(token.trim()).await {
        TokenVerification::Verified(decoded) => {
            tracing::info!("Token valid");
            tracing::info!("  uid: {}", decoded.uid);
            for (name, value) in &decoded.claims {
                tracing::info!("  {name}: {value}");
            }
            Ok(())
        }
        TokenVerification::Rejected { reason } => Err(CommandError::Identity(reason)),
    }
}
