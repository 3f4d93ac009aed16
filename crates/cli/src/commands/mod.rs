//! Command implementations.

pub mod role;
pub mod routes;
pub mod token;

use ethical_kb_core::{RoleError, UidError};
use ethical_kb_gateway::{
    config::{ConfigError, GatewayConfig},
    identity::IdentityGateway,
};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid user id argument.
    #[error("Invalid uid: {0}")]
    InvalidUid(#[from] UidError),

    /// Invalid role argument.
    #[error(transparent)]
    InvalidRole(#[from] RoleError),

    /// Service-account credentials are not configured.
    #[error("Role management needs FIREBASE_CLIENT_EMAIL and FIREBASE_PRIVATE_KEY")]
    ClaimManagementUnavailable,

    /// The identity provider refused or failed the operation.
    #[error("Identity provider: {0}")]
    Identity(String),
}

/// Build the identity gateway from the environment.
fn gateway() -> Result<IdentityGateway, CommandError> {
    let config = GatewayConfig::from_env()?;
    Ok(IdentityGateway::from_config(&config))
}
