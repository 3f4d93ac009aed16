//! User role claim.

use serde::{Deserialize, Serialize};

/// Error returned when a string is not a known role.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0} (expected admin, user or guest)")]
pub struct RoleError(pub String);

/// Privilege level attached to a user identity as a custom claim.
///
/// The identity provider is the sole authority for this value. It is read on
/// demand and never cached locally.
///
/// - An identity without a `role` claim is a [`Role::User`] (the default).
/// - An identity whose lookup fails is treated as a [`Role::Guest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access, including role management.
    Admin,
    /// Authenticated user with standard access.
    #[default]
    User,
    /// Unknown or unverifiable identity. The most restrictive level.
    Guest,
}

impl Role {
    /// Name of the custom claim that carries the role.
    pub const CLAIM: &'static str = "role";

    /// Returns the claim value for this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Guest => "guest",
        }
    }

    /// Whether this role grants admin capability.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            "guest" => Ok(Self::Guest),
            _ => Err(RoleError(s.to_string())),
        }
    }
}
