//! Verified caller identity.

use serde_json::Value;

use ethical_kb_core::Uid;

use crate::identity::{Claims, DecodedToken};

/// Identity of a caller whose token was verified.
///
/// Carries the token's claims for display purposes only. Privilege decisions
/// go through [`IdentityGateway::get_role`](crate::identity::IdentityGateway::get_role).
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedUser {
    /// Subject identifier.
    pub uid: Uid,
    /// Claims carried by the verified token.
    pub claims: Claims,
}

impl VerifiedUser {
    /// Email address from the token, if present.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.claims.get("email").and_then(Value::as_str)
    }
}

impl From<DecodedToken> for VerifiedUser {
    fn from(token: DecodedToken) -> Self {
        Self {
            uid: token.uid,
            claims: token.claims,
        }
    }
}
