//! Request-scoped identity types.
//!
//! - [`SessionCredential`] - the opaque token a request carries
//! - [`VerifiedUser`] - the identity behind a verified token

pub mod credential;
pub mod user;

pub use credential::{CredentialSource, SESSION_COOKIES, SessionCredential};
pub use user::VerifiedUser;
