//! Session credential extraction.
//!
//! A credential is an opaque token. Its presence is all the edge middleware
//! looks at; its validity is decided by the identity provider.

use axum::http::{HeaderMap, header};
use cookie::Cookie;
use secrecy::{ExposeSecret, SecretString};

/// Cookies that carry the session token, in priority order.
pub const SESSION_COOKIES: [&str; 2] = ["__session", "authToken"];

/// Where a credential was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// A session cookie with the given name.
    Cookie(&'static str),
    /// An `Authorization: Bearer` header.
    BearerHeader,
}

/// An opaque session token taken from a request.
#[derive(Debug, Clone)]
pub struct SessionCredential {
    token: SecretString,
    source: CredentialSource,
}

impl SessionCredential {
    /// Find a credential in the session cookies.
    ///
    /// The first cookie in [`SESSION_COOKIES`] order with a non-empty value wins.
    #[must_use]
    pub fn from_cookies(headers: &HeaderMap) -> Option<Self> {
        let cookies: Vec<Cookie<'_>> = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .collect();

        SESSION_COOKIES.iter().find_map(|&name| {
            cookies
                .iter()
                .find(|c| c.name() == name && !c.value().trim().is_empty())
                .map(|c| Self {
                    token: SecretString::from(c.value().to_string()),
                    source: CredentialSource::Cookie(name),
                })
        })
    }

    /// Find a credential in the `Authorization: Bearer` header.
    #[must_use]
    pub fn from_authorization(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let (scheme, token) = value.trim().split_once(' ')?;
        let token = token.trim();

        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return None;
        }

        Some(Self {
            token: SecretString::from(token.to_string()),
            source: CredentialSource::BearerHeader,
        })
    }

    /// Find a credential in the bearer header, falling back to cookies.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        Self::from_authorization(headers).or_else(|| Self::from_cookies(headers))
    }

    /// The raw token value.
    #[must_use]
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }

    /// Where the credential was found.
    #[must_use]
    pub const fn source(&self) -> CredentialSource {
        self.source
    }
}
