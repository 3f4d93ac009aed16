//! CORS policy for API routes.
//!
//! The allow-list is read once from configuration and never changes. An
//! origin is allowed when it equals an entry exactly, or when the entry
//! starts with `https://` and the request origin ends with the rest of the
//! entry. The suffix has to start at a host label, so the origin's host must
//! be the entry's host or a subdomain of it:
//!
//! ```text
//! entry  https://example.com
//! allows https://example.com, https://app.example.com, http://app.example.com
//! denies https://evilexample.com, https://example.com.evil.test
//! ```
//!
//! Requests without an `Origin` header are same-origin and always allowed.

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

/// Origin used when `ALLOWED_ORIGINS` is unset.
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// Methods advertised in preflight responses.
pub const ALLOWED_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";

/// Request headers advertised in preflight responses.
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization, X-API-Key";

/// Preflight cache lifetime in seconds.
pub const MAX_AGE_SECS: &str = "86400";

const HTTPS: &str = "https://";

/// Ordered, immutable CORS allow-list. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedOrigins(Vec<String>);

impl Default for AllowedOrigins {
    fn default() -> Self {
        Self(vec![DEFAULT_ORIGIN.to_string()])
    }
}

impl AllowedOrigins {
    /// Build an allow-list from entries. Falls back to the default when empty.
    #[must_use]
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let origins: Vec<String> = origins
            .into_iter()
            .map(|o| o.as_ref().trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();

        if origins.is_empty() {
            return Self::default();
        }

        for origin in &origins {
            if url::Url::parse(origin).is_err() {
                tracing::warn!(origin = %origin, "Allowed origin is not a valid URL, it will only match exactly");
            }
        }

        Self(origins)
    }

    /// Parse a comma-separated list.
    #[must_use]
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// The first configured origin (preflight fallback).
    #[must_use]
    pub fn first(&self) -> &str {
        self.0.first().map_or(DEFAULT_ORIGIN, String::as_str)
    }

    /// Iterate over configured origins in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether a request origin is allowed.
    #[must_use]
    pub fn is_allowed(&self, origin: &str) -> bool {
        self.0.iter().any(|entry| entry_matches(entry, origin))
    }
}

/// Exact match, or the host (or a subdomain) of an `https://` entry.
fn entry_matches(entry: &str, origin: &str) -> bool {
    if entry == origin {
        return true;
    }

    let Some(suffix) = entry.strip_prefix(HTTPS) else {
        return false;
    };
    let host = origin.split_once("://").map_or(origin, |(_, host)| host);

    host.strip_suffix(suffix)
        .is_some_and(|rest| rest.is_empty() || (rest.len() > 1 && rest.ends_with('.')))
}

/// Result of checking a request's `Origin` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginCheck {
    /// No `Origin` header.
    SameOrigin,
    /// Allow-listed origin.
    Allowed(String),
    /// Origin outside the allow-list (or unreadable).
    Rejected(String),
}

/// Check the `Origin` header against the allow-list.
#[must_use]
pub fn check_origin(origins: &AllowedOrigins, headers: &HeaderMap) -> OriginCheck {
    let Some(value) = headers.get(header::ORIGIN) else {
        return OriginCheck::SameOrigin;
    };

    match value.to_str() {
        Ok(origin) if origins.is_allowed(origin) => OriginCheck::Allowed(origin.to_string()),
        Ok(origin) => OriginCheck::Rejected(origin.to_string()),
        Err(_) => OriginCheck::Rejected(String::from_utf8_lossy(value.as_bytes()).into_owned()),
    }
}

/// Empty `204` answer to a preflight request.
///
/// Echoes the request origin when allowed, otherwise advertises the first
/// configured origin.
#[must_use]
pub fn preflight_response(origins: &AllowedOrigins, check: &OriginCheck) -> Response {
    let allow_origin = match check {
        OriginCheck::Allowed(origin) => origin.as_str(),
        OriginCheck::SameOrigin | OriginCheck::Rejected(_) => origins.first(),
    };

    let mut response = (StatusCode::NO_CONTENT, Body::empty()).into_response();
    let headers = response.headers_mut();

    insert(headers, header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(MAX_AGE_SECS),
    );
    headers.append(header::VARY, HeaderValue::from_static("Origin"));

    response
}

/// Add CORS headers for a validated origin to an actual response.
pub fn apply_cors_headers(headers: &mut HeaderMap, origin: &str) {
    insert(headers, header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("X-Request-Id"),
    );
    headers.append(header::VARY, HeaderValue::from_static("Origin"));
}

fn insert(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::warn!(header = %name, value, "Skipping invalid CORS header value"),
    }
}
