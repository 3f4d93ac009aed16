//! Declarative request classification.
//!
//! Every path maps to exactly one [`RouteClass`] through an ordered table of
//! prefix rules. The first matching rule wins; paths matching no rule are
//! [`RouteClass::Public`].
//!
//! # Default Table
//!
//! ```text
//! /api                -> Api
//! /admin              -> Protected
//! /adoption-interest  -> Protected
//! /documents          -> Protected
//! /chat               -> Protected
//! /login              -> Auth
//! /signup             -> Auth
//! /forgot-password    -> Auth
//! (anything else)     -> Public
//! ```
//!
//! Prefixes match on path-segment boundaries: `/admin` matches `/admin` and
//! `/admin/users` but not `/administrator`. Paths are normalized before
//! matching (see [`normalize_path`]), so `//admin` and `/x/../admin` are
//! classified like `/admin`.

use std::borrow::Cow;

use serde::Serialize;

/// Login page that unauthenticated requests are redirected to.
pub const LOGIN_PATH: &str = "/login";

/// Policy branch a request path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteClass {
    /// JSON API; CORS policy applies.
    Api,
    /// Page that requires a session credential.
    Protected,
    /// Login/registration page.
    Auth,
    /// Page open to everyone.
    Public,
}

impl std::fmt::Display for RouteClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Api => write!(f, "api"),
            Self::Protected => write!(f, "protected"),
            Self::Auth => write!(f, "auth"),
            Self::Public => write!(f, "public"),
        }
    }
}

/// A single prefix rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    prefix: String,
    class: RouteClass,
}

impl RouteRule {
    /// Create a rule. A trailing `/` on `prefix` is ignored.
    #[must_use]
    pub fn new(prefix: &str, class: RouteClass) -> Self {
        let trimmed = prefix.trim_end_matches('/');
        Self {
            prefix: if trimmed.is_empty() {
                "/".to_string()
            } else {
                trimmed.to_string()
            },
            class,
        }
    }

    /// The rule's prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The class assigned to matching paths.
    #[must_use]
    pub const fn class(&self) -> RouteClass {
        self.class
    }

    /// Whether `path` falls under this rule's prefix.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        if self.prefix == "/" {
            return true;
        }
        path.strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

const DEFAULT_RULES: &[(&str, RouteClass)] = &[
    ("/api", RouteClass::Api),
    ("/admin", RouteClass::Protected),
    ("/adoption-interest", RouteClass::Protected),
    ("/documents", RouteClass::Protected),
    ("/chat", RouteClass::Protected),
    (LOGIN_PATH, RouteClass::Auth),
    ("/signup", RouteClass::Auth),
    ("/forgot-password", RouteClass::Auth),
];

/// Ordered classification table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_RULES
                .iter()
                .map(|(prefix, class)| RouteRule::new(prefix, *class))
                .collect(),
        )
    }
}

impl RouteTable {
    /// Create a table from rules, in priority order.
    #[must_use]
    pub const fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// The rules, in priority order.
    #[must_use]
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Classify a request path.
    #[must_use]
    pub fn classify(&self, path: &str) -> RouteClass {
        let path = normalize_path(path);
        self.rules
            .iter()
            .find(|rule| rule.matches(&path))
            .map_or(RouteClass::Public, RouteRule::class)
    }
}

/// Collapse repeated `/` and resolve `.` and `..` segments.
///
/// Front ends serve `//admin/users` and `/x/../admin` as `/admin/users` and
/// `/admin`, so classification has to see the same path. Borrows when the
/// path is already normal.
#[must_use]
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    let is_normal = path.starts_with('/')
        && !path.contains("//")
        && !path
            .split('/')
            .any(|segment| segment == "." || segment == "..");
    if is_normal {
        return Cow::Borrowed(path);
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut normalized = format!("/{}", segments.join("/"));
    if path.ends_with('/') && normalized.len() > 1 {
        normalized.push('/');
    }
    Cow::Owned(normalized)
}

/// File extensions served as static images.
const STATIC_EXTENSIONS: &[&str] = &["svg", "png", "jpg", "jpeg", "gif", "webp", "ico"];

/// Prefixes of static asset trees.
const STATIC_PREFIXES: &[&str] = &["/_next/static/", "/_next/image", "/static/"];

/// Whether a path is a static asset that bypasses the middleware entirely.
#[must_use]
pub fn is_static_asset(path: &str) -> bool {
    if path == "/favicon.ico" || STATIC_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return true;
    }

    path.rsplit_once('.')
        .filter(|(stem, _)| !stem.is_empty() && !stem.ends_with('/'))
        .is_some_and(|(_, ext)| {
            STATIC_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_paths() {
        let table = RouteTable::default();
        assert_eq!(table.classify("/api"), RouteClass::Api);
        assert_eq!(table.classify("/api/auth/session"), RouteClass::Api);
        assert_eq!(table.classify("/api/admin/users/x/role"), RouteClass::Api);
    }

    #[test]
    fn test_protected_paths() {
        let table = RouteTable::default();
        for path in [
            "/admin",
            "/admin/users",
            "/adoption-interest",
            "/documents/42",
            "/chat",
        ] {
            assert_eq!(table.classify(path), RouteClass::Protected, "{path}");
        }
    }

    #[test]
    fn test_auth_paths() {
        let table = RouteTable::default();
        assert_eq!(table.classify("/login"), RouteClass::Auth);
        assert_eq!(table.classify("/signup"), RouteClass::Auth);
        assert_eq!(table.classify("/forgot-password"), RouteClass::Auth);
    }

    #[test]
    fn test_everything_else_is_public() {
        let table = RouteTable::default();
        assert_eq!(table.classify("/"), RouteClass::Public);
        assert_eq!(table.classify("/ngos"), RouteClass::Public);
        assert_eq!(table.classify("/about/team"), RouteClass::Public);
    }

    #[test]
    fn test_prefix_respects_segment_boundary() {
        let table = RouteTable::default();
        assert_eq!(table.classify("/administrator"), RouteClass::Public);
        assert_eq!(table.classify("/apiary"), RouteClass::Public);
        assert_eq!(table.classify("/chatter"), RouteClass::Public);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/admin/users"), "/admin/users");
        assert!(matches!(normalize_path("/admin/users"), Cow::Borrowed(_)));
        assert_eq!(normalize_path("//admin/users"), "/admin/users");
        assert_eq!(normalize_path("/admin//users/"), "/admin/users/");
        assert_eq!(normalize_path("/x/../admin"), "/admin");
        assert_eq!(normalize_path("/./chat"), "/chat");
        assert_eq!(normalize_path("/../.."), "/");
        assert_eq!(normalize_path("//"), "/");
    }

    #[test]
    fn test_unnormalized_paths_are_classified_like_their_normal_form() {
        let table = RouteTable::default();
        for path in ["//admin/users", "///admin", "/x/../admin", "/./documents/1", "//api/auth/session"] {
            assert_ne!(table.classify(path), RouteClass::Public, "{path}");
        }
        assert_eq!(table.classify("//admin/users"), RouteClass::Protected);
        assert_eq!(table.classify("//api"), RouteClass::Api);
    }

    #[test]
    fn test_first_rule_wins() {
        let table = RouteTable::new(vec![
            RouteRule::new("/docs/public", RouteClass::Public),
            RouteRule::new("/docs", RouteClass::Protected),
        ]);
        assert_eq!(table.classify("/docs/public/readme"), RouteClass::Public);
        assert_eq!(table.classify("/docs/private"), RouteClass::Protected);
    }

    #[test]
    fn test_rule_trailing_slash_ignored() {
        let rule = RouteRule::new("/admin/", RouteClass::Protected);
        assert_eq!(rule.prefix(), "/admin");
        assert!(rule.matches("/admin"));
    }

    #[test]
    fn test_root_rule_matches_everything() {
        let table = RouteTable::new(vec![RouteRule::new("/", RouteClass::Protected)]);
        assert_eq!(table.classify("/anything"), RouteClass::Protected);
    }

    #[test]
    fn test_static_assets() {
        assert!(is_static_asset("/_next/static/chunks/main.js"));
        assert!(is_static_asset("/_next/image?url=%2Flogo.png"));
        assert!(is_static_asset("/favicon.ico"));
        assert!(is_static_asset("/images/hero.webp"));
        assert!(is_static_asset("/logo.SVG"));
        assert!(is_static_asset("/static/app.css"));
    }

    #[test]
    fn test_not_static_assets() {
        assert!(!is_static_asset("/"));
        assert!(!is_static_asset("/admin"));
        assert!(!is_static_asset("/api/files.json"));
        assert!(!is_static_asset("/documents/report.pdf"));
        assert!(!is_static_asset("/.png"));
    }
}
