//! Identity-provider subject identifier.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Uid`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UidError {
    /// The input string is empty.
    #[error("uid cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("uid must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains characters that cannot appear in a path segment.
    #[error("uid contains invalid characters")]
    InvalidCharacters,
}

/// The subject identifier of a user identity (the token `sub` claim).
///
/// ## Constraints
///
/// - Length: 1-128 characters (identity provider limit)
/// - No whitespace, `/` or control characters
///
/// ## Examples
///
/// ```
/// use ethical_kb_core::Uid;
///
/// assert!(Uid::parse("x7Yq3LbQmTd9").is_ok());
/// assert!(Uid::parse("").is_err());
/// assert!(Uid::parse("a/b").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Uid(String);

impl Uid {
    /// Maximum length of a subject identifier.
    pub const MAX_LENGTH: usize = 128;

    /// Parse a `Uid` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 128 characters, or
    /// contains whitespace, `/` or control characters.
    pub fn parse(s: &str) -> Result<Self, UidError> {
        if s.is_empty() {
            return Err(UidError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(UidError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '/')
        {
            return Err(UidError::InvalidCharacters);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the uid as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Uid` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Uid {
    type Err = UidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Uid {
    type Error = UidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Uid> for String {
    fn from(uid: Uid) -> Self {
        uid.0
    }
}

impl AsRef<str> for Uid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Uid::parse("abc123").is_ok());
        assert!(Uid::parse("kZx8-_.Q").is_ok());
        assert!(Uid::parse(&"a".repeat(128)).is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Uid::parse(""), Err(UidError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        assert!(matches!(
            Uid::parse(&"a".repeat(129)),
            Err(UidError::TooLong { max: 128 })
        ));
    }

    #[test]
    fn test_parse_invalid_characters() {
        assert_eq!(Uid::parse("a b"), Err(UidError::InvalidCharacters));
        assert_eq!(Uid::parse("a/b"), Err(UidError::InvalidCharacters));
        assert_eq!(Uid::parse("a\nb"), Err(UidError::InvalidCharacters));
    }

    #[test]
    fn test_deserialize_validates() {
        let uid: Uid = serde_json::from_str("\"user-1\"").unwrap();
        assert_eq!(uid.as_str(), "user-1");
        assert!(serde_json::from_str::<Uid>("\"\"").is_err());
    }
}
