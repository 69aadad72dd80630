//! Confirmation identifier of a pending signup.

use core::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`SignupId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SignupIdError {
    /// The identifier is empty.
    #[error("signup id cannot be empty")]
    Empty,
    /// The identifier is longer than any id we issue.
    #[error("signup id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The identifier contains characters outside the URL-safe base64 alphabet.
    #[error("signup id contains invalid characters")]
    InvalidCharacter,
}

/// Opaque confirmation token of a pending signup.
///
/// Anyone holding the id can provision the tenant, so it is a bearer token:
/// it is never logged in full (see [`SignupId::redacted`]) and `Debug` prints
/// only a prefix. The server owns the CSPRNG and hands raw bytes to
/// [`SignupId::from_bytes`].
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignupId(String);

impl SignupId {
    /// Maximum accepted length.
    pub const MAX_LENGTH: usize = 128;

    /// Characters shown by [`SignupId::redacted`].
    const VISIBLE_PREFIX: usize = 6;

    /// Parse an id received from a client or read from storage.
    ///
    /// # Errors
    ///
    /// Returns a [`SignupIdError`] if the input cannot be an id we issued.
    pub fn parse(s: &str) -> Result<Self, SignupIdError> {
        if s.is_empty() {
            return Err(SignupIdError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(SignupIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(SignupIdError::InvalidCharacter);
        }
        Ok(Self(s.to_owned()))
    }

    /// Encode random bytes as a new id (URL-safe base64 without padding).
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Returns the full token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A short prefix that is safe to put in logs.
    #[must_use]
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(Self::VISIBLE_PREFIX).collect();
        format!("{prefix}…")
    }
}

impl fmt::Debug for SignupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SignupId").field(&self.redacted()).finish()
    }
}

impl fmt::Display for SignupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_url_safe_base64() {
        let id = SignupId::parse("aZ09-_xyz").unwrap();
        assert_eq!(id.as_str(), "aZ09-_xyz");
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert_eq!(SignupId::parse(""), Err(SignupIdError::Empty));
        assert_eq!(
            SignupId::parse("abc/def"),
            Err(SignupIdError::InvalidCharacter)
        );
        assert!(matches!(
            SignupId::parse(&"a".repeat(129)),
            Err(SignupIdError::TooLong { .. })
        ));
    }

    #[test]
    fn test_from_bytes_parses_back() {
        let id = SignupId::from_bytes(&[0xff; 32]);
        assert_eq!(id.as_str().len(), 43);
        assert!(id.as_str().starts_with("____"));
        assert_eq!(SignupId::parse(id.as_str()), Ok(id));
    }

    #[test]
    fn test_debug_and_display_hide_token() {
        let id = SignupId::parse("abcdefghijklmnop").unwrap();
        assert_eq!(id.to_string(), "abcdef…");
        assert!(!format!("{id:?}").contains("ghijklmnop"));
    }
}
