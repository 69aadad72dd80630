//! Tenant domain types.
//!
//! A [`DomainLabel`] is the subdomain an applicant picks; a [`Domain`] is the
//! fully-qualified hostname the label becomes once the system-owned suffix is
//! appended.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`DomainLabel`] or [`Domain`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The label is empty.
    #[error("domain label cannot be empty")]
    Empty,
    /// The label is longer than a DNS label may be.
    #[error("domain label must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The label contains a character outside `a-z`, `0-9` and `-`.
    #[error("domain label contains invalid character {0:?}")]
    InvalidCharacter(char),
    /// The label starts or ends with a hyphen.
    #[error("domain label cannot start or end with a hyphen")]
    EdgeHyphen,
    /// The suffix is not a dotted hostname tail.
    #[error("domain suffix must start with a dot: {0:?}")]
    InvalidSuffix(String),
}

/// The subdomain label chosen by an applicant, lower-cased.
///
/// ```
/// use signup_core::DomainLabel;
///
/// assert_eq!(DomainLabel::parse("Acme").unwrap().as_str(), "acme");
/// assert!(DomainLabel::parse("-acme").is_err());
/// assert!(DomainLabel::parse("acme.evil").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainLabel(String);

impl DomainLabel {
    /// Maximum length of a single DNS label.
    pub const MAX_LENGTH: usize = 63;

    /// Parse and lower-case a label.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] if the label is not a valid DNS label.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let label = s.to_lowercase();

        if label.is_empty() {
            return Err(DomainError::Empty);
        }

        if label.len() > Self::MAX_LENGTH {
            return Err(DomainError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = label
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(DomainError::InvalidCharacter(c));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(DomainError::EdgeHyphen);
        }

        Ok(Self(label))
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append the system-owned suffix to form the tenant's hostname.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSuffix` if `suffix` does not start with a dot
    /// or is only a dot.
    pub fn with_suffix(&self, suffix: &str) -> Result<Domain, DomainError> {
        if !suffix.starts_with('.') || suffix.len() < 2 {
            return Err(DomainError::InvalidSuffix(suffix.to_owned()));
        }
        Ok(Domain(format!("{}{suffix}", self.0)))
    }
}

impl fmt::Display for DomainLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fully-qualified tenant hostname, e.g. `acme.on.seatsurfing.de`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Domain(String);

impl Domain {
    /// Wrap a hostname read back from storage.
    ///
    /// Stored domains were built by [`DomainLabel::with_suffix`], so only the
    /// basic shape is checked here.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Empty` for an empty string and
    /// `DomainError::InvalidSuffix` when there is no dot.
    pub fn from_stored(s: &str) -> Result<Self, DomainError> {
        if s.is_empty() {
            return Err(DomainError::Empty);
        }
        if !s.contains('.') {
            return Err(DomainError::InvalidSuffix(s.to_owned()));
        }
        Ok(Self(s.to_lowercase()))
    }

    /// Returns the hostname as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Login name of the organization admin created for this domain.
    #[must_use]
    pub fn admin_username(&self) -> String {
        format!("admin@{}", self.0)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SUFFIX: &str = ".on.seatsurfing.de";

    #[test]
    fn test_label_is_lowercased() {
        let label = DomainLabel::parse("AcMe-42").unwrap();
        assert_eq!(label.as_str(), "acme-42");
    }

    #[test]
    fn test_label_rejects_bad_input() {
        assert_eq!(DomainLabel::parse(""), Err(DomainError::Empty));
        assert_eq!(
            DomainLabel::parse("acme.corp"),
            Err(DomainError::InvalidCharacter('.'))
        );
        assert_eq!(
            DomainLabel::parse("ac me"),
            Err(DomainError::InvalidCharacter(' '))
        );
        assert_eq!(DomainLabel::parse("acme-"), Err(DomainError::EdgeHyphen));
        assert!(matches!(
            DomainLabel::parse(&"a".repeat(64)),
            Err(DomainError::TooLong { max: 63 })
        ));
    }

    #[test]
    fn test_with_suffix() {
        let domain = DomainLabel::parse("Acme")
            .unwrap()
            .with_suffix(SUFFIX)
            .unwrap();
        assert_eq!(domain.as_str(), "acme.on.seatsurfing.de");
        assert_eq!(domain.admin_username(), "admin@acme.on.seatsurfing.de");
    }

    #[test]
    fn test_with_suffix_requires_leading_dot() {
        let label = DomainLabel::parse("acme").unwrap();
        assert!(label.with_suffix("seatsurfing.de").is_err());
        assert!(label.with_suffix(".").is_err());
    }

    #[test]
    fn test_from_stored() {
        let domain = Domain::from_stored("Acme.On.Seatsurfing.De").unwrap();
        assert_eq!(domain.as_str(), "acme.on.seatsurfing.de");
        assert!(Domain::from_stored("").is_err());
        assert!(Domain::from_stored("localhost").is_err());
    }
}
