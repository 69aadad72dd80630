//! Supported country and language codes.
//!
//! Both allow-lists are built once on first use and never reallocated.

use core::fmt;
use std::collections::HashSet;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// ISO 3166-1 alpha-2 codes of the jurisdictions we can bill and contract in.
static SUPPORTED_COUNTRIES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "BE", "BG", "DK", "DE", "EE", "FJ", "FR", "GR", "IE", "IT", "HR", "LV", "LT", "LU", "MT",
        "NL", "AT", "PL", "PT", "RO", "SE", "SK", "SI", "ES", "CZ", "HU", "CY",
    ]
    .into_iter()
    .collect()
});

/// ISO 639-1 codes accepted as the organization language.
static SUPPORTED_LANGUAGES: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["de"].into_iter().collect());

/// Errors from region code parsing.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    /// Country code is not in the supported set.
    #[error("unsupported country code: {0}")]
    UnsupportedCountry(String),
    /// Language code is not in the supported set.
    #[error("unsupported language code: {0}")]
    UnsupportedLanguage(String),
}

/// A supported country code, normalized to upper case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    /// Parse a country code (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `RegionError::UnsupportedCountry` if the code is not allowed.
    pub fn parse(s: &str) -> Result<Self, RegionError> {
        let code = s.to_uppercase();
        if SUPPORTED_COUNTRIES.contains(code.as_str()) {
            Ok(Self(code))
        } else {
            Err(RegionError::UnsupportedCountry(s.to_owned()))
        }
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A supported language code, normalized to lower case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Parse a language code (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `RegionError::UnsupportedLanguage` if the code is not allowed.
    pub fn parse(s: &str) -> Result<Self, RegionError> {
        let code = s.to_lowercase();
        if SUPPORTED_LANGUAGES.contains(code.as_str()) {
            Ok(Self(code))
        } else {
            Err(RegionError::UnsupportedLanguage(s.to_owned()))
        }
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_country_case_insensitive() {
        assert_eq!(CountryCode::parse("de").unwrap().as_str(), "DE");
        assert_eq!(CountryCode::parse("Fj").unwrap().as_str(), "FJ");
        assert_eq!(CountryCode::parse("at").unwrap().to_string(), "AT");
    }

    #[test]
    fn test_country_outside_allow_list() {
        assert_eq!(
            CountryCode::parse("US"),
            Err(RegionError::UnsupportedCountry("US".to_owned()))
        );
        assert!(CountryCode::parse("GB").is_err());
        assert!(CountryCode::parse("").is_err());
    }

    #[test]
    fn test_every_listed_country_is_two_letters() {
        assert_eq!(SUPPORTED_COUNTRIES.len(), 27);
        assert!(SUPPORTED_COUNTRIES.iter().all(|c| c.len() == 2));
    }

    #[test]
    fn test_language() {
        assert_eq!(LanguageCode::parse("DE").unwrap().as_str(), "de");
        assert!(LanguageCode::parse("en").is_err());
        assert_eq!(
            LanguageCode::parse("fr"),
            Err(RegionError::UnsupportedLanguage("fr".to_owned()))
        );
    }
}
