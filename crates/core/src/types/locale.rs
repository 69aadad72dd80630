//! Email template locales.

use serde::{Deserialize, Serialize};

/// Locale an outgoing email is rendered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English, the baseline for any language without its own templates.
    #[default]
    En,
    /// German.
    De,
}

impl Locale {
    /// Pick the template locale for a free-form language code.
    ///
    /// ```
    /// use signup_core::Locale;
    ///
    /// assert_eq!(Locale::select("DE"), Locale::De);
    /// assert_eq!(Locale::select("fr"), Locale::En);
    /// ```
    #[must_use]
    pub fn select(language: &str) -> Self {
        if language.eq_ignore_ascii_case("de") {
            Self::De
        } else {
            Self::En
        }
    }
}
