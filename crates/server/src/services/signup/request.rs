//! Signup request body and its structural validation.

use serde::Deserialize;

use signup_core::{DomainLabel, Email};

use super::SignupError;

/// Minimum password length, counted in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// JSON body of `POST /`.
///
/// `firstname` and `lastname` are decoy fields hidden from humans; the real
/// contact names arrive as `contactFirstname`/`contactLastname`. Missing fields
/// deserialize as empty so they fail validation instead of JSON parsing.
#[derive(Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignupRequest {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub organization: String,
    pub domain: String,
    pub contact_firstname: String,
    pub contact_lastname: String,
    pub password: String,
    pub country: String,
    pub language: String,
    pub accept_terms: bool,
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("organization", &self.organization)
            .field("domain", &self.domain)
            .field("password", &"[REDACTED]")
            .field("country", &self.country)
            .field("language", &self.language)
            .field("accept_terms", &self.accept_terms)
            .finish_non_exhaustive()
    }
}

/// A request that passed structural validation.
///
/// Country and language are only checked for shape here; the allow-lists are
/// applied later so availability conflicts are reported first.
#[derive(Clone)]
pub struct ValidSignupRequest {
    pub email: Email,
    pub organization: String,
    pub domain: DomainLabel,
    pub contact_firstname: String,
    pub contact_lastname: String,
    pub password: String,
    pub country: String,
    pub language: String,
}

/// Required means present and non-empty; whitespace is kept as submitted.
fn require(value: &str, field: &str) -> Result<(), SignupError> {
    if value.is_empty() {
        return Err(SignupError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn require_code(value: &str, field: &str) -> Result<(), SignupError> {
    require(value, field)?;
    if value.chars().count() != 2 {
        return Err(SignupError::Validation(format!(
            "{field} must be exactly 2 characters"
        )));
    }
    Ok(())
}

impl SignupRequest {
    /// Check the request's shape.
    ///
    /// # Errors
    ///
    /// Returns `SignupError::Validation` describing the first violation.
    pub fn validate(&self) -> Result<ValidSignupRequest, SignupError> {
        let email = Email::parse(&self.email)
            .map_err(|e| SignupError::Validation(format!("email: {e}")))?;
        require(&self.organization, "organization")?;
        require(&self.domain, "domain")?;
        let domain = DomainLabel::parse(&self.domain)
            .map_err(|e| SignupError::Validation(format!("domain: {e}")))?;
        require(&self.contact_firstname, "contactFirstname")?;
        require(&self.contact_lastname, "contactLastname")?;

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(SignupError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        require_code(&self.country, "country")?;
        require_code(&self.language, "language")?;

        if !self.accept_terms {
            return Err(SignupError::Validation(
                "terms must be accepted".to_string(),
            ));
        }

        Ok(ValidSignupRequest {
            email,
            organization: self.organization.clone(),
            domain,
            contact_firstname: self.contact_firstname.clone(),
            contact_lastname: self.contact_lastname.clone(),
            password: self.password.clone(),
            country: self.country.clone(),
            language: self.language.clone(),
        })
    }

    /// Whether a bot filled in one of the decoy fields.
    #[must_use]
    pub fn is_honeypot_hit(&self) -> bool {
        !self.firstname.is_empty() || !self.lastname.is_empty()
    }
}
