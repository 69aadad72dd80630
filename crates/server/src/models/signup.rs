//! Pending signup domain types.

use chrono::{DateTime, Utc};

use signup_core::{CountryCode, Domain, Email, LanguageCode, SignupId};

/// A signup waiting for its double opt-in confirmation.
///
/// Implements `Debug` manually to keep the password hash out of logs.
#[derive(Clone)]
pub struct Signup {
    /// Confirmation token, doubles as the primary key.
    pub id: SignupId,
    /// When the signup was submitted.
    pub created_at: DateTime<Utc>,
    /// Applicant's email, later the organization's contact email.
    pub email: Email,
    /// Argon2 hash of the password the admin user will get.
    pub password_hash: String,
    /// Contact first name.
    pub firstname: String,
    /// Contact last name.
    pub lastname: String,
    /// Organization display name.
    pub organization: String,
    /// Billing country.
    pub country: CountryCode,
    /// Organization language.
    pub language: LanguageCode,
    /// Fully-qualified tenant domain.
    pub domain: Domain,
}

impl std::fmt::Debug for Signup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signup")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("organization", &self.organization)
            .field("country", &self.country)
            .field("language", &self.language)
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

impl Signup {
    /// "First Last", as used to address the applicant.
    #[must_use]
    pub fn recipient_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

/// Data needed to persist a new pending signup.
#[derive(Clone)]
pub struct NewSignup {
    pub id: SignupId,
    pub created_at: DateTime<Utc>,
    pub email: Email,
    pub password_hash: String,
    pub firstname: String,
    pub lastname: String,
    pub organization: String,
    pub country: CountryCode,
    pub language: LanguageCode,
    pub domain: Domain,
}

impl From<NewSignup> for Signup {
    fn from(new: NewSignup) -> Self {
        Self {
            id: new.id,
            created_at: new.created_at,
            email: new.email,
            password_hash: new.password_hash,
            firstname: new.firstname,
            lastname: new.lastname,
            organization: new.organization,
            country: new.country,
            language: new.language,
            domain: new.domain,
        }
    }
}
