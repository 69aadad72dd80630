//! Organization domain types.

use chrono::{DateTime, Utc};

use signup_core::{CountryCode, Email, LanguageCode, OrganizationId};

use super::Signup;

/// A provisioned tenant organization.
#[derive(Debug, Clone)]
pub struct Organization {
    /// Assigned by the store at creation.
    pub id: OrganizationId,
    pub name: String,
    pub contact_firstname: String,
    pub contact_lastname: String,
    pub contact_email: Email,
    pub language: LanguageCode,
    pub country: CountryCode,
    pub created_at: DateTime<Utc>,
}

/// Data needed to create an organization.
#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub name: String,
    pub contact_firstname: String,
    pub contact_lastname: String,
    pub contact_email: Email,
    pub language: LanguageCode,
    pub country: CountryCode,
}

impl From<&Signup> for NewOrganization {
    fn from(signup: &Signup) -> Self {
        Self {
            name: signup.organization.clone(),
            contact_firstname: signup.firstname.clone(),
            contact_lastname: signup.lastname.clone(),
            contact_email: signup.email.clone(),
            language: signup.language.clone(),
            country: signup.country.clone(),
        }
    }
}
