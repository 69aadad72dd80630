//! Tenant signup with double opt-in.
//!
//! A submitted [`SignupRequest`] becomes a pending [`Signup`] and a mail with a
//! confirmation link. Following the link provisions the organization, its
//! primary domain binding and an admin user, then discards the pending signup.

mod error;
pub mod request;

pub use error::SignupError;
pub use request::{SignupRequest, ValidSignupRequest};

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::instrument;

use signup_core::{CountryCode, Domain, Email, LanguageCode, Locale, SignupId};

use crate::config::SignupSettings;
use crate::db::{OrganizationStore, RepositoryError, SignupStore, UserStore};
use crate::models::{NewOrganization, NewSignup, NewUser, Organization, Signup, User};
use crate::services::email::{MailContent, Mailer, OutgoingMail};

/// Random bytes in a confirmation id.
const SIGNUP_ID_BYTES: usize = 32;

/// Generate a fresh confirmation id: 32 random bytes, URL-safe base64 without
/// padding (43 characters).
#[must_use]
pub fn generate_signup_id() -> SignupId {
    let mut bytes = [0u8; SIGNUP_ID_BYTES];
    rand::rng().fill(&mut bytes);
    SignupId::from_bytes(&bytes)
}

/// Stores and mailer the signup flow runs against.
#[derive(Clone)]
pub struct Collaborators {
    pub signups: Arc<dyn SignupStore>,
    pub organizations: Arc<dyn OrganizationStore>,
    pub users: Arc<dyn UserStore>,
    pub mailer: Arc<dyn Mailer>,
}

/// Result of a signup submission.
#[derive(Debug)]
pub enum SignupOutcome {
    /// A pending signup was stored and the opt-in mail went out.
    Created(Signup),
    /// A decoy field was filled in; nothing happened.
    Ignored,
}

/// Everything a confirmation provisioned.
#[derive(Debug)]
pub struct Provisioned {
    pub organization: Organization,
    pub admin: User,
}

/// Signup and confirmation workflow.
#[derive(Clone)]
pub struct SignupService {
    signups: Arc<dyn SignupStore>,
    organizations: Arc<dyn OrganizationStore>,
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    settings: SignupSettings,
}

impl SignupService {
    /// Create a new signup service.
    #[must_use]
    pub fn new(collaborators: Collaborators, settings: SignupSettings) -> Self {
        let Collaborators {
            signups,
            organizations,
            users,
            mailer,
        } = collaborators;

        Self {
            signups,
            organizations,
            users,
            mailer,
            settings,
        }
    }

    /// Settings this service was built with.
    #[must_use]
    pub const fn settings(&self) -> &SignupSettings {
        &self.settings
    }

    /// Whether no organization is bound to `domain`.
    ///
    /// # Errors
    ///
    /// Returns `SignupError::Repository` if the lookup fails. A failed lookup is
    /// never reported as available.
    pub async fn is_domain_available(&self, domain: &Domain) -> Result<bool, SignupError> {
        Ok(self.organizations.get_by_domain(domain).await?.is_none())
    }

    /// Whether `email` is neither an organization's contact email nor the email
    /// of a pending signup.
    ///
    /// # Errors
    ///
    /// Returns `SignupError::Repository` if a lookup fails.
    pub async fn is_email_available(&self, email: &Email) -> Result<bool, SignupError> {
        if self.organizations.get_by_email(email).await?.is_some() {
            return Ok(false);
        }
        Ok(self.signups.get_by_email(email).await?.is_none())
    }

    /// Handle a signup submission.
    ///
    /// # Errors
    ///
    /// - `SignupError::Validation` if the request is malformed
    /// - `SignupError::DomainTaken` / `SignupError::EmailTaken` on conflicts
    /// - `SignupError::InvalidCountry` / `SignupError::InvalidLanguage` outside the allow-lists
    /// - `SignupError::Repository`, `SignupError::Email` or
    ///   `SignupError::PasswordHash` on downstream failures. If the opt-in mail
    ///   cannot be sent, the stored signup is removed again.
    #[instrument(skip_all, fields(domain = %request.domain))]
    pub async fn signup(&self, request: &SignupRequest) -> Result<SignupOutcome, SignupError> {
        let valid = request.validate()?;

        if request.is_honeypot_hit() {
            tracing::info!("Honeypot field filled in, ignoring signup");
            return Ok(SignupOutcome::Ignored);
        }

        let domain = valid
            .domain
            .with_suffix(&self.settings.domain_suffix)
            .map_err(|e| SignupError::Validation(e.to_string()))?;

        if !self.is_domain_available(&domain).await? {
            return Err(SignupError::DomainTaken);
        }
        if !self.is_email_available(&valid.email).await? {
            return Err(SignupError::EmailTaken);
        }

        let country = CountryCode::parse(&valid.country)
            .map_err(|_| SignupError::InvalidCountry(valid.country.clone()))?;
        let language = LanguageCode::parse(&valid.language)
            .map_err(|_| SignupError::InvalidLanguage(valid.language.clone()))?;

        let password_hash = self.users.hash_password(&valid.password)?;

        let signup = self
            .signups
            .create(NewSignup {
                id: generate_signup_id(),
                created_at: Utc::now(),
                email: valid.email,
                password_hash,
                firstname: valid.contact_firstname,
                lastname: valid.contact_lastname,
                organization: valid.organization,
                country,
                language,
                domain,
            })
            .await?;

        if let Err(e) = self.send_opt_in_mail(&signup).await {
            tracing::error!(
                signup_id = %signup.id,
                error = %e,
                "Failed to send double opt-in email, discarding signup"
            );
            if let Err(delete_err) = self.signups.delete(&signup.id).await {
                tracing::error!(
                    signup_id = %signup.id,
                    error = %delete_err,
                    "Failed to discard signup after email failure"
                );
            }
            return Err(e);
        }

        tracing::info!(
            signup_id = %signup.id,
            domain = %signup.domain,
            "Signup created, awaiting confirmation"
        );

        Ok(SignupOutcome::Created(signup))
    }

    /// Confirm a pending signup and provision its tenant.
    ///
    /// # Errors
    ///
    /// - `SignupError::NotFound` if no pending signup has this id
    /// - `SignupError::DomainTaken` if the domain was claimed in the meantime;
    ///   the pending signup is discarded
    /// - `SignupError::Repository` on store failures. If the admin user cannot
    ///   be created, the organization is removed again and the pending signup
    ///   is kept so the link can be retried.
    #[instrument(skip_all, fields(signup_id = %id))]
    pub async fn confirm(&self, id: &SignupId) -> Result<Provisioned, SignupError> {
        let signup = self
            .signups
            .get_by_id(id)
            .await?
            .ok_or(SignupError::NotFound)?;

        if !self.is_domain_available(&signup.domain).await? {
            self.invalidate(&signup).await;
            return Err(SignupError::DomainTaken);
        }

        let organization = match self
            .organizations
            .create_with_domain(&NewOrganization::from(&signup), &signup.domain)
            .await
        {
            Ok(organization) => organization,
            Err(RepositoryError::Conflict(_)) => {
                self.invalidate(&signup).await;
                return Err(SignupError::DomainTaken);
            }
            Err(e) => return Err(e.into()),
        };

        let new_admin = NewUser {
            email: signup.domain.admin_username(),
            password_hash: signup.password_hash.clone(),
            organization_id: organization.id,
            org_admin: true,
            super_admin: false,
        };

        let admin = match self.users.create(&new_admin).await {
            Ok(admin) => admin,
            Err(e) => {
                tracing::error!(
                    organization_id = %organization.id,
                    error = %e,
                    "Failed to create admin user, rolling back organization"
                );
                if let Err(rollback_err) = self.organizations.delete(organization.id).await {
                    tracing::error!(
                        organization_id = %organization.id,
                        error = %rollback_err,
                        "Failed to roll back organization"
                    );
                }
                return Err(e.into());
            }
        };

        if let Err(e) = self.send_confirm_mail(&signup, &admin).await {
            tracing::warn!(
                organization_id = %organization.id,
                error = %e,
                "Failed to send confirmation email"
            );
        }

        if let Err(e) = self.signups.delete(&signup.id).await {
            tracing::error!(error = %e, "Failed to delete confirmed signup");
        }

        tracing::info!(
            organization_id = %organization.id,
            domain = %signup.domain,
            "Signup confirmed, tenant provisioned"
        );

        Ok(Provisioned {
            organization,
            admin,
        })
    }

    /// Drop a signup whose domain was claimed by someone else.
    async fn invalidate(&self, signup: &Signup) {
        tracing::info!(
            domain = %signup.domain,
            "Domain taken before confirmation, discarding signup"
        );
        if let Err(e) = self.signups.delete(&signup.id).await {
            tracing::error!(error = %e, "Failed to discard conflicting signup");
        }
    }

    async fn send_opt_in_mail(&self, signup: &Signup) -> Result<(), SignupError> {
        let mail = OutgoingMail {
            to: signup.email.clone(),
            from: self.settings.sender_address.clone(),
            locale: Locale::select(signup.language.as_str()),
            content: MailContent::Signup {
                recipient_name: signup.recipient_name(),
                recipient_email: signup.email.to_string(),
                confirm_id: signup.id.as_str().to_string(),
                confirm_link: self.settings.confirm_link(signup.id.as_str()),
            },
        };
        self.mailer.send(&mail).await?;
        Ok(())
    }

    async fn send_confirm_mail(&self, signup: &Signup, admin: &User) -> Result<(), SignupError> {
        let mail = OutgoingMail {
            to: signup.email.clone(),
            from: self.settings.sender_address.clone(),
            locale: Locale::select(signup.language.as_str()),
            content: MailContent::Confirm {
                recipient_name: signup.recipient_name(),
                recipient_email: signup.email.to_string(),
                username: admin.email.clone(),
            },
        };
        self.mailer.send(&mail).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_signup_id_format() {
        let id = generate_signup_id();
        assert_eq!(id.as_str().len(), 43);
        assert!(
            id.as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_eq!(SignupId::parse(id.as_str()), Ok(id));
    }

    #[test]
    fn test_generate_signup_id_unique() {
        let a = generate_signup_id();
        let b = generate_signup_id();
        assert_ne!(a, b);
    }
}
