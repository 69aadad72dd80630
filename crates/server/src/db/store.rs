//! Store traits the signup flow depends on.
//!
//! The service only talks to these traits; `PostgreSQL` implementations live in
//! the sibling modules and tests substitute in-memory ones.

use async_trait::async_trait;

use signup_core::{Domain, Email, OrganizationId, SignupId};

use super::RepositoryError;
use crate::models::{NewOrganization, NewSignup, NewUser, Organization, Signup, User};
use crate::services::password::{self, PasswordHashError};

/// Pending signups.
#[async_trait]
pub trait SignupStore: Send + Sync {
    /// Persist a new pending signup.
    async fn create(&self, signup: NewSignup) -> Result<Signup, RepositoryError>;

    /// Look up a pending signup by its confirmation token.
    async fn get_by_id(&self, id: &SignupId) -> Result<Option<Signup>, RepositoryError>;

    /// Look up a pending signup by applicant email.
    async fn get_by_email(&self, email: &Email) -> Result<Option<Signup>, RepositoryError>;

    /// Delete a pending signup. Returns `false` if it did not exist.
    async fn delete(&self, id: &SignupId) -> Result<bool, RepositoryError>;
}

/// Organizations and their domain bindings.
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    /// Create an organization together with its primary domain binding.
    ///
    /// Both rows are written or neither is. A domain that is already bound
    /// yields `RepositoryError::Conflict`.
    async fn create_with_domain(
        &self,
        organization: &NewOrganization,
        primary_domain: &Domain,
    ) -> Result<Organization, RepositoryError>;

    /// Delete an organization and everything bound to it.
    async fn delete(&self, id: OrganizationId) -> Result<bool, RepositoryError>;

    /// Find an organization by contact email.
    async fn get_by_email(&self, email: &Email) -> Result<Option<Organization>, RepositoryError>;

    /// Find the organization a domain is bound to.
    async fn get_by_domain(&self, domain: &Domain)
    -> Result<Option<Organization>, RepositoryError>;
}

/// Tenant users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Hash a plaintext password the way stored users expect it.
    fn hash_password(&self, plaintext: &str) -> Result<String, PasswordHashError> {
        password::hash_password(plaintext)
    }

    /// Create a user. A taken login name yields `RepositoryError::Conflict`.
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError>;
}
