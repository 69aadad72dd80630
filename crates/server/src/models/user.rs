//! User domain types.

use chrono::{DateTime, Utc};

use signup_core::{OrganizationId, UserId};

/// A user account of a tenant.
///
/// The login name is an email-shaped string (`admin@<domain>`) that is not
/// necessarily a deliverable mailbox, so it is kept as a plain string.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub organization_id: OrganizationId,
    pub org_admin: bool,
    pub super_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Data needed to create a user.
///
/// Implements `Debug` manually to keep the password hash out of logs.
#[derive(Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub organization_id: OrganizationId,
    pub org_admin: bool,
    pub super_admin: bool,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("organization_id", &self.organization_id)
            .field("org_admin", &self.org_admin)
            .field("super_admin", &self.super_admin)
            .finish()
    }
}
