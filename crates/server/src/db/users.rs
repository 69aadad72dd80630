//! Tenant user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use signup_core::{OrganizationId, UserId};

use super::{RepositoryError, UserStore, map_unique_violation};
use crate::models::{NewUser, User};

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    organization_id: OrganizationId,
    org_admin: bool,
    super_admin: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            organization_id: row.organization_id,
            org_admin: row.org_admin,
            super_admin: row.super_admin,
            created_at: row.created_at,
        }
    }
}

/// `PostgreSQL`-backed [`UserStore`].
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO app_user (email, password_hash, organization_id, org_admin, super_admin)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, organization_id, org_admin, super_admin, created_at
            ",
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.organization_id)
        .bind(user.org_admin)
        .bind(user.super_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "user"))?;

        Ok(row.into())
    }
}
