//! Pending signup repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use signup_core::{CountryCode, Domain, Email, LanguageCode, SignupId};

use super::{RepositoryError, SignupStore, map_unique_violation};
use crate::models::{NewSignup, Signup};

const SIGNUP_COLUMNS: &str = "id, created_at, email, password_hash, firstname, lastname, \
                              organization, country, language, domain";

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct SignupRow {
    id: String,
    created_at: DateTime<Utc>,
    email: String,
    password_hash: String,
    firstname: String,
    lastname: String,
    organization: String,
    country: String,
    language: String,
    domain: String,
}

impl TryFrom<SignupRow> for Signup {
    type Error = RepositoryError;

    fn try_from(row: SignupRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, e: &dyn std::fmt::Display| {
            RepositoryError::DataCorruption(format!("invalid {field} in signup row: {e}"))
        };

        Ok(Self {
            id: SignupId::parse(&row.id).map_err(|e| corrupt("id", &e))?,
            created_at: row.created_at,
            email: Email::parse(&row.email).map_err(|e| corrupt("email", &e))?,
            password_hash: row.password_hash,
            firstname: row.firstname,
            lastname: row.lastname,
            organization: row.organization,
            country: CountryCode::parse(&row.country).map_err(|e| corrupt("country", &e))?,
            language: LanguageCode::parse(&row.language).map_err(|e| corrupt("language", &e))?,
            domain: Domain::from_stored(&row.domain).map_err(|e| corrupt("domain", &e))?,
        })
    }
}

/// `PostgreSQL`-backed [`SignupStore`].
#[derive(Clone)]
pub struct PgSignupStore {
    pool: PgPool,
}

impl PgSignupStore {
    /// Create a new signup repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all pending signups, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_pending(&self) -> Result<Vec<Signup>, RepositoryError> {
        let rows = sqlx::query_as::<_, SignupRow>(&format!(
            "SELECT {SIGNUP_COLUMNS} FROM signup ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Delete pending signups created before `cutoff` (cleanup).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM signup WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SignupStore for PgSignupStore {
    async fn create(&self, signup: NewSignup) -> Result<Signup, RepositoryError> {
        let row = sqlx::query_as::<_, SignupRow>(&format!(
            r"
            INSERT INTO signup (id, created_at, email, password_hash, firstname, lastname,
                                organization, country, language, domain)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {SIGNUP_COLUMNS}
            "
        ))
        .bind(signup.id.as_str())
        .bind(signup.created_at)
        .bind(signup.email.as_str())
        .bind(&signup.password_hash)
        .bind(&signup.firstname)
        .bind(&signup.lastname)
        .bind(&signup.organization)
        .bind(signup.country.as_str())
        .bind(signup.language.as_str())
        .bind(signup.domain.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "signup"))?;

        row.try_into()
    }

    async fn get_by_id(&self, id: &SignupId) -> Result<Option<Signup>, RepositoryError> {
        let row = sqlx::query_as::<_, SignupRow>(&format!(
            "SELECT {SIGNUP_COLUMNS} FROM signup WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<Signup>, RepositoryError> {
        let row = sqlx::query_as::<_, SignupRow>(&format!(
            "SELECT {SIGNUP_COLUMNS} FROM signup WHERE email = $1 ORDER BY created_at ASC LIMIT 1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, id: &SignupId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM signup WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
