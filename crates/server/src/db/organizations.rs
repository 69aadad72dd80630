//! Organization repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use signup_core::{CountryCode, Domain, Email, LanguageCode, OrganizationId};

use super::{OrganizationStore, RepositoryError, map_unique_violation};
use crate::models::{NewOrganization, Organization};

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct OrganizationRow {
    id: OrganizationId,
    name: String,
    contact_firstname: String,
    contact_lastname: String,
    contact_email: String,
    language: String,
    country: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrganizationRow> for Organization {
    type Error = RepositoryError;

    fn try_from(row: OrganizationRow) -> Result<Self, Self::Error> {
        let contact_email = Email::parse(&row.contact_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in organization row: {e}"))
        })?;
        let language = LanguageCode::parse(&row.language).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid language in organization row: {e}"))
        })?;
        let country = CountryCode::parse(&row.country).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid country in organization row: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            contact_firstname: row.contact_firstname,
            contact_lastname: row.contact_lastname,
            contact_email,
            language,
            country,
            created_at: row.created_at,
        })
    }
}

/// `PostgreSQL`-backed [`OrganizationStore`].
#[derive(Clone)]
pub struct PgOrganizationStore {
    pool: PgPool,
}

impl PgOrganizationStore {
    /// Create a new organization repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizationStore for PgOrganizationStore {
    async fn create_with_domain(
        &self,
        organization: &NewOrganization,
        primary_domain: &Domain,
    ) -> Result<Organization, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrganizationRow>(
            r"
            INSERT INTO organization (name, contact_firstname, contact_lastname,
                                      contact_email, language, country)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, contact_firstname, contact_lastname, contact_email,
                      language, country, created_at
            ",
        )
        .bind(&organization.name)
        .bind(&organization.contact_firstname)
        .bind(&organization.contact_lastname)
        .bind(organization.contact_email.as_str())
        .bind(organization.language.as_str())
        .bind(organization.country.as_str())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO organization_domain (domain, organization_id, active, is_primary)
            VALUES ($1, $2, TRUE, TRUE)
            ",
        )
        .bind(primary_domain.as_str())
        .bind(row.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "domain"))?;

        tx.commit().await?;

        row.try_into()
    }

    async fn delete(&self, id: OrganizationId) -> Result<bool, RepositoryError> {
        // Domain bindings and users cascade.
        let result = sqlx::query("DELETE FROM organization WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<Organization>, RepositoryError> {
        let row = sqlx::query_as::<_, OrganizationRow>(
            r"
            SELECT id, name, contact_firstname, contact_lastname, contact_email,
                   language, country, created_at
            FROM organization
            WHERE contact_email = $1
            LIMIT 1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn get_by_domain(
        &self,
        domain: &Domain,
    ) -> Result<Option<Organization>, RepositoryError> {
        let row = sqlx::query_as::<_, OrganizationRow>(
            r"
            SELECT o.id, o.name, o.contact_firstname, o.contact_lastname, o.contact_email,
                   o.language, o.country, o.created_at
            FROM organization o
            JOIN organization_domain d ON d.organization_id = o.id
            WHERE d.domain = $1
            ",
        )
        .bind(domain.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}
