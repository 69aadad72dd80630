//! CLI subcommand implementations.

pub mod migrate;
pub mod signups;

use secrecy::SecretString;
use signup_server::db;
use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by commands that talk to the signup database.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(#[from] db::RepositoryError),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Connect to the signup database.
///
/// Reads `SIGNUP_DATABASE_URL`, falling back to `DATABASE_URL`.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("SIGNUP_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("SIGNUP_DATABASE_URL"))?;

    tracing::info!("Connecting to signup database...");
    let pool = db::create_pool(&SecretString::from(database_url)).await?;
    Ok(pool)
}
