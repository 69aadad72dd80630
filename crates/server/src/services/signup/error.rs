use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::email::EmailError;
use crate::services::password::PasswordHashError;

/// Errors that can occur during signup or confirmation.
#[derive(Debug, Error)]
pub enum SignupError {
    /// The request body is structurally invalid.
    #[error("invalid signup request: {0}")]
    Validation(String),

    /// Country is not in the allow-list.
    #[error("unsupported country: {0}")]
    InvalidCountry(String),

    /// Language is not in the allow-list.
    #[error("unsupported language: {0}")]
    InvalidLanguage(String),

    /// The requested domain is bound to an organization.
    #[error("domain is not available")]
    DomainTaken,

    /// The email belongs to an organization or a pending signup.
    #[error("email is not available")]
    EmailTaken,

    /// No pending signup with this id.
    #[error("signup not found")]
    NotFound,

    /// Store failure.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Mail delivery failure.
    #[error("email error: {0}")]
    Email(#[from] EmailError),

    /// Password hashing failure.
    #[error(transparent)]
    PasswordHash(#[from] PasswordHashError),
}
