//! Unified error handling with Sentry integration.
//!
//! Every failure maps to a status code with an empty body: clients of the
//! signup endpoints only act on the status. Server errors are captured to
//! Sentry before responding.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::SignupError;

/// Application-level error type for the signup service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Signup or confirmation failed.
    #[error(transparent)]
    Signup(#[from] SignupError),

    /// Bad request from client (unparseable body or path).
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_)
            | Self::Signup(
                SignupError::Validation(_)
                | SignupError::InvalidCountry(_)
                | SignupError::InvalidLanguage(_),
            ) => StatusCode::BAD_REQUEST,
            Self::Signup(SignupError::DomainTaken | SignupError::EmailTaken) => {
                StatusCode::CONFLICT
            }
            Self::Signup(SignupError::NotFound) => StatusCode::NOT_FOUND,
            Self::Signup(
                SignupError::Repository(_) | SignupError::Email(_) | SignupError::PasswordHash(_),
            ) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::info!(error = %self, status = %status, "Request rejected");
        }

        status.into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;
    use crate::db::RepositoryError;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(SignupError::Validation("test".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(SignupError::InvalidCountry("US".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(SignupError::InvalidLanguage("fr".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(SignupError::DomainTaken.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(SignupError::EmailTaken.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(SignupError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(
                SignupError::Repository(RepositoryError::DataCorruption("bad row".to_string()))
                    .into()
            ),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body_is_empty() {
        let error = RepositoryError::DataCorruption("bad row".to_string());
        let response = AppError::from(SignupError::Repository(error)).into_response();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }
}
