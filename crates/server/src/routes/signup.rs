//! Signup and confirmation handlers.
//!
//! Both endpoints answer with a bare status code: 204 on success, the
//! [`AppError`] status otherwise.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::instrument;

use signup_core::SignupId;

use crate::error::AppError;
use crate::services::SignupError;
use crate::services::signup::SignupRequest;
use crate::state::AppState;

/// Submit a signup (`POST /`).
///
/// A honeypot hit also answers 204 so bots cannot tell it apart from success.
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    state.signup().signup(&request).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Confirm a pending signup (`POST /confirm/{id}`).
#[instrument(skip_all)]
pub async fn confirm(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    // An id we could never have issued cannot match a pending signup.
    let id = SignupId::parse(&id).map_err(|_| SignupError::NotFound)?;

    state.signup().confirm(&id).await?;

    Ok(StatusCode::NO_CONTENT)
}
