//! HTTP route handlers for the signup service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database, wired in main)
//!
//! # Signup (nested under the configured prefix, default /signup)
//! POST /                       - Submit a signup, sends the double opt-in mail
//!                                (also answers on the prefix with a trailing slash)
//! POST /confirm/{id}           - Confirm a signup, provisions the tenant
//! ```

pub mod signup;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the signup routes router.
pub fn signup_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(signup::signup))
        .route("/confirm/{id}", post(signup::confirm))
}

/// Create all routes, with the signup routes under `prefix`.
pub fn routes(prefix: &str) -> Router<AppState> {
    let router = Router::new().route("/health", get(health));

    // axum refuses to nest at the root
    if prefix.is_empty() || prefix == "/" {
        router.merge(signup_routes())
    } else {
        // a nested "/" only matches the bare prefix
        router
            .nest(prefix, signup_routes())
            .route(&format!("{prefix}/"), post(signup::signup))
    }
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}
