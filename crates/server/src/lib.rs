//! Self-service tenant signup service.
//!
//! Prospective customers submit a signup, receive a double opt-in mail and,
//! by following its link, get an organization, a subdomain and an admin user.
//! The crate is a library so the router can be driven in tests against
//! in-memory stores; the `signup-server` binary wires it to `PostgreSQL` and SMTP.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, body::Body, http::Request, middleware::from_fn};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Build the application router without HTTP layers.
///
/// Extra routes with their own state (like the readiness probe) can be added
/// before passing the result to [`with_http_layers`].
pub fn router(state: AppState) -> Router {
    let prefix = state.settings().route_prefix.clone();
    routes::routes(&prefix).with_state(state)
}

/// Add request tracing and request ids.
pub fn with_http_layers(router: Router) -> Router {
    router
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                path = %loggable_path(request.uri().path()),
                request_id = tracing::field::Empty,
            )
        }))
}

/// The complete application: routes plus HTTP layers.
pub fn app(state: AppState) -> Router {
    with_http_layers(router(state))
}

/// Strip the confirmation token from a path before it is logged.
fn loggable_path(path: &str) -> String {
    match path.find("/confirm/") {
        Some(idx) => format!("{}/confirm/…", path.get(..idx).unwrap_or_default()),
        None => path.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loggable_path_hides_token() {
        assert_eq!(
            loggable_path("/signup/confirm/secret-token"),
            "/signup/confirm/…"
        );
        assert_eq!(loggable_path("/confirm/secret-token"), "/confirm/…");
        assert_eq!(loggable_path("/signup"), "/signup");
        assert_eq!(loggable_path("/health"), "/health");
    }
}
