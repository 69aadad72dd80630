//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::SignupSettings;
use crate::services::{Collaborators, SignupService};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Stores and mailer are injected so the same
/// router runs against `PostgreSQL` and SMTP in production and against
/// in-memory doubles in tests.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    signup: SignupService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `collaborators` - Stores and mailer
    /// * `settings` - Signup flow settings
    #[must_use]
    pub fn new(collaborators: Collaborators, settings: SignupSettings) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                signup: SignupService::new(collaborators, settings),
            }),
        }
    }

    /// Get a reference to the signup workflow.
    #[must_use]
    pub fn signup(&self) -> &SignupService {
        &self.inner.signup
    }

    /// Get a reference to the signup settings.
    #[must_use]
    pub fn settings(&self) -> &SignupSettings {
        self.inner.signup.settings()
    }
}
