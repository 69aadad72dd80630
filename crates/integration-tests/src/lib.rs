//! Integration test harness for the signup service.
//!
//! Drives the real axum router with `tower::ServiceExt::oneshot` against an
//! in-memory store and a recording mailer, so the whole signup and
//! confirmation flow runs without `PostgreSQL` or SMTP.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p signup-integration-tests
//! ```
//!
//! Both doubles support failure injection to exercise the error paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use chrono::Utc;
use tower::ServiceExt;

use signup_core::{Domain, Email, OrganizationId, SignupId, UserId};
use signup_server::config::SignupSettings;
use signup_server::db::{OrganizationStore, RepositoryError, SignupStore, UserStore};
use signup_server::models::{NewOrganization, NewSignup, NewUser, Organization, Signup, User};
use signup_server::services::Collaborators;
use signup_server::services::email::{EmailError, EmailTemplate, MailContent, Mailer, OutgoingMail};
use signup_server::state::AppState;

// =============================================================================
// In-memory store
// =============================================================================

/// A domain binding as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainBinding {
    pub domain: Domain,
    pub organization_id: OrganizationId,
    pub is_primary: bool,
}

/// A user as stored, including the password hash.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

#[derive(Default)]
struct Tables {
    signups: Vec<Signup>,
    organizations: Vec<Organization>,
    domains: Vec<DomainBinding>,
    users: Vec<StoredUser>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn insert_organization(&mut self, new: &NewOrganization, domain: &Domain) -> Organization {
        let organization = Organization {
            id: OrganizationId::new(self.next_id()),
            name: new.name.clone(),
            contact_firstname: new.contact_firstname.clone(),
            contact_lastname: new.contact_lastname.clone(),
            contact_email: new.contact_email.clone(),
            language: new.language.clone(),
            country: new.country.clone(),
            created_at: Utc::now(),
        };
        self.domains.push(DomainBinding {
            domain: domain.clone(),
            organization_id: organization.id,
            is_primary: true,
        });
        self.organizations.push(organization.clone());
        organization
    }
}

/// In-memory implementation of all three stores.
///
/// Wrap it in an `Arc` and hand the same instance out as signup, organization
/// and user store so tests can inspect every table in one place.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    fail_lookups: AtomicBool,
    fail_signup_delete: AtomicBool,
    fail_next_user_create: AtomicBool,
    claim_before_next_create: Mutex<Option<NewOrganization>>,
}

fn injected() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolTimedOut)
}

impl InMemoryStore {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_lookup(&self) -> Result<(), RepositoryError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(injected());
        }
        Ok(())
    }

    /// Make every lookup (`get_by_*`) fail with a database error.
    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    /// Make signup deletion fail with a database error.
    pub fn fail_signup_delete(&self, fail: bool) {
        self.fail_signup_delete.store(fail, Ordering::SeqCst);
    }

    /// Make the next user creation fail with a database error.
    pub fn fail_next_user_create(&self) {
        self.fail_next_user_create.store(true, Ordering::SeqCst);
    }

    /// Let another tenant claim the requested domain just before the next
    /// `create_with_domain` writes, as a concurrent confirmation would.
    pub fn claim_domain_before_next_create(&self, competitor: NewOrganization) {
        *self
            .claim_before_next_create
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(competitor);
    }

    /// Seed an existing organization bound to `domain`.
    pub fn seed_organization(&self, new: &NewOrganization, domain: &Domain) -> Organization {
        self.tables().insert_organization(new, domain)
    }

    /// All pending signups.
    pub fn signups(&self) -> Vec<Signup> {
        self.tables().signups.clone()
    }

    /// All organizations.
    pub fn organizations(&self) -> Vec<Organization> {
        self.tables().organizations.clone()
    }

    /// All domain bindings.
    pub fn domain_bindings(&self) -> Vec<DomainBinding> {
        self.tables().domains.clone()
    }

    /// All users.
    pub fn users(&self) -> Vec<StoredUser> {
        self.tables().users.clone()
    }
}

#[async_trait]
impl SignupStore for InMemoryStore {
    async fn create(&self, signup: NewSignup) -> Result<Signup, RepositoryError> {
        let mut tables = self.tables();
        if tables.signups.iter().any(|s| s.id == signup.id) {
            return Err(RepositoryError::Conflict("signup already exists".to_string()));
        }
        let signup = Signup::from(signup);
        tables.signups.push(signup.clone());
        Ok(signup)
    }

    async fn get_by_id(&self, id: &SignupId) -> Result<Option<Signup>, RepositoryError> {
        self.check_lookup()?;
        Ok(self.tables().signups.iter().find(|s| &s.id == id).cloned())
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<Signup>, RepositoryError> {
        self.check_lookup()?;
        Ok(self
            .tables()
            .signups
            .iter()
            .find(|s| &s.email == email)
            .cloned())
    }

    async fn delete(&self, id: &SignupId) -> Result<bool, RepositoryError> {
        if self.fail_signup_delete.load(Ordering::SeqCst) {
            return Err(injected());
        }
        let mut tables = self.tables();
        let before = tables.signups.len();
        tables.signups.retain(|s| &s.id != id);
        Ok(tables.signups.len() < before)
    }
}

#[async_trait]
impl OrganizationStore for InMemoryStore {
    async fn create_with_domain(
        &self,
        organization: &NewOrganization,
        primary_domain: &Domain,
    ) -> Result<Organization, RepositoryError> {
        let competitor = self
            .claim_before_next_create
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let mut tables = self.tables();
        if let Some(competitor) = competitor {
            tables.insert_organization(&competitor, primary_domain);
        }
        if tables.domains.iter().any(|d| &d.domain == primary_domain) {
            return Err(RepositoryError::Conflict("domain already exists".to_string()));
        }
        Ok(tables.insert_organization(organization, primary_domain))
    }

    async fn delete(&self, id: OrganizationId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables();
        let before = tables.organizations.len();
        tables.organizations.retain(|o| o.id != id);
        tables.domains.retain(|d| d.organization_id != id);
        tables.users.retain(|u| u.user.organization_id != id);
        Ok(tables.organizations.len() < before)
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<Organization>, RepositoryError> {
        self.check_lookup()?;
        Ok(self
            .tables()
            .organizations
            .iter()
            .find(|o| &o.contact_email == email)
            .cloned())
    }

    async fn get_by_domain(
        &self,
        domain: &Domain,
    ) -> Result<Option<Organization>, RepositoryError> {
        self.check_lookup()?;
        let tables = self.tables();
        let organization = tables
            .domains
            .iter()
            .find(|d| &d.domain == domain)
            .and_then(|d| tables.organizations.iter().find(|o| o.id == d.organization_id))
            .cloned();
        Ok(organization)
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        if self.fail_next_user_create.swap(false, Ordering::SeqCst) {
            return Err(injected());
        }
        let mut tables = self.tables();
        if tables.users.iter().any(|u| u.user.email == user.email) {
            return Err(RepositoryError::Conflict("user already exists".to_string()));
        }
        let created = User {
            id: UserId::new(tables.next_id()),
            email: user.email.clone(),
            organization_id: user.organization_id,
            org_admin: user.org_admin,
            super_admin: user.super_admin,
            created_at: Utc::now(),
        };
        tables.users.push(StoredUser {
            user: created.clone(),
            password_hash: user.password_hash.clone(),
        });
        Ok(created)
    }
}

// =============================================================================
// Recording mailer
// =============================================================================

/// Mailer that records instead of sending.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    failing: Mutex<Vec<EmailTemplate>>,
}

impl RecordingMailer {
    /// Make every mail of `template` fail.
    pub fn fail(&self, template: EmailTemplate) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(template);
    }

    /// Mails successfully handed over so far.
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Confirmation token of the most recent opt-in mail.
    pub fn last_confirm_id(&self) -> Option<String> {
        self.sent().into_iter().rev().find_map(|mail| match mail.content {
            MailContent::Signup { confirm_id, .. } => Some(confirm_id),
            MailContent::Confirm { .. } => None,
        })
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), EmailError> {
        let template = mail.content.template();
        if self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&template)
        {
            return Err(EmailError::InvalidAddress(format!(
                "injected failure for {template:?}"
            )));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(mail.clone());
        Ok(())
    }
}

// =============================================================================
// Test application
// =============================================================================

/// The router wired to in-memory doubles.
pub struct TestApp {
    pub store: Arc<InMemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    router: Router,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Build an app with default settings (`/signup` prefix).
    pub fn new() -> Self {
        Self::with_settings(SignupSettings::default())
    }

    /// Build an app with custom settings.
    pub fn with_settings(settings: SignupSettings) -> Self {
        let store = Arc::new(InMemoryStore::default());
        let mailer = Arc::new(RecordingMailer::default());

        let collaborators = Collaborators {
            signups: store.clone(),
            organizations: store.clone(),
            users: store.clone(),
            mailer: mailer.clone(),
        };
        let router = signup_server::app(AppState::new(collaborators, settings));

        Self {
            store,
            mailer,
            router,
        }
    }

    /// Send a request and return the raw response.
    ///
    /// # Panics
    ///
    /// Panics if the router fails, which it cannot.
    pub async fn response(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Send a request and collect status and body.
    ///
    /// # Panics
    ///
    /// Panics if the body stream fails.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self.response(request).await;
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body collects");
        (status, body)
    }

    /// `POST` a JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> (StatusCode, Bytes) {
        let request = Request::post(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request");
        self.send(request).await
    }

    /// `POST` without a body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn post_empty(&self, path: &str) -> (StatusCode, Bytes) {
        let request = Request::post(path)
            .body(Body::empty())
            .expect("valid request");
        self.send(request).await
    }

    /// Submit a signup to `/signup`.
    pub async fn signup(&self, body: &serde_json::Value) -> (StatusCode, Bytes) {
        self.post_json("/signup", body).await
    }

    /// Confirm a signup via `/signup/confirm/{id}`.
    pub async fn confirm(&self, id: &str) -> (StatusCode, Bytes) {
        self.post_empty(&format!("/signup/confirm/{id}")).await
    }
}

/// A request body that passes every check.
pub fn valid_signup() -> serde_json::Value {
    serde_json::json!({
        "firstname": "",
        "lastname": "",
        "email": "a@b.com",
        "organization": "Acme",
        "domain": "acme",
        "contactFirstname": "A",
        "contactLastname": "B",
        "password": "longpass1",
        "country": "DE",
        "language": "de",
        "acceptTerms": true
    })
}

/// [`valid_signup`] with one field replaced.
pub fn signup_with(field: &str, value: serde_json::Value) -> serde_json::Value {
    let mut body = valid_signup();
    body[field] = value;
    body
}
