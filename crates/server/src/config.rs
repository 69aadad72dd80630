//! Signup service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SIGNUP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `SMTP_HOST` - SMTP relay hostname
//! - `SMTP_USERNAME` - SMTP authentication username
//! - `SMTP_PASSWORD` - SMTP authentication password
//!
//! ## Optional
//! - `SIGNUP_HOST` - Bind address (default: 127.0.0.1)
//! - `SIGNUP_PORT` - Listen port (default: 8080)
//! - `SIGNUP_ROUTE_PREFIX` - Path the signup routes are nested under (default: /signup)
//! - `SIGNUP_DOMAIN_SUFFIX` - Suffix appended to tenant labels (default: .on.seatsurfing.de)
//! - `SIGNUP_SENDER_ADDRESS` - From address of signup emails (default: info@seatsurfing.de)
//! - `SIGNUP_CONFIRM_URL` - Base URL of the confirmation page; the signup id is appended
//! - `SMTP_PORT` - SMTP port (default: 587)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use signup_core::Email;

/// Default suffix appended to a tenant's domain label.
pub const DEFAULT_DOMAIN_SUFFIX: &str = ".on.seatsurfing.de";

/// Default From address for signup emails.
pub const DEFAULT_SENDER_ADDRESS: &str = "info@seatsurfing.de";

const DEFAULT_CONFIRM_URL: &str = "https://app.seatsurfing.de/signup/confirm/";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Signup service configuration.
#[derive(Debug, Clone)]
pub struct SignupConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Signup flow settings
    pub signup: SignupSettings,
    /// SMTP configuration
    pub email: EmailConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
}

/// Settings of the signup flow itself.
#[derive(Debug, Clone)]
pub struct SignupSettings {
    /// Path the signup router is nested under
    pub route_prefix: String,
    /// Suffix appended to the lower-cased domain label, starting with a dot
    pub domain_suffix: String,
    /// From address of double opt-in and confirmation emails
    pub sender_address: Email,
    /// Base URL of the confirmation page
    pub confirm_url: Url,
}

impl Default for SignupSettings {
    fn default() -> Self {
        Self {
            route_prefix: "/signup".to_owned(),
            domain_suffix: DEFAULT_DOMAIN_SUFFIX.to_owned(),
            #[allow(clippy::expect_used)] // compile-time constant
            sender_address: Email::parse(DEFAULT_SENDER_ADDRESS).expect("valid default sender"),
            #[allow(clippy::expect_used)] // compile-time constant
            confirm_url: Url::parse(DEFAULT_CONFIRM_URL).expect("valid default confirm url"),
        }
    }
}

/// SMTP configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP authentication username
    pub smtp_username: String,
    /// SMTP authentication password
    pub smtp_password: SecretString,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .finish()
    }
}

impl SignupConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SIGNUP_DATABASE_URL")?;
        let host = get_env_or_default("SIGNUP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SIGNUP_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SIGNUP_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SIGNUP_PORT".to_string(), e.to_string()))?;

        let signup = SignupSettings::from_env()?;
        let email = EmailConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            signup,
            email,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SignupSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let route_prefix = get_env_or_default("SIGNUP_ROUTE_PREFIX", "/signup");
        validate_route_prefix(&route_prefix)?;

        let domain_suffix =
            get_env_or_default("SIGNUP_DOMAIN_SUFFIX", DEFAULT_DOMAIN_SUFFIX).to_lowercase();
        validate_domain_suffix(&domain_suffix)?;

        let sender = get_env_or_default("SIGNUP_SENDER_ADDRESS", DEFAULT_SENDER_ADDRESS);
        let sender_address = Email::parse(&sender).map_err(|e| {
            ConfigError::InvalidEnvVar("SIGNUP_SENDER_ADDRESS".to_string(), e.to_string())
        })?;

        let confirm_url = Url::parse(&get_env_or_default("SIGNUP_CONFIRM_URL", DEFAULT_CONFIRM_URL))
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SIGNUP_CONFIRM_URL".to_string(), e.to_string())
            })?;

        Ok(Self {
            route_prefix,
            domain_suffix,
            sender_address,
            confirm_url,
        })
    }

    /// Build the link an applicant follows to confirm a signup.
    #[must_use]
    pub fn confirm_link(&self, token: &str) -> String {
        let base = self.confirm_url.as_str();
        if base.ends_with('/') {
            format!("{base}{token}")
        } else {
            format!("{base}/{token}")
        }
    }
}

impl EmailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// The password is issued by the mail provider and taken as is.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required =
            |key: &str| lookup(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()));

        let smtp_port = lookup("SMTP_PORT")
            .unwrap_or_else(|| "587".to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SMTP_PORT".to_string(), e.to_string()))?;

        Ok(Self {
            smtp_host: required("SMTP_HOST")?,
            smtp_port,
            smtp_username: required("SMTP_USERNAME")?,
            smtp_password: SecretString::from(required("SMTP_PASSWORD")?),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// The router prefix must be an absolute path without a trailing slash.
fn validate_route_prefix(prefix: &str) -> Result<(), ConfigError> {
    if !prefix.starts_with('/') || (prefix.len() > 1 && prefix.ends_with('/')) {
        return Err(ConfigError::InvalidEnvVar(
            "SIGNUP_ROUTE_PREFIX".to_string(),
            format!("must start with '/' and not end with '/': {prefix:?}"),
        ));
    }
    Ok(())
}

/// The suffix is glued to a label, so it must start with a dot.
fn validate_domain_suffix(suffix: &str) -> Result<(), ConfigError> {
    let valid = suffix.strip_prefix('.').is_some_and(|rest| {
        rest.split('.').all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
    });
    if !valid {
        return Err(ConfigError::InvalidEnvVar(
            "SIGNUP_DOMAIN_SUFFIX".to_string(),
            format!("must look like '.example.com': {suffix:?}"),
        ));
    }
    Ok(())
}
