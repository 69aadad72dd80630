//! Business logic services.
//!
//! - [`signup`] - Signup submission and double opt-in confirmation
//! - [`email`] - Notification rendering and SMTP delivery
//! - [`password`] - Argon2 password hashing

pub mod email;
pub mod password;
pub mod signup;

pub use email::{EmailError, Mailer, SmtpMailer};
pub use signup::{Collaborators, SignupError, SignupOutcome, SignupService};
