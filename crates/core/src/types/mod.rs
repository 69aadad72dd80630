//! Core types for the signup service.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod domain;
pub mod email;
pub mod id;
pub mod locale;
pub mod region;
pub mod signup_id;

pub use domain::{Domain, DomainError, DomainLabel};
pub use email::{Email, EmailError};
pub use id::*;
pub use locale::Locale;
pub use region::{CountryCode, LanguageCode, RegionError};
pub use signup_id::{SignupId, SignupIdError};
