//! Signup Core - Shared domain types for the tenant signup service.
//!
//! This crate provides the types used by the signup components:
//! - `server` - HTTP service that accepts and confirms signups
//! - `cli` - Command-line tools for migrations and pending-signup maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and validation rules - no I/O, no
//! database access, no SMTP. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, domains, regions and locales

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
