//! Domain models for the signup service.
//!
//! These types represent validated records; database row types live next to
//! their repositories and are converted into these.

pub mod organization;
pub mod signup;
pub mod user;

pub use organization::{NewOrganization, Organization};
pub use signup::{NewSignup, Signup};
pub use user::{NewUser, User};
