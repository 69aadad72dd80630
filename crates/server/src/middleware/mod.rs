//! HTTP middleware.
//!
//! - [`request_id`] - Per-request correlation id for logs, Sentry and responses

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
