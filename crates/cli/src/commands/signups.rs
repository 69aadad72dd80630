//! Pending signup maintenance.
//!
//! # Usage
//!
//! ```bash
//! # List pending signups
//! signup-cli signups list
//!
//! # Delete pending signups older than 30 days
//! signup-cli signups purge --older-than-days 30
//! ```
//!
//! Pending signups are never expired by the server; abandoned ones stay until
//! purged here.

use chrono::{Duration, Utc};
use signup_server::db::PgSignupStore;

use super::{CommandError, connect};

/// Default retention for unconfirmed signups.
pub const DEFAULT_RETENTION_DAYS: u32 = 14;

/// Log every pending signup, oldest first.
///
/// Only a prefix of each confirmation id is shown.
pub async fn list() -> Result<usize, CommandError> {
    let store = PgSignupStore::new(connect().await?);
    let signups = store.list_pending().await?;

    for signup in &signups {
        tracing::info!(
            "{}  {}  {}  {}",
            signup.id.redacted(),
            signup.created_at.format("%Y-%m-%d %H:%M"),
            signup.email,
            signup.domain
        );
    }
    tracing::info!("{} pending signup(s)", signups.len());

    Ok(signups.len())
}

/// Delete pending signups created more than `older_than_days` days ago.
pub async fn purge(older_than_days: u32) -> Result<u64, CommandError> {
    if older_than_days == 0 {
        return Err(CommandError::InvalidArgument(
            "--older-than-days must be at least 1".to_string(),
        ));
    }

    let cutoff = Utc::now() - Duration::days(i64::from(older_than_days));
    let store = PgSignupStore::new(connect().await?);

    tracing::info!("Purging pending signups created before {cutoff}");
    let deleted = store.delete_created_before(cutoff).await?;

    tracing::info!("Purged {deleted} pending signup(s)");
    Ok(deleted)
}
