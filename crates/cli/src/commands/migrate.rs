//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! signup-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `SIGNUP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/server/migrations/`:
//! ```text
//! migrations/
//! ├── 20260301000001_create_organizations.sql
//! ├── 20260301000002_create_users.sql
//! └── 20260301000003_create_signups.sql
//! ```

use super::{CommandError, connect};

/// Run the signup database migrations.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running signup migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Signup migrations complete!");
    Ok(())
}
