//! Signup CLI - Database migrations and pending signup maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! signup-cli migrate
//!
//! # List pending signups
//! signup-cli signups list
//!
//! # Delete pending signups older than 14 days
//! signup-cli signups purge --older-than-days 14
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `signups list` - List pending signups
//! - `signups purge` - Delete stale pending signups

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "signup-cli")]
#[command(author, version, about = "Signup service CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage pending signups
    Signups {
        #[command(subcommand)]
        action: SignupsAction,
    },
}

#[derive(Subcommand)]
enum SignupsAction {
    /// List pending signups
    List,
    /// Delete pending signups that were never confirmed
    Purge {
        /// Delete signups created more than this many days ago
        #[arg(long, default_value_t = commands::signups::DEFAULT_RETENTION_DAYS)]
        older_than_days: u32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Signups { action } => match action {
            SignupsAction::List => {
                commands::signups::list().await?;
            }
            SignupsAction::Purge { older_than_days } => {
                commands::signups::purge(older_than_days).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_purge_defaults_to_retention_window() {
        let cli = Cli::try_parse_from(["signup-cli", "signups", "purge"]).unwrap_or_else(|e| {
            panic!("parse failed: {e}");
        });
        match cli.command {
            Commands::Signups {
                action: SignupsAction::Purge { older_than_days },
            } => assert_eq!(older_than_days, commands::signups::DEFAULT_RETENTION_DAYS),
            _ => panic!("expected signups purge"),
        }
    }

    #[test]
    fn test_purge_accepts_custom_window() {
        let cli = Cli::try_parse_from(["signup-cli", "signups", "purge", "--older-than-days", "30"])
            .unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert!(matches!(
            cli.command,
            Commands::Signups {
                action: SignupsAction::Purge { older_than_days: 30 }
            }
        ));
    }
}
