//! Store rating CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! sr-cli migrate
//!
//! # Create a user (password read from SR_CLI_PASSWORD)
//! sr-cli user create -e admin@example.com -n "Platform Administrator" -a "1 Main St" -r ADMIN
//!
//! # Check connectivity and row counts
//! sr-cli db check
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sr-cli")]
#[command(author, version, about = "Store rating platform CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Database diagnostics
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name (20-60 characters)
        #[arg(short, long)]
        name: String,

        /// Postal address
        #[arg(short, long)]
        address: String,

        /// Role (`ADMIN`, `USER`, `STORE_OWNER`)
        #[arg(short, long, default_value = "ADMIN")]
        role: String,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check connectivity and print row counts
    Check,
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
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                address,
                role,
            } => {
                commands::user::create(&email, &name, &address, &role).await?;
            }
        },
        Commands::Db { action } => match action {
            DbAction::Check => commands::db::check().await?,
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
}
