//! Restock CLI - Database migrations and account tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! restock-cli migrate
//!
//! # Create an account
//! restock-cli account create -u robin -p 'correct horse'
//!
//! # Print an account's items, most recent purchase first
//! restock-cli account items -u robin
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `account create` - Create an account without logging in
//! - `account items` - Dump an account's items as JSON

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "restock-cli")]
#[command(author, version, about = "Restock CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create a new account
    Create {
        /// Account username
        #[arg(short, long)]
        username: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Print an account's items as JSON
    Items {
        /// Account username
        #[arg(short, long)]
        username: String,
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
        Commands::Account { action } => match action {
            AccountAction::Create { username, password } => {
                commands::account::create(&username, &password).await?;
            }
            AccountAction::Items { username } => {
                commands::account::items(&username).await?;
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
    fn test_parses_account_create() {
        let cli = Cli::try_parse_from([
            "restock-cli",
            "account",
            "create",
            "-u",
            "robin",
            "-p",
            "pw",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Account {
                action: AccountAction::Create { .. }
            })
        ));
    }
}
