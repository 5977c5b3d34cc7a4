//! Userbase CLI - Inspect and manage the user data file.
//!
//! # Usage
//!
//! ```bash
//! # List the first page of users as JSON
//! userbase-cli users list --limit 20
//!
//! # Show one user
//! userbase-cli users show 3fa85f64-5717-4562-b3fc-2c963f66afa6
//!
//! # Create a user
//! userbase-cli users create -n "Ada Lovelace" -e ada@example.com
//!
//! # Delete a user
//! userbase-cli users delete 3fa85f64-5717-4562-b3fc-2c963f66afa6
//!
//! # Seed users from YAML, replacing existing ones
//! userbase-cli seed fixtures/users.yaml --clear
//! ```
//!
//! Every command works on the file named by `--data-file` or
//! `USERBASE_DATA_FILE`, the same file the server uses.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use userbase_server::config::DEFAULT_DATA_FILE;

mod commands;

#[derive(Parser)]
#[command(name = "userbase-cli")]
#[command(author, version, about = "Userbase CLI tools")]
struct Cli {
    /// JSON file holding the user table
    #[arg(long, global = true, env = "USERBASE_DATA_FILE", default_value = DEFAULT_DATA_FILE)]
    data_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Seed users from a YAML file
    Seed {
        /// Path to a YAML list of `{name, email}` entries
        file: PathBuf,

        /// Remove existing users first
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Print one page of users as JSON
    List {
        /// 1-based page number
        #[arg(short, long, default_value_t = 1)]
        page: i64,

        /// Users per page
        #[arg(short, long, default_value_t = 10)]
        limit: i64,
    },
    /// Print one user as JSON
    Show {
        /// User id
        id: String,
    },
    /// Create a new user
    Create {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,
    },
    /// Delete a user
    Delete {
        /// User id
        id: String,
    },
}

#[tokio::main]
async fn main() {
    // Load .env before clap reads USERBASE_DATA_FILE
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "userbase_cli=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let store = commands::open_store(&cli.data_file).await?;
    match cli.command {
        Commands::Users { action } => match action {
            UserAction::List { page, limit } => commands::users::list(&store, page, limit).await?,
            UserAction::Show { id } => commands::users::show(&store, &id).await?,
            UserAction::Create { name, email } => {
                commands::users::create(&store, &name, &email).await?;
            }
            UserAction::Delete { id } => commands::users::delete(&store, &id).await?,
        },
        Commands::Seed { file, clear } => commands::seed::users(&store, &file, clear).await?,
    }
    Ok(())
}
