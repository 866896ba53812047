//! Unitec Portal CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run portal database migrations
//! portal-cli migrate
//!
//! # Create an approved admin account
//! portal-cli admin create -e ops@unitec.ac.nz -f Ops -l Team -r super_admin -p 'long passphrase'
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create operator accounts

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "portal-cli")]
#[command(author, version, about = "Unitec portal CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new approved account
    Create {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// First name
        #[arg(short, long)]
        first_name: String,

        /// Last name
        #[arg(short, long)]
        last_name: String,

        /// Role (`student`, `staff`, `admin`, `super_admin`)
        #[arg(short, long, default_value = "admin")]
        role: String,

        /// Initial password
        #[arg(short, long)]
        password: String,
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
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                first_name,
                last_name,
                role,
                password,
            } => {
                commands::admin::create_user(&commands::admin::CreateArgs {
                    email: &email,
                    first_name: &first_name,
                    last_name: &last_name,
                    role: &role,
                    password: &password,
                })
                .await?;
            }
        },
    }
    Ok(())
}
