//! Ambre CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! ambre-cli migrate
//!
//! # Seed the catalogue and the default admin account
//! AMBRE_SEED_ADMIN_PASSWORD=... ambre-cli seed
//!
//! # Create an admin user (password read from an env var, never argv)
//! AMBRE_ADMIN_PASSWORD=... ambre-cli admin create \
//!     -u admin -e admin@example.com -n "Admin Name"
//!
//! # Rotate an admin password
//! AMBRE_ADMIN_PASSWORD=... ambre-cli admin set-password -e admin@example.com
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ambre-cli")]
#[command(author, version, about = "Ambre CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run pending database migrations
    Migrate,
    /// Seed the catalogue products and default admin account
    Seed,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin username
        #[arg(short, long)]
        username: String,

        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Name of the environment variable holding the password
        #[arg(long, default_value = "AMBRE_ADMIN_PASSWORD")]
        password_env: String,
    },
    /// Replace an admin account's password
    SetPassword {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Name of the environment variable holding the new password
        #[arg(long, default_value = "AMBRE_ADMIN_PASSWORD")]
        password_env: String,
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
        Commands::Seed => commands::seed::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                username,
                email,
                name,
                password_env,
            } => commands::admin::create(&username, &email, &name, &password_env).await?,
            AdminAction::SetPassword {
                email,
                password_env,
            } => commands::admin::set_password(&email, &password_env).await?,
        },
    }

    Ok(())
}
