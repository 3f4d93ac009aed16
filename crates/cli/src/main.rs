//! Ethical AI Knowledge Base CLI - Operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Show a user's role
//! kb-cli role get <uid>
//!
//! # Assign a role (this is how the first admin is created)
//! kb-cli role set <uid> admin
//!
//! # Check an ID token
//! kb-cli token verify <token>
//!
//! # Show how the edge policy classifies paths
//! kb-cli routes classify /admin/users /api/health /login
//! ```
//!
//! # Commands
//!
//! - `role` - Read and assign `role` custom claims
//! - `token` - Verify ID tokens
//! - `routes` - Inspect the route classification table

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "kb-cli")]
#[command(author, version, about = "Ethical AI Knowledge Base operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage user roles
    Role {
        #[command(subcommand)]
        action: RoleAction,
    },
    /// Inspect ID tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Inspect the route classification table
    Routes {
        #[command(subcommand)]
        action: RoutesAction,
    },
}

#[derive(Subcommand)]
enum RoleAction {
    /// Show a user's role
    Get {
        /// User id
        uid: String,
    },
    /// Assign a role, replacing the user's custom claims
    Set {
        /// User id
        uid: String,

        /// Role (`admin`, `user`, `guest`)
        role: String,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Verify an ID token and show its subject
    Verify {
        /// Encoded ID token
        token: String,
    },
}

#[derive(Subcommand)]
enum RoutesAction {
    /// Classify request paths
    Classify {
        /// Paths to classify
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Role { action } => match action {
            RoleAction::Get { uid } => {
                commands::role::get(&uid).await?;
            }
            RoleAction::Set { uid, role } => commands::role::set(&uid, &role).await?,
        },
        Commands::Token { action } => match action {
            TokenAction::Verify { token } => commands::token::verify(&token).await?,
        },
        Commands::Routes { action } => match action {
            RoutesAction::Classify { paths } => commands::routes::classify(&paths),
        },
    }
    Ok(())
}
