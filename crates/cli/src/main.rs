//! Optica CLI - Database migrations and catalog maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Run catalog database migrations
//! optica migrate
//!
//! # Load products from a JSON or YAML file
//! optica seed products.json
//!
//! # Check a seed file without touching the database
//! optica seed products.json --dry-run
//!
//! # Remove sidecar images whose product no longer exists
//! optica images prune
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Insert products from a file
//! - `images prune` - Drop orphaned image records and files

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "optica")]
#[command(author, version, about = "Optica CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert products from a JSON or YAML file
    Seed {
        /// Path to a file holding an array of products
        file: String,

        /// Validate the file without connecting to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Maintain uploaded images
    Images {
        #[command(subcommand)]
        action: ImagesAction,
    },
}

#[derive(Subcommand)]
enum ImagesAction {
    /// Remove image records and files whose product no longer exists
    Prune {
        /// List what would be removed without removing it
        #[arg(long)]
        dry_run: bool,
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
        Commands::Seed { file, dry_run } => commands::seed::products(&file, dry_run).await?,
        Commands::Images { action } => match action {
            ImagesAction::Prune { dry_run } => commands::images::prune(dry_run).await?,
        },
    }
    Ok(())
}
