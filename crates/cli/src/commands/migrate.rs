//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! optica migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string for the catalog
//!
//! # Migration Files
//!
//! Stored in `crates/server/migrations/` and embedded at compile time.

use optica_server::db;
use thiserror::Error;
use tracing::info;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run every pending catalog migration.
///
/// # Errors
///
/// Returns `MigrationError` if `DATABASE_URL` is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let database_url =
        super::database_url().map_err(|_| MigrationError::MissingEnvVar("DATABASE_URL"))?;

    info!("Connecting to catalog database...");
    let pool = db::create_pool(&database_url).await?;

    info!("Running catalog migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    info!("Catalog migrations complete!");
    Ok(())
}
