//! CLI command implementations.

pub mod images;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Read `DATABASE_URL`, loading `.env` first.
pub(crate) fn database_url() -> Result<SecretString, &'static str> {
    dotenvy::dotenv().ok();
    std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| "DATABASE_URL not set")
}
