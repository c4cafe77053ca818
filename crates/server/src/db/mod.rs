//! Catalog persistence.
//!
//! # Database: `optica`
//!
//! ## Tables
//!
//! - `catalog.products` - Products with JSONB `images` and `specifications`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p optica-cli -- migrate
//! ```
//!
//! Without a `DATABASE_URL` the server falls back to [`MemoryCatalogStore`],
//! which keeps the same ordering and uniqueness rules in a process-local
//! vector.

pub mod memory;
pub mod products;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use optica_core::{CatalogFilter, Pagination, Product, ProductDraft, ProductId, ProductImage};

pub use memory::MemoryCatalogStore;
pub use products::PgCatalogStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate brand and name).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Storage backend for the product catalog.
///
/// Listings are ordered newest first (`created_at` descending, then id
/// descending) so pages stay stable while nothing is inserted.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// One page of products matching `filter`, plus the unpaginated count.
    async fn list(
        &self,
        filter: &CatalogFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Product>, u64), RepositoryError>;

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Insert a new product. `Conflict` when brand and name are taken.
    async fn create(&self, draft: &ProductDraft) -> Result<Product, RepositoryError>;

    /// Replace every editable field. `None` when the product doesn't exist.
    async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError>;

    /// Append to the product's image array.
    async fn push_image(
        &self,
        id: ProductId,
        image: &ProductImage,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Every product id currently in the catalog.
    async fn product_ids(&self) -> Result<Vec<ProductId>, RepositoryError>;

    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
