//! Image directory maintenance.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string for the catalog
//! - `OPTICA_IMAGE_DIR` - Upload directory (default: public/images)

use std::collections::HashSet;

use optica_core::ProductId;
use optica_server::db::{self, CatalogStore, PgCatalogStore};
use optica_server::services::catalog::CatalogService;
use optica_server::sidecar::ImageSidecar;
use tracing::info;

fn image_dir() -> String {
    std::env::var("OPTICA_IMAGE_DIR")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "public/images".to_owned())
}

/// Remove sidecar records, and their files, whose product is gone.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is missing, the database is
/// unreachable, or the sidecar can't be read or rewritten.
pub async fn prune(dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;
    let store = PgCatalogStore::new(db::create_pool(&database_url).await?);
    let sidecar = ImageSidecar::new(image_dir());
    info!(image_dir = %sidecar.dir().display(), "Scanning image metadata");

    let removed = if dry_run {
        let ids: HashSet<ProductId> = store.product_ids().await?.into_iter().collect();
        sidecar
            .all()
            .await?
            .into_iter()
            .filter(|r| !ids.contains(&r.product_id))
            .collect()
    } else {
        CatalogService::new(&store, &sidecar)
            .prune_orphan_images()
            .await?
    };

    for record in &removed {
        info!(
            product_id = %record.product_id,
            filename = %record.filename,
            "{}",
            if dry_run { "Would remove" } else { "Removed" }
        );
    }
    info!(count = removed.len(), dry_run, "Prune complete");

    Ok(())
}
