//! Seed the catalog from a file.
//!
//! The file holds an array of products in the same shape the admin API
//! accepts (`name`, `description`, `category`, `brand`, `price`,
//! `originalPrice`, `stock`, ...). `.yaml` and `.yml` files are read as
//! YAML, anything else as JSON. Every entry is validated before the
//! database is touched; products whose brand and name already exist are
//! skipped.

use std::path::Path;

use optica_core::{ProductDraft, ProductInput, ValidationErrors};
use optica_server::db::{self, CatalogStore, PgCatalogStore, RepositoryError};
use tracing::{error, info, warn};

/// Parse a seed file's content according to its extension.
pub(crate) fn parse(
    path: &Path,
    content: &str,
) -> Result<Vec<ProductInput>, Box<dyn std::error::Error>> {
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
        Ok(serde_yaml::from_str(content)?)
    } else {
        Ok(serde_json::from_str(content)?)
    }
}

/// Validate every entry, keeping the position of the failing ones.
pub(crate) fn validate(
    inputs: Vec<ProductInput>,
) -> Result<Vec<ProductDraft>, Vec<(usize, ValidationErrors)>> {
    let mut drafts = Vec::with_capacity(inputs.len());
    let mut failures = Vec::new();

    for (index, input) in inputs.into_iter().enumerate() {
        match input.validate() {
            Ok(draft) => drafts.push(draft),
            Err(errors) => failures.push((index, errors)),
        }
    }

    if failures.is_empty() {
        Ok(drafts)
    } else {
        Err(failures)
    }
}

/// Seed products from a JSON or YAML file.
///
/// # Errors
///
/// Returns an error if the file can't be read or parsed, any entry fails
/// validation, `DATABASE_URL` is missing, or an insert fails for a reason
/// other than a duplicate.
pub async fn products(file_path: &str, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");
    let content = tokio::fs::read_to_string(path).await?;
    let inputs = parse(path, &content)?;
    info!(products = inputs.len(), "Parsed seed file");

    let drafts = match validate(inputs) {
        Ok(drafts) => drafts,
        Err(failures) => {
            error!("Seed file validation failed:");
            for (index, errors) in &failures {
                error!("  - entry {index}: {}", errors.messages().join(", "));
            }
            return Err(format!("{} invalid entries found", failures.len()).into());
        }
    };

    if dry_run {
        info!(products = drafts.len(), "Seed file is valid (dry run, nothing inserted)");
        return Ok(());
    }

    let database_url = super::database_url()?;
    let store = PgCatalogStore::new(db::create_pool(&database_url).await?);
    info!("Connected to database");

    let mut inserted = 0usize;
    let mut skipped = 0usize;
    for draft in &drafts {
        match store.create(draft).await {
            Ok(product) => {
                inserted += 1;
                info!(product_id = %product.id, name = %product.name, "Inserted");
            }
            Err(RepositoryError::Conflict(_)) => {
                skipped += 1;
                warn!(brand = %draft.brand, name = %draft.name, "Already exists, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!("Seeding complete!");
    info!("  Products inserted: {inserted}");
    info!("  Products skipped (already exist): {skipped}");

    Ok(())
}
