//! Catalog service.
//!
//! Combines the catalog store with the image sidecar: listings get their
//! display image resolved, deletes cascade to uploaded files, and uploads
//! land in both places.

mod error;

pub use error::CatalogError;

use chrono::Utc;
use rand::Rng;
use serde::Serialize;

use optica_core::{
    ImageRecord, Page, Product, ProductId, ProductImage, ProductInput, ProductListing,
    ProductQuery, image_url, stored_filename,
};

use crate::db::CatalogStore;
use crate::sidecar::ImageSidecar;

/// Extensions accepted by the upload endpoint (lowercase).
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];

/// Exclusive upper bound of the random part of a stored filename.
const FILENAME_SUFFIX_RANGE: u32 = 1_000_000_000;

/// A file received from the upload form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub product_id: ProductId,
    /// Name of the file as sent by the client.
    pub original_name: String,
    pub bytes: Vec<u8>,
}

/// Response body of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedImage {
    pub url: String,
    pub filename: String,
    pub originalname: String,
}

/// Whether `filename` ends in one of [`ALLOWED_IMAGE_EXTENSIONS`].
#[must_use]
pub fn is_allowed_image(filename: &str) -> bool {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ALLOWED_IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// Catalog service.
pub struct CatalogService<'a> {
    store: &'a dyn CatalogStore,
    sidecar: &'a ImageSidecar,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(store: &'a dyn CatalogStore, sidecar: &'a ImageSidecar) -> Self {
        Self { store, sidecar }
    }

    /// One page of products with their display image.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` or `CatalogError::Sidecar` when
    /// either store can't be read.
    pub async fn list(&self, query: ProductQuery) -> Result<Page<ProductListing>, CatalogError> {
        let (filter, pagination) = query.into_parts();
        let (products, total) = self.store.list(&filter, pagination).await?;
        let sidecar = self.sidecar.all().await?;

        Ok(Page::new(products, pagination, total)
            .map(|product| ProductListing::resolve(product, &sidecar)))
    }

    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no product has this id.
    pub async fn get(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.store.get(id).await?.ok_or(CatalogError::NotFound)
    }

    /// Sidecar records for a product. Unknown ids simply have none.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Sidecar` if the metadata can't be read.
    pub async fn images(&self, id: ProductId) -> Result<Vec<ImageRecord>, CatalogError> {
        Ok(self.sidecar.list_for_product(id).await?)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for invalid input and
    /// `CatalogError::Duplicate` if brand and name are taken.
    pub async fn create(&self, input: ProductInput) -> Result<Product, CatalogError> {
        let draft = input.validate()?;
        let product = self.store.create(&draft).await?;
        tracing::info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Replace every editable field of a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for invalid input,
    /// `CatalogError::NotFound` if the product doesn't exist, and
    /// `CatalogError::Duplicate` if brand and name are taken.
    pub async fn update(
        &self,
        id: ProductId,
        input: ProductInput,
    ) -> Result<Product, CatalogError> {
        let draft = input.validate()?;
        let product = self
            .store
            .update(id, &draft)
            .await?
            .ok_or(CatalogError::NotFound)?;
        tracing::info!(product_id = %id, "Product updated");
        Ok(product)
    }

    /// Delete a product and its uploaded images.
    ///
    /// The catalog row goes first. If cleaning the sidecar fails afterwards
    /// the delete still succeeds and the leftovers are logged; `optica images
    /// prune` removes them later.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product doesn't exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), CatalogError> {
        if !self.store.delete(id).await? {
            return Err(CatalogError::NotFound);
        }

        match self.sidecar.remove_for_product(id).await {
            Ok(removed) => {
                tracing::info!(product_id = %id, images_removed = removed.len(), "Product deleted");
            }
            Err(e) => {
                tracing::error!(
                    product_id = %id,
                    error = %e,
                    "Product deleted but image cleanup failed"
                );
            }
        }
        Ok(())
    }

    /// Store an uploaded image and attach it to its product.
    ///
    /// Writes the file, appends `{url, alt: original name}` to the product's
    /// images, then appends the sidecar record.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnsupportedImage` for disallowed extensions,
    /// `CatalogError::NotFound` if the product doesn't exist, and I/O or
    /// storage errors otherwise.
    pub async fn upload_image(&self, upload: ImageUpload) -> Result<UploadedImage, CatalogError> {
        if !is_allowed_image(&upload.original_name) {
            return Err(CatalogError::UnsupportedImage(
                ALLOWED_IMAGE_EXTENSIONS.join(", "),
            ));
        }
        if self.store.get(upload.product_id).await?.is_none() {
            return Err(CatalogError::NotFound);
        }

        let now = Utc::now();
        let suffix = rand::rng().random_range(0..FILENAME_SUFFIX_RANGE);
        let filename = stored_filename(now.timestamp_millis(), suffix, &upload.original_name);
        let path = self.sidecar.file_path(&filename);

        self.sidecar.ensure_dir().await?;
        tokio::fs::write(&path, &upload.bytes).await?;

        let url = image_url(&filename);
        let image = ProductImage::new(url.clone(), upload.original_name.clone());
        let attached = match self.store.push_image(upload.product_id, &image).await {
            Ok(product) => product,
            Err(e) => {
                remove_quietly(&path).await;
                return Err(e.into());
            }
        };
        if attached.is_none() {
            // Deleted between the existence check and the append.
            remove_quietly(&path).await;
            return Err(CatalogError::NotFound);
        }

        self.sidecar
            .append(ImageRecord {
                product_id: upload.product_id,
                filename: filename.clone(),
                originalname: upload.original_name.clone(),
                uploaded_at: now,
            })
            .await?;

        tracing::info!(
            product_id = %upload.product_id,
            filename = %filename,
            size = upload.bytes.len(),
            "Image uploaded"
        );

        Ok(UploadedImage {
            url,
            filename,
            originalname: upload.original_name,
        })
    }

    /// Drop sidecar records (and files) whose product no longer exists.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if either store fails.
    pub async fn prune_orphan_images(&self) -> Result<Vec<ImageRecord>, CatalogError> {
        let ids: std::collections::HashSet<ProductId> =
            self.store.product_ids().await?.into_iter().collect();
        Ok(self.sidecar.retain(|r| ids.contains(&r.product_id)).await?)
    }
}

async fn remove_quietly(path: &std::path::Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove orphaned upload");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::MemoryCatalogStore;

    fn input(name: &str) -> ProductInput {
        ProductInput {
            name: Some(name.to_owned()),
            description: Some("Lightweight acetate".to_owned()),
            category: Some("eyeglasses".to_owned()),
            brand: Some("Optica".to_owned()),
            price: Some(Decimal::from(1200)),
            original_price: Some(Decimal::from(1500)),
            stock: Some(10),
            ..ProductInput::default()
        }
    }

    #[test]
    fn test_allowed_image_extensions() {
        assert!(is_allowed_image("frame.PNG"));
        assert!(is_allowed_image("a.b.jpeg"));
        assert!(!is_allowed_image("frame.svg"));
        assert!(!is_allowed_image("png"));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryCatalogStore::new();
        let sidecar = ImageSidecar::new(dir.path());
        let service = CatalogService::new(&store, &sidecar);

        let err = service.create(ProductInput::default()).await.unwrap_err();
        let CatalogError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert!(errors.has("name"));
        assert!(errors.has("price"));
    }

    #[tokio::test]
    async fn test_duplicate_maps_to_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryCatalogStore::new();
        let sidecar = ImageSidecar::new(dir.path());
        let service = CatalogService::new(&store, &sidecar);

        service.create(input("Round")).await.unwrap();
        assert!(matches!(
            service.create(input("Round")).await,
            Err(CatalogError::Duplicate)
        ));
    }

    #[tokio::test]
    async fn test_upload_then_delete_cascades() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryCatalogStore::new();
        let sidecar = ImageSidecar::new(dir.path());
        let service = CatalogService::new(&store, &sidecar);
        let product = service.create(input("Round")).await.unwrap();

        let uploaded = service
            .upload_image(ImageUpload {
                product_id: product.id,
                original_name: "front.png".to_owned(),
                bytes: b"png".to_vec(),
            })
            .await
            .unwrap();
        assert!(uploaded.filename.ends_with("-front.png"));
        assert_eq!(uploaded.url, format!("/images/{}", uploaded.filename));
        assert!(dir.path().join(&uploaded.filename).exists());

        let stored = service.get(product.id).await.unwrap();
        assert_eq!(stored.images.len(), 1);
        assert_eq!(stored.images[0].alt, "front.png");

        let page = service.list(ProductQuery::default()).await.unwrap();
        assert_eq!(page.products[0].image_url, uploaded.url);

        service.delete(product.id).await.unwrap();
        assert!(service.images(product.id).await.unwrap().is_empty());
        assert!(!dir.path().join(&uploaded.filename).exists());
    }

    #[tokio::test]
    async fn test_upload_to_missing_product_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryCatalogStore::new();
        let sidecar = ImageSidecar::new(dir.path());
        let service = CatalogService::new(&store, &sidecar);

        let err = service
            .upload_image(ImageUpload {
                product_id: ProductId::new(99),
                original_name: "front.png".to_owned(),
                bytes: vec![1, 2, 3],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound));
        assert!(sidecar.all().await.unwrap().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_prune_drops_orphans() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryCatalogStore::new();
        let sidecar = ImageSidecar::new(dir.path());
        let service = CatalogService::new(&store, &sidecar);
        let product = service.create(input("Round")).await.unwrap();

        for id in [product.id, ProductId::new(500)] {
            sidecar
                .append(ImageRecord {
                    product_id: id,
                    filename: format!("{id}.png"),
                    originalname: "x.png".to_owned(),
                    uploaded_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        let removed = service.prune_orphan_images().await.unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].product_id, ProductId::new(500));
        assert_eq!(sidecar.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryCatalogStore::new();
        let sidecar = ImageSidecar::new(dir.path());
        let service = CatalogService::new(&store, &sidecar);
        assert!(matches!(
            service.delete(ProductId::new(1)).await,
            Err(CatalogError::NotFound)
        ));
    }
}
