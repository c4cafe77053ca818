//! In-memory catalog for local development and tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use optica_core::{CatalogFilter, Pagination, Product, ProductDraft, ProductId, ProductImage};

use super::{CatalogStore, RepositoryError};

#[derive(Debug, Default)]
struct Inner {
    next_id: i32,
    products: Vec<Product>,
}

/// Catalog held in a vector behind an async lock.
///
/// Mirrors the `PostgreSQL` store: serial ids starting at 1, newest-first
/// ordering, and a unique `(brand, name)` pair.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    inner: RwLock<Inner>,
}

impl MemoryCatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn name_taken(products: &[Product], draft: &ProductDraft, except: Option<ProductId>) -> bool {
    products
        .iter()
        .any(|p| Some(p.id) != except && p.brand == draft.brand && p.name == draft.name)
}

fn conflict() -> RepositoryError {
    RepositoryError::Conflict("product with this brand and name already exists".to_owned())
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn list(
        &self,
        filter: &CatalogFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Product>, u64), RepositoryError> {
        let inner = self.inner.read().await;
        let mut matching: Vec<&Product> =
            inner.products.iter().filter(|p| filter.matches(p)).collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matching.len() as u64;
        let page = pagination
            .slice(&matching)
            .iter()
            .map(|p| (*p).clone())
            .collect();
        Ok((page, total))
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.products.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, draft: &ProductDraft) -> Result<Product, RepositoryError> {
        let mut inner = self.inner.write().await;
        if name_taken(&inner.products, draft, None) {
            return Err(conflict());
        }
        inner.next_id += 1;
        let product = Product::from_draft(ProductId::new(inner.next_id), draft.clone(), Utc::now());
        inner.products.push(product.clone());
        Ok(product)
    }

    async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut inner = self.inner.write().await;
        if name_taken(&inner.products, draft, Some(id)) {
            return Err(conflict());
        }
        let Some(product) = inner.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        product.apply_draft(draft.clone(), Utc::now());
        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        let before = inner.products.len();
        inner.products.retain(|p| p.id != id);
        Ok(inner.products.len() < before)
    }

    async fn push_image(
        &self,
        id: ProductId,
        image: &ProductImage,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut inner = self.inner.write().await;
        let Some(product) = inner.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        product.images.push(image.clone());
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn product_ids(&self) -> Result<Vec<ProductId>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.products.iter().map(|p| p.id).collect())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use optica_core::ProductInput;

    use super::*;

    fn draft(name: &str, category: &str) -> ProductDraft {
        ProductInput {
            name: Some(name.to_owned()),
            description: Some(format!("{name} frame")),
            category: Some(category.to_owned()),
            brand: Some("Optica".to_owned()),
            price: Some(1500.into()),
            original_price: Some(2000.into()),
            stock: Some(3),
            ..ProductInput::default()
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn test_ids_are_serial() {
        let store = MemoryCatalogStore::new();
        let a = store.create(&draft("Round", "eyeglasses")).await.unwrap();
        let b = store.create(&draft("Square", "eyeglasses")).await.unwrap();
        assert_eq!(a.id, ProductId::new(1));
        assert_eq!(b.id, ProductId::new(2));
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_filtered() {
        let store = MemoryCatalogStore::new();
        store.create(&draft("Round", "eyeglasses")).await.unwrap();
        store.create(&draft("Aviator", "sunglasses")).await.unwrap();
        store.create(&draft("Square", "eyeglasses")).await.unwrap();

        let filter = CatalogFilter {
            category: Some("eyeglasses".to_owned()),
            ..CatalogFilter::default()
        };
        let (page, total) = store.list(&filter, Pagination::default()).await.unwrap();
        assert_eq!(total, 2);
        let names: Vec<_> = page.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Square", "Round"]);
    }

    #[tokio::test]
    async fn test_duplicate_brand_and_name_conflicts() {
        let store = MemoryCatalogStore::new();
        store.create(&draft("Round", "eyeglasses")).await.unwrap();
        let err = store.create(&draft("Round", "sunglasses")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_may_keep_its_own_name() {
        let store = MemoryCatalogStore::new();
        let p = store.create(&draft("Round", "eyeglasses")).await.unwrap();
        let updated = store
            .update(p.id, &draft("Round", "sunglasses"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.category, "sunglasses");
        assert_eq!(updated.created_at, p.created_at);
    }

    #[tokio::test]
    async fn test_missing_product_operations() {
        let store = MemoryCatalogStore::new();
        let id = ProductId::new(42);
        assert!(store.get(id).await.unwrap().is_none());
        assert!(store.update(id, &draft("X", "eyeglasses")).await.unwrap().is_none());
        assert!(!store.delete(id).await.unwrap());
        let image = ProductImage::new("/images/x.png", "x.png");
        assert!(store.push_image(id, &image).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_push_image_appends() {
        let store = MemoryCatalogStore::new();
        let p = store.create(&draft("Round", "eyeglasses")).await.unwrap();
        let image = ProductImage::new("/images/a.png", "a.png");
        let updated = store.push_image(p.id, &image).await.unwrap().unwrap();
        assert_eq!(updated.images, vec![image]);
    }
}
