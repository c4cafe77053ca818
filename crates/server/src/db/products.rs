//! `PostgreSQL` catalog repository.
//!
//! Queries are built at runtime with `query_as` so the crate compiles
//! without a live database. Images and specifications are JSONB columns
//! decoded through [`sqlx::types::Json`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use optica_core::{
    CatalogFilter, Pagination, Price, Product, ProductDraft, ProductId, ProductImage,
    Specifications,
};

use super::{CatalogStore, RepositoryError};

const PRODUCT_COLUMNS: &str = "id, name, description, category, brand, price, original_price, \
     stock, is_active, images, specifications, created_at, updated_at";

/// Shared predicate for listing and counting. `$1` category, `$2` brand,
/// `$3` an `ILIKE` pattern or NULL.
const FILTER_CLAUSE: &str = "($1::text IS NULL OR category = $1) \
     AND ($2::text IS NULL OR brand = $2) \
     AND ($3::text IS NULL OR name ILIKE $3 ESCAPE '\\' OR description ILIKE $3 ESCAPE '\\')";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    category: String,
    brand: String,
    price: Decimal,
    original_price: Decimal,
    stock: i64,
    is_active: bool,
    images: Json<Vec<ProductImage>>,
    specifications: Json<Specifications>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;
        let original_price = Price::new(row.original_price).map_err(|e| {
            RepositoryError::DataCorruption(format!(
                "invalid original price for product {}: {e}",
                row.id
            ))
        })?;
        let stock = u32::try_from(row.stock).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "stock out of range for product {}: {}",
                row.id, row.stock
            ))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            category: row.category,
            brand: row.brand,
            price,
            original_price,
            stock,
            is_active: row.is_active,
            images: row.images.0,
            specifications: row.specifications.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Catalog backed by the `catalog.products` table.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for migrations and maintenance commands.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn list(
        &self,
        filter: &CatalogFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Product>, u64), RepositoryError> {
        let pattern = filter.search.as_deref().map(like_pattern);
        let offset = i64::try_from(pagination.offset()).unwrap_or(i64::MAX);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM catalog.products WHERE {FILTER_CLAUSE}"
        ))
        .bind(filter.category.as_deref())
        .bind(filter.brand.as_deref())
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM catalog.products WHERE {FILTER_CLAUSE} \
             ORDER BY created_at DESC, id DESC LIMIT $4 OFFSET $5"
        ))
        .bind(filter.category.as_deref())
        .bind(filter.brand.as_deref())
        .bind(pattern.as_deref())
        .bind(i64::from(pagination.limit()))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let products = rows
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((products, u64::try_from(total).unwrap_or_default()))
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM catalog.products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn create(&self, draft: &ProductDraft) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(&format!(
            r"
            INSERT INTO catalog.products
                (name, description, category, brand, price, original_price,
                 stock, is_active, images, specifications)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(&draft.category)
        .bind(&draft.brand)
        .bind(draft.price.amount())
        .bind(draft.original_price.amount())
        .bind(i64::from(draft.stock))
        .bind(draft.is_active)
        .bind(Json(&draft.images))
        .bind(Json(&draft.specifications))
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Product::try_from(row)
    }

    async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            r"
            UPDATE catalog.products
            SET name = $2, description = $3, category = $4, brand = $5,
                price = $6, original_price = $7, stock = $8, is_active = $9,
                images = $10, specifications = $11, updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(&draft.category)
        .bind(&draft.brand)
        .bind(draft.price.amount())
        .bind(draft.original_price.amount())
        .bind(i64::from(draft.stock))
        .bind(draft.is_active)
        .bind(Json(&draft.images))
        .bind(Json(&draft.specifications))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        row.map(Product::try_from).transpose()
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn push_image(
        &self,
        id: ProductId,
        image: &ProductImage,
    ) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            r"
            UPDATE catalog.products
            SET images = images || jsonb_build_array($2::jsonb), updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(Json(image))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn product_ids(&self) -> Result<Vec<ProductId>, RepositoryError> {
        let ids: Vec<ProductId> = sqlx::query_scalar("SELECT id FROM catalog.products")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(
            "product with this brand and name already exists".to_owned(),
        );
    }
    RepositoryError::Database(e)
}

/// Wrap `search` in `%` for `ILIKE`, escaping its own wildcards.
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_plain_text() {
        assert_eq!(like_pattern("aviator"), "%aviator%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_row_with_negative_price_is_corrupt() {
        let row = ProductRow {
            id: 7,
            name: "Aviator".to_owned(),
            description: "Metal".to_owned(),
            category: "sunglasses".to_owned(),
            brand: "Ray-Ban".to_owned(),
            price: Decimal::from(-1),
            original_price: Decimal::from(10),
            stock: 1,
            is_active: true,
            images: Json(Vec::new()),
            specifications: Json(Specifications::default()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(matches!(
            Product::try_from(row),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
