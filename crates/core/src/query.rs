//! Catalog filters and pagination.
//!
//! [`ProductQuery`] is the raw query string of `GET /products`. It splits
//! into a [`CatalogFilter`] (what to match) and a [`Pagination`] (which
//! slice to return). Stores translate the filter into their own query
//! language; [`CatalogFilter::matches`] is the reference semantics.

use serde::{Deserialize, Serialize};

use crate::product::Product;

/// Page size when the client doesn't ask for one.
pub const DEFAULT_LIMIT: u32 = 10;

/// Largest page a client may request.
pub const MAX_LIMIT: u32 = 100;

/// Query parameters accepted by the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub search: Option<String>,
}

impl ProductQuery {
    /// Split into the filter and the normalized pagination.
    #[must_use]
    pub fn into_parts(self) -> (CatalogFilter, Pagination) {
        let pagination = Pagination::new(self.page, self.limit);
        let filter = CatalogFilter {
            category: non_empty(self.category),
            brand: non_empty(self.brand),
            search: non_empty(self.search),
        };
        (filter, pagination)
    }
}

/// Which products a listing should contain.
///
/// Absent fields match everything. Empty strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Exact brand match.
    pub brand: Option<String>,
    /// Case-insensitive substring of name or description.
    pub search: Option<String>,
}

impl CatalogFilter {
    /// Whether `product` satisfies every set predicate.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category
            && product.category != *category
        {
            return false;
        }
        if let Some(brand) = &self.brand
            && product.brand != *brand
        {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            return product.name.to_lowercase().contains(&needle)
                || product.description.to_lowercase().contains(&needle);
        }
        true
    }
}

/// A normalized page request. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Normalize raw values: page defaults to 1 (min 1), limit defaults to
    /// [`DEFAULT_LIMIT`] and is clamped to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// `ceil(total / limit)`.
    #[must_use]
    pub const fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit as u64)
    }

    /// Apply this page to an already filtered and ordered slice.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let end = start.saturating_add(self.limit as usize);
        items.get(start..end.min(items.len())).unwrap_or_default()
    }
}

/// One page of results plus the totals the client needs for navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub products: Vec<T>,
    pub total_pages: u64,
    pub current_page: u32,
    pub total: u64,
}

impl<T> Page<T> {
    /// Assemble a page from its rows and the unpaginated total.
    #[must_use]
    pub fn new(products: Vec<T>, pagination: Pagination, total: u64) -> Self {
        Self {
            products,
            total_pages: pagination.total_pages(total),
            current_page: pagination.page(),
            total,
        }
    }

    /// Convert each row, keeping the totals.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            products: self.products.into_iter().map(f).collect(),
            total_pages: self.total_pages,
            current_page: self.current_page,
            total: self.total,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
