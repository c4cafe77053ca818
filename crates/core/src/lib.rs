//! Optica Core - Shared catalog types and storefront logic.
//!
//! This crate provides the domain model used across all Optica components:
//! - `server` - REST catalog API with admin-gated product management
//! - `cli` - Command-line tools for migrations, seeding and sidecar upkeep
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. The storefront-side logic (facet filtering,
//! cart and wishlist state) lives here as well so that any client can reuse
//! it without pulling in the server stack.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices
//! - [`product`] - Product entity, input validation and pricing helpers
//! - [`image`] - Image sidecar records and display image resolution
//! - [`query`] - Catalog filters and pagination
//! - [`facets`] - In-memory facet filter engine
//! - [`cart`] - Process-local cart and wishlist

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod facets;
pub mod image;
pub mod product;
pub mod query;
pub mod types;

pub use cart::{Cart, CartItem, Wishlist, WishlistItem};
pub use facets::{Facet, FacetSelection, PriceRange};
pub use image::{ImageRecord, ProductListing, image_url, stored_filename};
pub use product::{
    FieldError, Product, ProductDraft, ProductImage, ProductInput, Specifications,
    ValidationErrors,
};
pub use query::{CatalogFilter, Page, Pagination, ProductQuery};
pub use types::*;
