//! Product entity and admin input validation.
//!
//! [`Product`] is what the catalog stores and returns. [`ProductInput`] is
//! what the admin panel submits; every field is optional at the wire level
//! so that a half-filled form produces per-field validation messages
//! instead of a deserializer error. [`ProductInput::validate`] turns it into
//! a [`ProductDraft`] that stores can persist without re-checking.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Maximum length of a product name.
pub const MAX_NAME_LENGTH: usize = 200;

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub brand: String,
    pub price: Price,
    pub original_price: Price,
    pub stock: u32,
    pub is_active: bool,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub specifications: Specifications,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Build a product from a validated draft.
    #[must_use]
    pub fn from_draft(id: ProductId, draft: ProductDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            category: draft.category,
            brand: draft.brand,
            price: draft.price,
            original_price: draft.original_price,
            stock: draft.stock,
            is_active: draft.is_active,
            images: draft.images,
            specifications: draft.specifications,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every editable field with the draft's values.
    ///
    /// `id` and `created_at` are preserved.
    pub fn apply_draft(&mut self, draft: ProductDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.description = draft.description;
        self.category = draft.category;
        self.brand = draft.brand;
        self.price = draft.price;
        self.original_price = draft.original_price;
        self.stock = draft.stock;
        self.is_active = draft.is_active;
        self.images = draft.images;
        self.specifications = draft.specifications;
        self.updated_at = now;
    }

    /// Whole-percent discount shown next to the price, if any.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        self.price.discount_from(self.original_price)
    }

    /// The first embedded image with a usable URL.
    #[must_use]
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images.iter().find(|img| !img.url.is_empty())
    }
}

/// An image variant embedded in a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    #[serde(default)]
    pub alt: String,
    /// Frame color shown in this image, used by the color facet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ProductImage {
    /// Create an image without a color tag.
    #[must_use]
    pub fn new(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt: alt.into(),
            color: None,
        }
    }
}

/// Frame attributes used by the storefront facets.
///
/// The admin form posts empty strings for unselected dropdowns; those are
/// normalized to `None` during validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specifications {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_group: Option<String>,
}

impl Specifications {
    fn normalized(self) -> Self {
        Self {
            frame_type: non_blank(self.frame_type),
            frame_shape: non_blank(self.frame_shape),
            frame_color: non_blank(self.frame_color),
            frame_size: non_blank(self.frame_size),
            gender: non_blank(self.gender),
            weight_group: non_blank(self.weight_group),
        }
    }
}

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All validation failures for one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", self.messages().join(", "))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Whether any field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The failing fields, in form order.
    #[must_use]
    pub fn fields(&self) -> &[FieldError] {
        &self.errors
    }

    /// Just the human-readable messages.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }

    /// Whether `field` has at least one error.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

/// Product data as submitted by the admin panel.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub original_price: Option<Decimal>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub images: Option<Vec<ProductImage>>,
    #[serde(default)]
    pub specifications: Option<Specifications>,
}

/// A validated product ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub category: String,
    pub brand: String,
    pub price: Price,
    pub original_price: Price,
    pub stock: u32,
    pub is_active: bool,
    pub images: Vec<ProductImage>,
    pub specifications: Specifications,
}

impl ProductInput {
    /// Validate the submission, collecting every failing field.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing one message per invalid field.
    pub fn validate(self) -> Result<ProductDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = required_text(&mut errors, "name", "Name", self.name);
        if let Some(n) = &name
            && n.chars().count() > MAX_NAME_LENGTH
        {
            errors.push(
                "name",
                format!("Name must be at most {MAX_NAME_LENGTH} characters"),
            );
        }
        let description =
            required_text(&mut errors, "description", "Description", self.description);
        let category = required_text(&mut errors, "category", "Category", self.category);
        let brand = required_text(&mut errors, "brand", "Brand", self.brand);
        let price = required_price(&mut errors, "price", "Price", self.price);
        let original_price = required_price(
            &mut errors,
            "originalPrice",
            "Original price",
            self.original_price,
        );

        let stock = match self.stock {
            None => {
                errors.push("stock", "Stock is required");
                None
            }
            Some(s) => match u32::try_from(s) {
                Ok(v) => Some(v),
                Err(_) if s < 0 => {
                    errors.push("stock", "Stock cannot be negative");
                    None
                }
                Err(_) => {
                    errors.push("stock", "Stock is too large");
                    None
                }
            },
        };

        match (
            name,
            description,
            category,
            brand,
            price,
            original_price,
            stock,
        ) {
            (
                Some(name),
                Some(description),
                Some(category),
                Some(brand),
                Some(price),
                Some(original_price),
                Some(stock),
            ) if errors.is_empty() => Ok(ProductDraft {
                name,
                description,
                category,
                brand,
                price,
                original_price,
                stock,
                is_active: self.is_active.unwrap_or(true),
                images: self
                    .images
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|img| !img.url.trim().is_empty())
                    .collect(),
                specifications: self.specifications.unwrap_or_default().normalized(),
            }),
            _ => Err(errors),
        }
    }
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    label: &str,
    value: Option<String>,
) -> Option<String> {
    match non_blank(value) {
        Some(v) => Some(v),
        None => {
            errors.push(field, format!("{label} is required"));
            None
        }
    }
}

fn required_price(
    errors: &mut ValidationErrors,
    field: &'static str,
    label: &str,
    value: Option<Decimal>,
) -> Option<Price> {
    let Some(amount) = value else {
        errors.push(field, format!("{label} is required"));
        return None;
    };
    if let Ok(price) = Price::new(amount) {
        Some(price)
    } else {
        errors.push(field, format!("{label} cannot be negative"));
        None
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_input() -> ProductInput {
        ProductInput {
            name: Some("Aviator Classic".to_owned()),
            description: Some("Gold metal aviator".to_owned()),
            category: Some("sunglasses".to_owned()),
            brand: Some("Ray-Ban".to_owned()),
            price: Some(Decimal::from(4500)),
            original_price: Some(Decimal::from(6000)),
            stock: Some(12),
            ..ProductInput::default()
        }
    }

    #[test]
    fn test_valid_input_produces_draft() {
        let draft = valid_input().validate().unwrap();
        assert_eq!(draft.name, "Aviator Classic");
        assert_eq!(draft.price, Price::from_rupees(4500));
        assert_eq!(draft.stock, 12);
        assert!(draft.is_active);
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let errors = ProductInput::default().validate().unwrap_err();
        for field in [
            "name",
            "description",
            "category",
            "brand",
            "price",
            "originalPrice",
            "stock",
        ] {
            assert!(errors.has(field), "expected error for {field}");
        }
        assert!(errors.messages().contains(&"Name is required".to_owned()));
    }

    #[test]
    fn test_blank_text_counts_as_missing() {
        let input = ProductInput {
            brand: Some("   ".to_owned()),
            ..valid_input()
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.fields().len(), 1);
        assert!(errors.has("brand"));
    }

    #[test]
    fn test_negative_price_and_stock_rejected() {
        let input = ProductInput {
            price: Some(Decimal::from(-1)),
            stock: Some(-3),
            ..valid_input()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.has("price"));
        assert!(errors.has("stock"));
        assert!(!errors.has("originalPrice"));
    }

    #[test]
    fn test_overlong_name_rejected() {
        let input = ProductInput {
            name: Some("x".repeat(MAX_NAME_LENGTH + 1)),
            ..valid_input()
        };
        assert!(input.validate().unwrap_err().has("name"));
    }

    #[test]
    fn test_blank_specifications_become_none() {
        let input = ProductInput {
            specifications: Some(Specifications {
                frame_type: Some(String::new()),
                frame_shape: Some("Round".to_owned()),
                ..Specifications::default()
            }),
            ..valid_input()
        };
        let draft = input.validate().unwrap();
        assert_eq!(draft.specifications.frame_type, None);
        assert_eq!(draft.specifications.frame_shape.as_deref(), Some("Round"));
    }

    #[test]
    fn test_input_deserializes_from_admin_form() {
        let input: ProductInput = serde_json::from_value(serde_json::json!({
            "name": "Round Metal",
            "description": "Thin wire frame",
            "category": "eyeglasses",
            "brand": "Persol",
            "price": 1200,
            "originalPrice": 1500,
            "stock": 4,
            "isActive": false,
            "specifications": { "frameType": "Full Rim", "gender": "" }
        }))
        .unwrap();
        let draft = input.validate().unwrap();
        assert!(!draft.is_active);
        assert_eq!(draft.original_price, Price::from_rupees(1500));
        assert_eq!(draft.specifications.frame_type.as_deref(), Some("Full Rim"));
        assert_eq!(draft.specifications.gender, None);
    }

    #[test]
    fn test_product_serializes_with_underscore_id() {
        let draft = valid_input().validate().unwrap();
        let product = Product::from_draft(ProductId::new(3), draft, Utc::now());
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["_id"], 3);
        assert_eq!(json["originalPrice"], 6000);
        assert_eq!(json["isActive"], true);
        assert_eq!(product.discount_percent(), Some(25));
    }
}
