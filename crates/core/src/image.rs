//! Image sidecar records and display image resolution.
//!
//! Uploaded images are tracked twice: once in the product's embedded
//! `images` array and once in a flat sidecar file of [`ImageRecord`]s. When
//! both exist the sidecar wins for the listing thumbnail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::product::{Product, ProductImage};
use crate::types::ProductId;

/// URL prefix under which uploaded images are served.
pub const IMAGE_URL_PREFIX: &str = "/images";

/// One uploaded image as recorded in the sidecar file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    /// Name of the file on disk, unique within the image directory.
    pub filename: String,
    /// Name of the file as uploaded by the client.
    pub originalname: String,
    #[serde(rename = "uploadedAt")]
    pub uploaded_at: DateTime<Utc>,
}

impl ImageRecord {
    /// Public URL of the stored file.
    #[must_use]
    pub fn url(&self) -> String {
        image_url(&self.filename)
    }
}

/// Public URL for a stored image file.
#[must_use]
pub fn image_url(filename: &str) -> String {
    format!("{IMAGE_URL_PREFIX}/{filename}")
}

/// Pick the image shown for a product in listings.
///
/// Order of precedence: the first sidecar record for the product, then the
/// first embedded image with a non-empty URL, then the empty string.
#[must_use]
pub fn resolve_display_image(
    product_id: ProductId,
    sidecar: &[ImageRecord],
    embedded: &[ProductImage],
) -> String {
    if let Some(record) = sidecar.iter().find(|r| r.product_id == product_id) {
        return record.url();
    }
    embedded
        .iter()
        .find(|img| !img.url.is_empty())
        .map(|img| img.url.clone())
        .unwrap_or_default()
}

/// Replace characters that must not appear in a stored filename.
///
/// Path separators and control characters become `_`; an empty result
/// falls back to `upload`.
#[must_use]
pub fn sanitize_filename(original: &str) -> String {
    let cleaned: String = original
        .trim()
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '/' | '\\') {
                '_'
            } else {
                c
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "upload".to_owned()
    } else {
        cleaned
    }
}

/// Build the on-disk name `<millis>-<suffix>-<original>` for an upload.
#[must_use]
pub fn stored_filename(timestamp_millis: i64, suffix: u32, original: &str) -> String {
    format!(
        "{timestamp_millis}-{suffix}-{}",
        sanitize_filename(original)
    )
}

/// A product with its resolved display image, as returned by listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    #[serde(flatten)]
    pub product: Product,
    pub image_url: String,
}

impl ProductListing {
    /// Attach the display image resolved from `sidecar`.
    #[must_use]
    pub fn resolve(product: Product, sidecar: &[ImageRecord]) -> Self {
        let image_url = resolve_display_image(product.id, sidecar, &product.images);
        Self { product, image_url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(product: i32, filename: &str) -> ImageRecord {
        ImageRecord {
            product_id: ProductId::new(product),
            filename: filename.to_owned(),
            originalname: filename.to_owned(),
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_sidecar_wins_over_embedded() {
        let sidecar = [record(2, "b.png"), record(1, "first.png"), record(1, "second.png")];
        let embedded = [ProductImage::new("https://cdn/x.png", "x")];
        assert_eq!(
            resolve_display_image(ProductId::new(1), &sidecar, &embedded),
            "/images/first.png"
        );
    }

    #[test]
    fn test_falls_back_to_first_non_empty_embedded() {
        let embedded = [
            ProductImage::new("", "missing"),
            ProductImage::new("https://cdn/y.png", "y"),
        ];
        assert_eq!(
            resolve_display_image(ProductId::new(9), &[record(1, "a.png")], &embedded),
            "https://cdn/y.png"
        );
    }

    #[test]
    fn test_no_images_resolves_empty() {
        assert_eq!(resolve_display_image(ProductId::new(1), &[], &[]), "");
    }

    #[test]
    fn test_sanitize_replaces_separators() {
        assert_eq!(sanitize_filename("a/b.png"), "a_b.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("C:\\photos\\frame.jpg"), "C:_photos_frame.jpg");
        assert_eq!(sanitize_filename("bad\nname.png"), "bad_name.png");
        assert_eq!(sanitize_filename(".."), "upload");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[test]
    fn test_stored_filename_layout() {
        assert_eq!(
            stored_filename(1_700_000_000_000, 42, "round frame.png"),
            "1700000000000-42-round frame.png"
        );
    }

    #[test]
    fn test_record_wire_names() {
        let json = serde_json::to_value(record(5, "f.png")).unwrap_or_default();
        assert_eq!(json["productId"], 5);
        assert_eq!(json["filename"], "f.png");
        assert!(json.get("uploadedAt").is_some());
    }
}
