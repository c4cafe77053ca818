//! Product route handlers.
//!
//! Reads are public. Writes and uploads take [`RequireAdmin`].

use std::str::FromStr;

use axum::{
    Json,
    extract::{
        Multipart, Path, Query, State,
        multipart::MultipartError,
        rejection::JsonRejection,
    },
    http::StatusCode,
};
use serde::Serialize;

use optica_core::{
    ImageRecord, Page, Product, ProductId, ProductInput, ProductListing, ProductQuery,
};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::services::catalog::{CatalogError, ImageUpload, UploadedImage};
use crate::state::AppState;

/// Multipart field carrying the file.
const IMAGE_FIELD: &str = "image";

/// Multipart field carrying the product id.
const PRODUCT_ID_FIELD: &str = "productId";

const MISSING_UPLOAD_FIELDS: &str = "Image file and productId are required.";

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Path ids that aren't integers can't name a product.
fn parse_id(raw: &str) -> Result<ProductId> {
    ProductId::from_str(raw).map_err(|_| CatalogError::NotFound.into())
}

fn json_body(
    payload: std::result::Result<Json<ProductInput>, JsonRejection>,
) -> Result<ProductInput> {
    payload
        .map(|Json(input)| input)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

fn multipart_error(err: &MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Image exceeds the maximum upload size".to_owned())
    } else {
        AppError::BadRequest(format!("Invalid multipart request: {}", err.body_text()))
    }
}

/// `GET /products` - paginated, filtered listing with display images.
#[tracing::instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Page<ProductListing>>> {
    Ok(Json(state.catalog().list(query).await?))
}

/// `GET /products/{id}`
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    let id = parse_id(&id)?;
    Ok(Json(state.catalog().get(id).await?))
}

/// `GET /products/{id}/images` - sidecar records for the product.
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn images(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ImageRecord>>> {
    let id = parse_id(&id)?;
    Ok(Json(state.catalog().images(id).await?))
}

/// `POST /products` (admin)
#[tracing::instrument(skip_all)]
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProductInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>)> {
    let input = json_body(payload)?;
    let product = state.catalog().create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /products/{id}` (admin) - full replace of editable fields.
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<ProductInput>, JsonRejection>,
) -> Result<Json<Product>> {
    let id = parse_id(&id)?;
    let input = json_body(payload)?;
    Ok(Json(state.catalog().update(id, input).await?))
}

/// `DELETE /products/{id}` (admin) - also removes the product's uploads.
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn destroy(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    state.catalog().delete(id).await?;
    Ok(Json(MessageResponse {
        message: "Product deleted successfully",
    }))
}

/// `POST /products/upload-image` (admin, multipart).
///
/// Expects one file in `image` and the target product in `productId`.
/// Other fields are ignored.
#[tracing::instrument(skip_all)]
pub async fn upload_image(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadedImage>> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut product_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(IMAGE_FIELD) => {
                let original_name = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await.map_err(|e| multipart_error(&e))?;
                if !bytes.is_empty() {
                    file = Some((original_name, bytes.to_vec()));
                }
            }
            Some(PRODUCT_ID_FIELD) => {
                let value = field.text().await.map_err(|e| multipart_error(&e))?;
                product_id = Some(value.trim().to_owned()).filter(|v| !v.is_empty());
            }
            _ => {}
        }
    }

    let (Some((original_name, bytes)), Some(product_id)) = (file, product_id) else {
        return Err(AppError::BadRequest(MISSING_UPLOAD_FIELDS.to_owned()));
    };
    let product_id = parse_id(&product_id)?;

    let uploaded = state
        .catalog()
        .upload_image(ImageUpload {
            product_id,
            original_name,
            bytes,
        })
        .await?;

    Ok(Json(uploaded))
}
