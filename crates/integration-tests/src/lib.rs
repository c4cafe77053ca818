//! Integration tests for Optica.
//!
//! Tests drive the full router in-process with `tower::ServiceExt::oneshot`
//! against the in-memory catalog and a temporary image directory, so no
//! database or running server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p optica-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `products_api` - Listing, detail, create, update, delete
//! - `pagination` - Page totals and stable ordering
//! - `uploads` - Multipart upload and delete cascade
//! - `auth` - Admin token gate

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::path::Path;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use optica_server::config::ServerConfig;
use optica_server::db::MemoryCatalogStore;
use optica_server::routes;
use optica_server::state::AppState;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

/// Admin token used by every test app.
pub const ADMIN_TOKEN: &str = "k7Qz!p2Rv#9Lm$4Xw@8Nc&1Hy^6Tb*3D";

const BOUNDARY: &str = "optica-test-boundary";

/// Which credentials a request carries.
#[derive(Debug, Clone, Copy)]
pub enum Auth<'a> {
    None,
    Admin,
    Token(&'a str),
}

/// A response with its body decoded as JSON (or `Null` when empty or not
/// JSON).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub raw: Vec<u8>,
}

/// A fresh server with an empty in-memory catalog.
pub struct TestApp {
    router: Router,
    state: AppState,
    image_dir: TempDir,
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Build an app after adjusting the default test configuration.
    #[must_use]
    pub fn with_config(adjust: impl FnOnce(&mut ServerConfig)) -> Self {
        let image_dir = tempfile::tempdir().unwrap();
        let mut config = ServerConfig::local(image_dir.path(), ADMIN_TOKEN);
        adjust(&mut config);
        let state = AppState::new(config, MemoryCatalogStore::new());
        Self {
            router: routes::app(state.clone()),
            state,
            image_dir,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub fn image_dir(&self) -> &Path {
        self.image_dir.path()
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let raw = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        let body = serde_json::from_slice(&raw).unwrap_or(Value::Null);
        TestResponse { status, body, raw }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(request(Method::GET, uri, Auth::None).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: &Value, auth: Auth<'_>) -> TestResponse {
        self.send(json_request(Method::POST, uri, body, auth)).await
    }

    pub async fn put_json(&self, uri: &str, body: &Value, auth: Auth<'_>) -> TestResponse {
        self.send(json_request(Method::PUT, uri, body, auth)).await
    }

    pub async fn delete(&self, uri: &str, auth: Auth<'_>) -> TestResponse {
        self.send(request(Method::DELETE, uri, auth).body(Body::empty()).unwrap())
            .await
    }

    /// Post a multipart form with the given text fields and optional file.
    pub async fn upload(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
        auth: Auth<'_>,
    ) -> TestResponse {
        let request = request(Method::POST, uri, auth)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(fields, file)))
            .unwrap();
        self.send(request).await
    }

    /// Create a product through the API and return its JSON.
    pub async fn create_product(&self, body: &Value) -> Value {
        let response = self.post_json("/products", body, Auth::Admin).await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "create failed: {}",
            response.body
        );
        response.body
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// A valid product body with the given name and category.
#[must_use]
pub fn product_body(name: &str, category: &str) -> Value {
    json!({
        "name": name,
        "description": format!("{name} in lightweight acetate"),
        "category": category,
        "brand": "Optica",
        "price": 1200,
        "originalPrice": 1500,
        "stock": 8,
        "specifications": {
            "frameType": "Full Rim",
            "frameShape": "Round",
            "gender": "Unisex"
        }
    })
}

fn request(method: Method, uri: &str, auth: Auth<'_>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match auth {
        Auth::None => builder,
        Auth::Admin => builder.header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}")),
        Auth::Token(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
    }
}

fn json_request(method: Method, uri: &str, body: &Value, auth: Auth<'_>) -> Request<Body> {
    request(method, uri, auth)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
