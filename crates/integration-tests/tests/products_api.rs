//! Product API: listing filters, detail, create, update, delete.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use optica_core::{Facet, FacetSelection, Product};
use optica_integration_tests::{Auth, TestApp, product_body};
use serde_json::json;

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();
    let live = app.get("/health").await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.raw, b"ok");
    assert_eq!(app.get("/health/ready").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_empty_catalog_listing() {
    let app = TestApp::new();
    let response = app.get("/products").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["products"], json!([]));
    assert_eq!(response.body["total"], 0);
    assert_eq!(response.body["totalPages"], 0);
    assert_eq!(response.body["currentPage"], 1);
}

#[tokio::test]
async fn test_create_returns_created_product() {
    let app = TestApp::new();
    let response = app
        .post_json("/products", &product_body("Round Classic", "eyeglasses"), Auth::Admin)
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let product = &response.body;
    assert_eq!(product["_id"], 1);
    assert_eq!(product["name"], "Round Classic");
    assert_eq!(product["price"], 1200);
    assert_eq!(product["originalPrice"], 1500);
    assert_eq!(product["isActive"], true);
    assert_eq!(product["specifications"]["frameShape"], "Round");
    assert!(product.get("createdAt").is_some());
}

#[tokio::test]
async fn test_get_product_and_missing_product() {
    let app = TestApp::new();
    let created = app.create_product(&product_body("Square", "eyeglasses")).await;
    let id = created["_id"].as_i64().unwrap();

    let found = app.get(&format!("/products/{id}")).await;
    assert_eq!(found.status, StatusCode::OK);
    let product: Product = serde_json::from_value(found.body).unwrap();
    assert_eq!(product.name, "Square");
    assert_eq!(product.discount_percent(), Some(20));
    assert!(FacetSelection::new().with(Facet::FrameShape, "Round").matches(&product));
    assert!(!FacetSelection::new().with(Facet::FrameShape, "Square").matches(&product));

    let missing = app.get("/products/999").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["message"], "Product not found");

    let malformed = app.get("/products/not-a-number").await;
    assert_eq!(malformed.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_listing_filters() {
    let app = TestApp::new();
    app.create_product(&product_body("Round Classic", "eyeglasses")).await;
    app.create_product(&product_body("Aviator", "sunglasses")).await;
    let mut other_brand = product_body("Clubmaster", "eyeglasses");
    other_brand["brand"] = json!("Vintage Co");
    other_brand["description"] = json!("Browline in TORTOISE shell");
    app.create_product(&other_brand).await;

    let by_category = app.get("/products?category=eyeglasses").await;
    assert_eq!(by_category.body["total"], 2);
    for product in by_category.body["products"].as_array().unwrap() {
        assert_eq!(product["category"], "eyeglasses");
    }

    let by_brand = app.get("/products?brand=Vintage%20Co").await;
    assert_eq!(by_brand.body["total"], 1);
    assert_eq!(by_brand.body["products"][0]["name"], "Clubmaster");

    let by_search = app.get("/products?search=tortoise").await;
    assert_eq!(by_search.body["total"], 1);

    let by_name = app.get("/products?search=AVIA").await;
    assert_eq!(by_name.body["products"][0]["name"], "Aviator");

    let none = app.get("/products?category=eyeglasses&brand=Nobody").await;
    assert_eq!(none.body["total"], 0);
}

#[tokio::test]
async fn test_listing_is_also_served_under_api_prefix() {
    let app = TestApp::new();
    app.create_product(&product_body("Round", "eyeglasses")).await;
    let response = app.get("/api/products").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 1);
}

#[tokio::test]
async fn test_listing_resolves_embedded_image_url() {
    let app = TestApp::new();
    let mut with_image = product_body("Cat Eye", "eyeglasses");
    with_image["images"] = json!([
        { "url": "https://cdn.example.com/cat-eye.png", "alt": "Cat eye", "color": "Black" }
    ]);
    app.create_product(&with_image).await;
    app.create_product(&product_body("Plain", "eyeglasses")).await;

    let listing = app.get("/products").await;
    let products = listing.body["products"].as_array().unwrap();
    let plain = products.iter().find(|p| p["name"] == "Plain").unwrap();
    let cat_eye = products.iter().find(|p| p["name"] == "Cat Eye").unwrap();
    assert_eq!(plain["imageUrl"], "");
    assert_eq!(cat_eye["imageUrl"], "https://cdn.example.com/cat-eye.png");
}

#[tokio::test]
async fn test_create_validation_errors() {
    let app = TestApp::new();
    let response = app.post_json("/products", &json!({}), Auth::Admin).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Validation Error");
    let errors = response.body["errors"].as_array().unwrap();
    assert!(errors.contains(&json!("Name is required")));
    assert!(errors.contains(&json!("Price is required")));

    let mut negative = product_body("Round", "eyeglasses");
    negative["price"] = json!(-5);
    negative["stock"] = json!(-1);
    let response = app.post_json("/products", &negative, Auth::Admin).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let errors = response.body["errors"].as_array().unwrap();
    assert!(errors.contains(&json!("Price cannot be negative")));
    assert!(errors.contains(&json!("Stock cannot be negative")));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let response = app
        .post_json("/products", &json!({ "price": "not a number" }), Auth::Admin)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["message"].is_string());
}

#[tokio::test]
async fn test_duplicate_product_is_rejected() {
    let app = TestApp::new();
    app.create_product(&product_body("Round", "eyeglasses")).await;
    let response = app
        .post_json("/products", &product_body("Round", "eyeglasses"), Auth::Admin)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Duplicate field value");
}

#[tokio::test]
async fn test_update_replaces_fields() {
    let app = TestApp::new();
    let created = app.create_product(&product_body("Round", "eyeglasses")).await;
    let id = created["_id"].as_i64().unwrap();

    let mut changed = product_body("Round Reloaded", "sunglasses");
    changed["price"] = json!(999.5);
    let response = app
        .put_json(&format!("/products/{id}"), &changed, Auth::Admin)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["_id"], id);
    assert_eq!(response.body["name"], "Round Reloaded");
    assert_eq!(response.body["category"], "sunglasses");
    assert_eq!(response.body["price"], 999.5);
    assert_eq!(response.body["createdAt"], created["createdAt"]);

    let invalid = app
        .put_json(&format!("/products/{id}"), &json!({ "name": "" }), Auth::Admin)
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let missing = app
        .put_json("/products/404", &product_body("Ghost", "eyeglasses"), Auth::Admin)
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_product() {
    let app = TestApp::new();
    let created = app.create_product(&product_body("Round", "eyeglasses")).await;
    let id = created["_id"].as_i64().unwrap();

    let response = app.delete(&format!("/products/{id}"), Auth::Admin).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Product deleted successfully");

    assert_eq!(
        app.get(&format!("/products/{id}")).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.delete(&format!("/products/{id}"), Auth::Admin).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new();
    let request = axum::http::Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(axum::body::Body::empty())
        .unwrap();
    let router = optica_server::routes::app(app.state().clone());
    let response = tower::ServiceExt::oneshot(router, request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}
