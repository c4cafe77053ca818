//! Admin token gate on write routes.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use optica_integration_tests::{Auth, TestApp, product_body};
use serde_json::json;

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = TestApp::new();
    let response = app
        .post_json("/products", &product_body("Round", "eyeglasses"), Auth::None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.body["message"].is_string());
    assert_eq!(app.get("/products").await.body["total"], 0);
}

#[tokio::test]
async fn test_wrong_token_is_forbidden() {
    let app = TestApp::new();
    let wrong = Auth::Token("not-the-admin-token-but-long-enough-1");
    let response = app
        .post_json("/products", &product_body("Round", "eyeglasses"), wrong)
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(app.get("/products").await.body["total"], 0);
}

#[tokio::test]
async fn test_every_write_route_is_gated() {
    let app = TestApp::new();
    let created = app.create_product(&product_body("Round", "eyeglasses")).await;
    let id = created["_id"].as_i64().unwrap();
    let uri = format!("/products/{id}");
    let id_text = id.to_string();

    assert_eq!(
        app.put_json(&uri, &product_body("Other", "eyeglasses"), Auth::None)
            .await
            .status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(app.delete(&uri, Auth::None).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.upload(
            "/products/upload-image",
            &[("productId", id_text.as_str())],
            Some(("a.png", b"png".as_slice())),
            Auth::None,
        )
        .await
        .status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.delete(&uri, Auth::Token("wrong")).await.status,
        StatusCode::FORBIDDEN
    );

    // Still there, unchanged
    let product = app.get(&uri).await;
    assert_eq!(product.body["name"], "Round");
}

#[tokio::test]
async fn test_reads_are_public() {
    let app = TestApp::new();
    let created = app.create_product(&product_body("Round", "eyeglasses")).await;
    let id = created["_id"].as_i64().unwrap();

    assert_eq!(app.get("/products").await.status, StatusCode::OK);
    assert_eq!(app.get(&format!("/products/{id}")).await.status, StatusCode::OK);
    let images = app.get(&format!("/products/{id}/images")).await;
    assert_eq!(images.status, StatusCode::OK);
    assert_eq!(images.body, json!([]));
}
