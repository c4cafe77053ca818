//! HTTP routes.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness
//! GET    /health/ready              - Readiness (pings the catalog store)
//! GET    /images/*                  - Uploaded image files
//!
//! # Products (also mounted under /api)
//! GET    /products                  - Paginated listing with display images
//! GET    /products/:id              - Product detail
//! GET    /products/:id/images       - Sidecar image records
//! POST   /products                  - Create (admin)
//! PUT    /products/:id              - Replace (admin)
//! DELETE /products/:id              - Delete with image cleanup (admin)
//! POST   /products/upload-image     - Multipart image upload (admin)
//! ```

pub mod products;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/upload-image",
            post(products::upload_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
        .route("/{id}/images", get(products::images))
}

/// Create all API routes (mounted at the root and under `/api`).
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().nest("/products", product_routes(max_upload_bytes))
}

/// Build the full application: routes, static images, and the middleware
/// stack. Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let max_upload_bytes = state.config().max_upload_bytes;
    let image_dir = state.config().image_dir.clone();

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(api_routes(max_upload_bytes))
        .nest("/api", api_routes(max_upload_bytes))
        .nest_service("/images", ServeDir::new(image_dir))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the catalog store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
