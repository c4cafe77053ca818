//! HTTP middleware.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded into the request span)
//! 4. CORS

pub mod auth;
pub mod request_id;

pub use auth::RequireAdmin;
pub use request_id::request_id_middleware;
