//! Optica catalog server library.
//!
//! The REST API, storage backends, and image sidecar as a library, so the
//! CLI and the integration tests can drive the same code as the binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod sidecar;
pub mod state;
