//! Core types for Optica.
//!
//! This module provides type-safe wrappers for common catalog concepts.

pub mod id;
pub mod price;

pub use id::*;
pub use price::{Price, PriceError};
