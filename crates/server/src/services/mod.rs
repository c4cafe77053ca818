//! Business logic between route handlers and storage.

pub mod catalog;
