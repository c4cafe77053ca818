//! Catalog error types.

use thiserror::Error;

use optica_core::ValidationErrors;

use crate::db::RepositoryError;
use crate::sidecar::SidecarError;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Submitted product failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Another product already uses this brand and name.
    #[error("Duplicate field value")]
    Duplicate,

    /// Product does not exist.
    #[error("Product not found")]
    NotFound,

    /// Upload has an extension outside the allowed image types.
    #[error("Only image files are allowed ({0})")]
    UnsupportedImage(String),

    /// Repository/database error.
    #[error(transparent)]
    Repository(RepositoryError),

    /// Sidecar metadata error.
    #[error(transparent)]
    Sidecar(#[from] SidecarError),

    /// Writing an uploaded file failed.
    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RepositoryError> for CatalogError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => Self::Duplicate,
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}
