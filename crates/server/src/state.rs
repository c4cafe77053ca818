//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::CatalogStore;
use crate::services::catalog::CatalogService;
use crate::sidecar::ImageSidecar;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog store, the image sidecar, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: Box<dyn CatalogStore>,
    sidecar: ImageSidecar,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The image sidecar lives in `config.image_dir`.
    #[must_use]
    pub fn new(config: ServerConfig, store: impl CatalogStore + 'static) -> Self {
        let sidecar = ImageSidecar::new(config.image_dir.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store: Box::new(store),
                sidecar,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog store.
    #[must_use]
    pub fn store(&self) -> &dyn CatalogStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the image sidecar.
    #[must_use]
    pub fn sidecar(&self) -> &ImageSidecar {
        &self.inner.sidecar
    }

    /// Catalog service over this state's store and sidecar.
    #[must_use]
    pub fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(self.store(), self.sidecar())
    }
}
