//! Application state for the configuration API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;

/// Shared application state.
///
/// Holds the catalog of configurations loaded at startup. The catalog is
/// never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    /// The loaded configuration catalog.
    catalog: Arc<ConfigLoader>,
}

impl AppState {
    /// Creates a new application state with the given catalog.
    pub fn new(catalog: ConfigLoader) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    /// Returns a reference to the configuration catalog.
    pub fn catalog(&self) -> &ConfigLoader {
        &self.catalog
    }
}
