//! Application state shared across handlers.

use std::sync::Arc;

use crate::client::{AdminClient, BackendError};
use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable; holds the configuration and the pooled backend client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    client: AdminClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: AdminConfig) -> Result<Self, BackendError> {
        let client = AdminClient::new(config.api_url.clone())?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, client }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the REST backend client.
    #[must_use]
    pub fn client(&self) -> &AdminClient {
        &self.inner.client
    }
}
