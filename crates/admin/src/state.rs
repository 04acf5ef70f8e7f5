//! Application state shared across handlers.

use std::sync::Arc;

use axum::http::HeaderValue;

use crate::api::{ApiClient, ApiError};
use crate::config::AdminConfig;
use crate::middleware::content_security_policy;

/// Application state shared across all handlers.
///
/// Cheaply cloneable; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    api: ApiClient,
    csp: HeaderValue,
}

impl AppState {
    /// Build application state from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the backend client cannot be built.
    pub fn new(config: AdminConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api)?;
        let csp = HeaderValue::from_str(&content_security_policy(&config.api.base_url))
            .unwrap_or_else(|_| HeaderValue::from_static("default-src 'self'"));

        Ok(Self {
            inner: Arc::new(AppStateInner { config, api, csp }),
        })
    }

    /// Get the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get the backend API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get the precomputed Content-Security-Policy header value.
    #[must_use]
    pub fn content_security_policy(&self) -> &HeaderValue {
        &self.inner.csp
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("api", &self.inner.api)
            .finish_non_exhaustive()
    }
}
