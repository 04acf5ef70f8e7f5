//! Admin login and backend reachability.

use tracing::instrument;

use super::{ApiClient, ApiError, LoginRequest, LoginResponse};

impl ApiClient {
    /// Exchange admin credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for bad credentials, or another
    /// variant if the backend cannot be reached.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.url("auth/login", None)?;
        let response = self
            .inner
            .client
            .post(url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Check that the backend answers its health endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<(), ApiError> {
        let url = self.url("health", None)?;
        let response = self.inner.client.get(url).send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::parse_error(response).await)
    }
}
