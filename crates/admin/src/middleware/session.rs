//! Session middleware configuration for admin.
//!
//! Sessions live in memory (the backend token is the only credential they
//! hold) with SameSite=Strict cookies and a 12 hour inactivity expiry.

use axum::{extract::Request, middleware::Next, response::Response};
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::config::AdminConfig;
use crate::error::SessionExpired;
use crate::services::{Flash, set_flash};

use super::auth::clear_current_admin;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "ayucan_admin_session";

/// Session expiry time in seconds (12 hours).
const SESSION_EXPIRY_SECONDS: i64 = 12 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &AdminConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}

/// End the session when a handler reports that the backend rejected its token.
///
/// Handlers signal this by returning a response carrying [`SessionExpired`]
/// (see [`crate::error::AppError`]).
pub async fn expire_session_middleware(session: Session, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if response.extensions().get::<SessionExpired>().is_some() {
        tracing::info!("Backend rejected session token, signing out");
        if let Err(e) = clear_current_admin(&session).await {
            tracing::error!(error = %e, "Failed to clear expired session");
        }
        crate::error::clear_sentry_user();
        set_flash(
            &session,
            Flash::info("Your session has expired. Please sign in again."),
        )
        .await;
    }
    response
}
