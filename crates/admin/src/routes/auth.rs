//! Authentication route handlers for admin.
//!
//! Credentials are checked by the backend; the dashboard only keeps the
//! returned bearer token in the server-side session.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    api::ApiError,
    error::{AppError, clear_sentry_user, set_sentry_user},
    filters,
    middleware::{OptionalAdminAuth, clear_current_admin, set_current_admin},
    models::CurrentAdmin,
    services::{Flash, set_flash, take_flash},
    state::AppState,
};

use super::render;

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginPageTemplate {
    email: String,
    error: Option<String>,
    toast: Option<Flash>,
}

/// Login form input.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/logout", post(logout))
}

/// Render the login page.
///
/// GET /auth/login
async fn login_page(OptionalAdminAuth(admin): OptionalAdminAuth, session: Session) -> Response {
    if admin.is_some() {
        return Redirect::to("/").into_response();
    }
    render(&LoginPageTemplate {
        email: String::new(),
        error: None,
        toast: take_flash(&session).await,
    })
    .into_response()
}

/// Sign in with the backend.
///
/// POST /auth/login
#[instrument(skip(state, session, form), fields(email = %form.email))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let email = form.email.trim().to_string();
    if email.is_empty() || form.password.is_empty() {
        return Ok(login_error(email, "Enter your email and password."));
    }

    match state.api().login(&email, &form.password).await {
        Ok(login) => {
            let admin = CurrentAdmin::from(login.admin);
            set_current_admin(&session, &admin, &login.token).await?;
            set_sentry_user(admin.id.as_str(), &admin.email);
            tracing::info!(admin_id = %admin.id, role = %admin.role, "Admin signed in");
            set_flash(&session, Flash::success(format!("Welcome back, {}.", admin.name))).await;
            Ok(Redirect::to("/").into_response())
        }
        Err(ApiError::Unauthorized | ApiError::Validation(_)) => {
            tracing::warn!("Admin login rejected");
            Ok(login_error(email, "Invalid email or password."))
        }
        Err(e) => {
            tracing::error!(error = %e, "Admin login failed");
            Ok(login_error(email, &e.user_message()))
        }
    }
}

fn login_error(email: String, message: &str) -> Response {
    render(&LoginPageTemplate {
        email,
        error: Some(message.to_string()),
        toast: None,
    })
    .into_response()
}

/// Logout and clear session.
///
/// POST /auth/logout
async fn logout(session: Session) -> impl IntoResponse {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::warn!(error = %e, "Failed to clear admin session");
    }
    clear_sentry_user();

    Redirect::to("/auth/login")
}
