//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health, /health/ready            - Liveness and backend readiness
//!
//! # Auth
//! GET  /auth/login                       - Login page
//! POST /auth/login                       - Exchange credentials for a backend token
//! POST /auth/logout                      - Logout
//!
//! # Dashboard
//! GET  /                                 - Overview
//!
//! # Catalog
//! GET  /products, /products/new, /products/{id}/edit
//! POST /products, /products/{id}, /products/{id}/delete
//! POST /products/{id}/images/{image_id}/delete
//! GET  /categories, /categories/new, /categories/{id}/edit
//! POST /categories, /categories/{id}, /categories/{id}/delete
//!
//! # Sales
//! GET  /orders, /orders/{id}             POST /orders/{id}/status
//! GET  /invoices, /invoices/new, /invoices/{id}, /invoices/{id}/print
//! POST /invoices, /invoices/{id}/delete
//!
//! # People
//! GET  /customers, /customers/{id}       POST /customers/{id}/block
//! GET  /offline-customers, ... new/edit  POST create/update/delete
//! GET  /rewards                          POST /rewards/adjust
//!
//! # Marketing
//! GET  /coupons, ... new/edit            POST create/update/delete/toggle
//! GET  /reviews                          POST /reviews/{id}/approve|reject|delete
//!
//! # Reports
//! GET  /analytics?range=7d|30d|90d|12m
//! GET  /export/{products|orders|customers|offline-customers|invoices}.csv
//! ```

pub mod analytics;
pub mod auth;
pub mod categories;
pub mod coupons;
pub mod customers;
pub mod dashboard;
pub mod export;
pub mod health;
pub mod invoices;
pub mod offline_customers;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod rewards;

use askama::Template;
use axum::{
    Router,
    response::{Html, Redirect},
};
use chrono::{DateTime, FixedOffset, Utc};
use tower_sessions::Session;

use crate::{
    api::ApiError,
    components::FilterOption,
    error::AppError,
    models::CurrentAdmin,
    services::{Flash, set_flash},
    state::AppState,
};

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(products::router())
        .merge(categories::router())
        .merge(orders::router())
        .merge(customers::router())
        .merge(offline_customers::router())
        .merge(coupons::router())
        .merge(reviews::router())
        .merge(rewards::router())
        .merge(invoices::router())
        .merge(analytics::router())
        .merge(export::router())
}

/// Admin user view for templates.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub email: String,
    pub role: String,
    pub can_delete: bool,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            name: admin.name.clone(),
            email: admin.email.clone(),
            role: admin.role.label().to_string(),
            can_delete: admin.role.can_delete(),
        }
    }
}

/// Render a template, logging failures.
pub(crate) fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Resolve a read for a page that should still render when the backend fails.
///
/// An expired token is propagated so the admin is signed out; any other
/// failure is logged, reported as a toast and replaced by `fallback`.
pub(crate) fn or_toast<T>(
    result: Result<T, ApiError>,
    what: &str,
    toast: &mut Option<Flash>,
    fallback: impl FnOnce() -> T,
) -> Result<T, AppError> {
    match result {
        Ok(value) => Ok(value),
        Err(ApiError::Unauthorized) => Err(AppError::Api(ApiError::Unauthorized)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load {what}");
            toast.get_or_insert_with(|| {
                Flash::error(format!("Could not load {what}. {}", e.user_message()))
            });
            Ok(fallback())
        }
    }
}

/// Finish a write: flash the outcome and redirect.
///
/// Backend rejections become an error toast on `failure_to`; only an
/// expired token escapes as an error.
pub(crate) async fn finish_action<T>(
    session: &Session,
    result: Result<T, ApiError>,
    success: &str,
    success_to: &str,
    failure_to: &str,
) -> Result<Redirect, AppError> {
    match result {
        Ok(_) => {
            set_flash(session, Flash::success(success)).await;
            Ok(Redirect::to(success_to))
        }
        Err(ApiError::Unauthorized) => Err(AppError::Api(ApiError::Unauthorized)),
        Err(e) => {
            tracing::warn!(error = %e, "Backend rejected admin action");
            set_flash(session, Flash::error(e.user_message())).await;
            Ok(Redirect::to(failure_to))
        }
    }
}

/// Guard for destructive actions; staff accounts get a toast instead.
pub(crate) async fn deny_delete(
    session: &Session,
    admin: &CurrentAdmin,
    back_to: &str,
) -> Option<Redirect> {
    if admin.role.can_delete() {
        return None;
    }
    set_flash(
        session,
        Flash::error("Your role does not allow deleting records."),
    )
    .await;
    Some(Redirect::to(back_to))
}

/// Offset of India Standard Time from UTC, in seconds.
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

fn to_ist(value: &DateTime<Utc>) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(IST_OFFSET_SECS)
        .map_or_else(|| value.fixed_offset(), |ist| value.with_timezone(&ist))
}

/// Date shown in tables (`14 Mar 2026`), in IST.
pub(crate) fn format_date(value: &DateTime<Utc>) -> String {
    to_ist(value).format("%d %b %Y").to_string()
}

/// Date and time shown on detail pages (`14 Mar 2026, 15:00`), in IST.
pub(crate) fn format_datetime(value: &DateTime<Utc>) -> String {
    to_ist(value).format("%d %b %Y, %H:%M").to_string()
}

/// Options for a `<select>`, marking the one equal to `current`.
pub(crate) fn select_options<I, V, L>(items: I, current: &str) -> Vec<FilterOption>
where
    I: IntoIterator<Item = (V, L)>,
    V: AsRef<str>,
    L: AsRef<str>,
{
    items
        .into_iter()
        .map(|(value, label)| {
            let mut option = FilterOption::new(value.as_ref(), label.as_ref());
            option.selected = option.value == current;
            option
        })
        .collect()
}

/// Empty strings from optional form fields become `None`.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Length of a GSTIN.
const GSTIN_LENGTH: usize = 15;

/// Optional GSTIN field, uppercased. A malformed value is reported in `errors`.
pub(crate) fn optional_gstin(value: &str, errors: &mut Vec<String>) -> Option<String> {
    let gstin = non_empty(value).map(|g| g.to_ascii_uppercase());
    let valid = gstin.as_deref().is_none_or(|g| {
        g.len() == GSTIN_LENGTH && g.chars().all(|c| c.is_ascii_alphanumeric())
    });
    if !valid {
        errors.push("GSTIN must be 15 letters and digits.".to_string());
    }
    gstin
}

/// URL-safe slug derived from a name (`Neem & Tulsi Oil` becomes `neem-tulsi-oil`).
pub(crate) fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Neem & Tulsi Oil"), "neem-tulsi-oil");
        assert_eq!(slugify("  Ayurvedic Teas  "), "ayurvedic-teas");
        assert_eq!(slugify("Shampoo 200ml!"), "shampoo-200ml");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_optional_gstin() {
        let mut errors = Vec::new();
        assert_eq!(
            optional_gstin(" 29abcde1234f1z5 ", &mut errors).as_deref(),
            Some("29ABCDE1234F1Z5")
        );
        assert_eq!(optional_gstin("", &mut errors), None);
        assert!(errors.is_empty());

        optional_gstin("abc", &mut errors);
        optional_gstin("29ABCDE1234F1Z$", &mut errors);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_or_toast_keeps_first_error() {
        let mut toast = None;
        let value = or_toast::<u32>(
            Err(ApiError::NotFound("x".into())),
            "orders",
            &mut toast,
            || 0,
        )
        .unwrap();
        assert_eq!(value, 0);
        let _ = or_toast::<u32>(
            Err(ApiError::RateLimited(5)),
            "products",
            &mut toast,
            || 0,
        );
        assert!(toast.unwrap().message.starts_with("Could not load orders."));
    }

    #[test]
    fn test_or_toast_propagates_unauthorized() {
        let mut toast = None;
        let result = or_toast::<u32>(Err(ApiError::Unauthorized), "orders", &mut toast, || 0);
        assert!(matches!(
            result,
            Err(AppError::Api(ApiError::Unauthorized))
        ));
        assert!(toast.is_none());
    }

    #[test]
    fn test_select_options_marks_current() {
        let options = select_options([("cash", "Cash"), ("upi", "UPI")], "upi");
        assert!(!options[0].selected);
        assert!(options[1].selected);
        assert_eq!(options[1].label, "UPI");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  "), None);
        assert_eq!(non_empty(" 27AAAPL1234C1ZV "), Some("27AAAPL1234C1ZV".to_string()));
    }

    #[test]
    fn test_date_formats() {
        let at = DateTime::parse_from_rfc3339("2026-03-14T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_date(&at), "14 Mar 2026");
        assert_eq!(format_datetime(&at), "14 Mar 2026, 15:00");

        let late = DateTime::parse_from_rfc3339("2026-03-14T20:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_date(&late), "15 Mar 2026");
    }
}
