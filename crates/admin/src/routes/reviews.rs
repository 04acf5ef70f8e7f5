//! Review moderation route handlers.

use askama::Template;
use axum::{
    Router,
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use ayucan_core::{ReviewId, ReviewStatus};

use crate::{
    api::{ListQuery, Page, Review},
    components::{DataTableConfig, Pagination, data_table::reviews_table_config},
    error::AppError,
    filters,
    middleware::{AdminSession, RequireAdminAuth},
    services::{Flash, take_flash},
    state::AppState,
};

use super::{AdminUserView, deny_delete, finish_action, format_date, or_toast, render};

/// Highest star rating.
const MAX_RATING: u8 = 5;

/// Rating drawn as filled and empty stars (`★★★★☆`).
pub(crate) fn stars(rating: u8) -> String {
    let filled = rating.min(MAX_RATING);
    let mut out = "★".repeat(usize::from(filled));
    out.push_str(&"☆".repeat(usize::from(MAX_RATING - filled)));
    out
}

/// List query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewsQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub rating: Option<String>,
}

/// Review row for the moderation table.
#[derive(Debug, Clone)]
pub struct ReviewRowView {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub customer_name: String,
    pub stars: String,
    pub comment: String,
    pub date: String,
    pub status: &'static str,
    pub status_class: &'static str,
    pub can_approve: bool,
    pub can_reject: bool,
}

impl From<&Review> for ReviewRowView {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id.to_string(),
            product_id: review.product_id.to_string(),
            product_name: review.product_name.clone(),
            customer_name: review.customer_name.clone(),
            stars: stars(review.rating),
            comment: review.comment.clone().unwrap_or_default(),
            date: format_date(&review.created_at),
            status: review.status.label(),
            status_class: review.status.badge_class(),
            can_approve: review.status != ReviewStatus::Approved,
            can_reject: review.status != ReviewStatus::Rejected,
        }
    }
}

/// Reviews list page template.
#[derive(Template)]
#[template(path = "reviews/index.html")]
pub struct ReviewsIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub toast: Option<Flash>,
    pub table: DataTableConfig,
    pub reviews: Vec<ReviewRowView>,
    pub pagination: Pagination,
}

/// Build the reviews router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(index))
        .route("/reviews/{id}/approve", post(approve))
        .route("/reviews/{id}/reject", post(reject))
        .route("/reviews/{id}/delete", post(delete))
}

/// Reviews moderation page handler.
#[instrument(skip(auth, state, session))]
pub async fn index(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ReviewsQuery>,
) -> Result<Html<String>, AppError> {
    let limit = state.config().page_size;
    let list_query = ListQuery::new(query.page.unwrap_or(1), limit)
        .search(query.search.as_deref())
        .filter("status", query.status.as_deref())
        .filter("rating", query.rating.as_deref());
    let result = auth.api(state.api()).list_reviews(&list_query).await;

    let mut toast = take_flash(&session).await;
    let reviews = or_toast(result, "reviews", &mut toast, || Page::empty(limit))?;

    let table = reviews_table_config().with_values(query.search.as_deref(), |key| match key {
        "status" => query.status.as_deref(),
        "rating" => query.rating.as_deref(),
        _ => None,
    });

    let template = ReviewsIndexTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/reviews".to_string(),
        toast,
        table,
        pagination: Pagination::new("/reviews", &list_query, &reviews),
        reviews: reviews.data.iter().map(ReviewRowView::from).collect(),
    };
    Ok(render(&template))
}

/// Approve a review so it shows on the storefront.
#[instrument(skip(auth, state, session))]
pub async fn approve(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ReviewId>,
) -> Result<Redirect, AppError> {
    moderate(&auth, &state, &session, &id, ReviewStatus::Approved).await
}

/// Reject a review.
#[instrument(skip(auth, state, session))]
pub async fn reject(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ReviewId>,
) -> Result<Redirect, AppError> {
    moderate(&auth, &state, &session, &id, ReviewStatus::Rejected).await
}

/// Delete a review.
#[instrument(skip(auth, state, session))]
pub async fn delete(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ReviewId>,
) -> Result<Redirect, AppError> {
    if let Some(denied) = deny_delete(&session, &auth.admin, "/reviews").await {
        return Ok(denied);
    }
    let result = auth.api(state.api()).delete_review(&id).await;
    finish_action(&session, result, "Review deleted.", "/reviews", "/reviews").await
}

async fn moderate(
    auth: &AdminSession,
    state: &AppState,
    session: &Session,
    id: &ReviewId,
    status: ReviewStatus,
) -> Result<Redirect, AppError> {
    let result = auth.api(state.api()).set_review_status(id, status).await;
    if result.is_ok() {
        tracing::info!(review_id = %id, status = %status, "Review moderated");
    }
    let message = format!("Review {}.", status.label().to_lowercase());
    finish_action(session, result, &message, "/reviews", "/reviews").await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stars() {
        assert_eq!(stars(4), "★★★★☆");
        assert_eq!(stars(0), "☆☆☆☆☆");
        assert_eq!(stars(9), "★★★★★");
    }

    #[test]
    fn test_row_actions_follow_status() {
        let review: Review = serde_json::from_value(serde_json::json!({
            "id": "r1",
            "product_id": "p1",
            "product_name": "Kumkumadi Face Oil",
            "customer_name": "Meera",
            "rating": 5,
            "status": "approved",
            "created_at": "2026-03-14T09:30:00Z"
        }))
        .unwrap();
        let row = ReviewRowView::from(&review);
        assert!(!row.can_approve);
        assert!(row.can_reject);
        assert_eq!(row.comment, "");
    }
}
