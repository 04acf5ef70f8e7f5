//! Reward points route handlers.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use ayucan_core::CustomerId;

use crate::{
    api::{ListQuery, Page, Reward, RewardAdjustment},
    components::{DataTableConfig, Pagination, data_table::rewards_table_config},
    error::AppError,
    filters,
    middleware::RequireAdminAuth,
    services::{Flash, set_flash, take_flash},
    state::AppState,
};

use super::{AdminUserView, customers::signed_points, finish_action, format_date, or_toast, render};

/// List query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct RewardsQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub customer_id: Option<String>,
}

/// Ledger row.
#[derive(Debug, Clone)]
pub struct RewardRowView {
    pub date: String,
    pub customer_id: String,
    pub customer_name: String,
    pub points: String,
    pub credit: bool,
    pub reason: String,
}

impl From<&Reward> for RewardRowView {
    fn from(reward: &Reward) -> Self {
        Self {
            date: format_date(&reward.created_at),
            customer_id: reward.customer_id.to_string(),
            customer_name: reward.customer_name.clone(),
            points: signed_points(reward.points),
            credit: reward.points > 0,
            reason: reward.reason.clone(),
        }
    }
}

/// Rewards page template.
#[derive(Template)]
#[template(path = "rewards/index.html")]
pub struct RewardsIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub toast: Option<Flash>,
    pub table: DataTableConfig,
    pub rewards: Vec<RewardRowView>,
    pub pagination: Pagination,
    /// Prefills the adjustment form when the ledger is filtered to a customer.
    pub customer_id: String,
}

/// Manual adjustment form input.
#[derive(Debug, Default, Deserialize)]
pub struct AdjustForm {
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub points: String,
    #[serde(default)]
    pub reason: String,
}

impl AdjustForm {
    /// Validate into an adjustment.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn to_adjustment(&self) -> Result<RewardAdjustment, &'static str> {
        let customer_id = self.customer_id.trim();
        if customer_id.is_empty() {
            return Err("Customer ID is required.");
        }
        let points = match self.points.trim().parse::<i64>() {
            Ok(0) => return Err("Points cannot be zero."),
            Ok(points) => points,
            Err(_) => return Err("Points must be a whole number, negative to deduct."),
        };
        let reason = self.reason.trim();
        if reason.is_empty() {
            return Err("Give a reason for the adjustment.");
        }
        Ok(RewardAdjustment {
            customer_id: CustomerId::new(customer_id),
            points,
            reason: reason.to_string(),
        })
    }
}

/// Build the rewards router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rewards", get(index))
        .route("/rewards/adjust", post(adjust))
}

/// Rewards ledger page handler.
#[instrument(skip(auth, state, session))]
pub async fn index(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<RewardsQuery>,
) -> Result<Html<String>, AppError> {
    let limit = state.config().page_size;
    let list_query = ListQuery::new(query.page.unwrap_or(1), limit)
        .search(query.search.as_deref())
        .filter("customer_id", query.customer_id.as_deref());
    let result = auth.api(state.api()).list_rewards(&list_query).await;

    let mut toast = take_flash(&session).await;
    let rewards = or_toast(result, "reward history", &mut toast, || Page::empty(limit))?;

    let table = rewards_table_config().with_values(query.search.as_deref(), |key| match key {
        "customer_id" => query.customer_id.as_deref(),
        _ => None,
    });

    let template = RewardsIndexTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/rewards".to_string(),
        toast,
        table,
        pagination: Pagination::new("/rewards", &list_query, &rewards),
        rewards: rewards.data.iter().map(RewardRowView::from).collect(),
        customer_id: query.customer_id.clone().unwrap_or_default(),
    };
    Ok(render(&template))
}

/// Credit or debit a customer's points.
#[instrument(skip(auth, state, session, form), fields(customer_id = %form.customer_id))]
pub async fn adjust(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AdjustForm>,
) -> Result<Redirect, AppError> {
    let adjustment = match form.to_adjustment() {
        Ok(adjustment) => adjustment,
        Err(message) => {
            set_flash(&session, Flash::error(message)).await;
            return Ok(Redirect::to("/rewards"));
        }
    };

    let back = format!(
        "/rewards?{}",
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("customer_id", adjustment.customer_id.as_str())
            .finish()
    );
    let result = auth.api(state.api()).adjust_rewards(&adjustment).await;
    if result.is_ok() {
        tracing::info!(points = adjustment.points, "Reward points adjusted");
    }
    let message = format!("{} points applied.", signed_points(adjustment.points));
    finish_action(&session, result, &message, &back, &back).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(customer_id: &str, points: &str, reason: &str) -> AdjustForm {
        AdjustForm {
            customer_id: customer_id.to_string(),
            points: points.to_string(),
            reason: reason.to_string(),
        }
    }

    #[test]
    fn test_adjustment_accepts_debits() {
        let adjustment = form(" cu1 ", "-150", "Returned order AY-1001")
            .to_adjustment()
            .unwrap();
        assert_eq!(adjustment.customer_id.as_str(), "cu1");
        assert_eq!(adjustment.points, -150);
    }

    #[test]
    fn test_adjustment_rejections() {
        assert_eq!(
            form("cu1", "0", "x").to_adjustment().unwrap_err(),
            "Points cannot be zero."
        );
        assert!(form("cu1", "1.5", "x").to_adjustment().is_err());
        assert!(form("", "10", "x").to_adjustment().is_err());
        assert_eq!(
            form("cu1", "10", " ").to_adjustment().unwrap_err(),
            "Give a reason for the adjustment."
        );
    }
}
