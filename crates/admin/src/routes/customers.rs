//! Online customer route handlers.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use ayucan_core::CustomerId;

use crate::{
    api::{Customer, ListQuery, Page, Reward},
    components::{DataTableConfig, Pagination, data_table::customers_table_config},
    error::AppError,
    filters,
    middleware::RequireAdminAuth,
    services::{Flash, take_flash},
    state::AppState,
};

use super::{
    AdminUserView, dashboard::RecentOrderView, finish_action, format_date, or_toast, render,
};

/// Orders and ledger entries shown on the detail page.
const HISTORY_LIMIT: u32 = 10;

/// List query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct CustomersQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub blocked: Option<String>,
}

/// Customer row for the list table.
#[derive(Debug, Clone)]
pub struct CustomerRowView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub orders_count: u64,
    pub total_spent: String,
    pub reward_points: i64,
    pub is_blocked: bool,
    pub joined: String,
}

impl From<&Customer> for CustomerRowView {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id.to_string(),
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone().unwrap_or_default(),
            orders_count: customer.orders_count,
            total_spent: customer.total_spent.display(),
            reward_points: customer.reward_points,
            is_blocked: customer.is_blocked,
            joined: format_date(&customer.created_at),
        }
    }
}

/// Customers list page template.
#[derive(Template)]
#[template(path = "customers/index.html")]
pub struct CustomersIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub toast: Option<Flash>,
    pub table: DataTableConfig,
    pub customers: Vec<CustomerRowView>,
    pub pagination: Pagination,
}

/// Reward ledger entry.
#[derive(Debug, Clone)]
pub struct RewardEntryView {
    pub points: String,
    pub credit: bool,
    pub reason: String,
    pub date: String,
}

impl From<&Reward> for RewardEntryView {
    fn from(reward: &Reward) -> Self {
        Self {
            points: signed_points(reward.points),
            credit: reward.points > 0,
            reason: reward.reason.clone(),
            date: format_date(&reward.created_at),
        }
    }
}

/// Customer detail page template.
#[derive(Template)]
#[template(path = "customers/show.html")]
pub struct CustomerShowTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub toast: Option<Flash>,
    pub customer: CustomerRowView,
    pub orders: Vec<RecentOrderView>,
    pub orders_href: String,
    pub rewards: Vec<RewardEntryView>,
}

/// Block / unblock form input.
#[derive(Debug, Deserialize)]
pub struct BlockForm {
    pub blocked: bool,
}

/// Build the customers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customers", get(index))
        .route("/customers/{id}", get(show))
        .route("/customers/{id}/block", post(set_blocked))
}

/// Customers list page handler.
#[instrument(skip(auth, state, session))]
pub async fn index(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CustomersQuery>,
) -> Result<Html<String>, AppError> {
    let limit = state.config().page_size;
    let list_query = ListQuery::new(query.page.unwrap_or(1), limit)
        .search(query.search.as_deref())
        .filter("blocked", query.blocked.as_deref());
    let result = auth.api(state.api()).list_customers(&list_query).await;

    let mut toast = take_flash(&session).await;
    let customers = or_toast(result, "customers", &mut toast, || Page::empty(limit))?;

    let table = customers_table_config().with_values(query.search.as_deref(), |key| match key {
        "blocked" => query.blocked.as_deref(),
        _ => None,
    });

    let template = CustomersIndexTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/customers".to_string(),
        toast,
        table,
        pagination: Pagination::new("/customers", &list_query, &customers),
        customers: customers.data.iter().map(CustomerRowView::from).collect(),
    };
    Ok(render(&template))
}

/// Customer detail page handler.
#[instrument(skip(auth, state, session))]
pub async fn show(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CustomerId>,
) -> Result<Html<String>, AppError> {
    let api = auth.api(state.api());
    let history_query =
        ListQuery::new(1, HISTORY_LIMIT).filter("customer_id", Some(id.as_str()));

    let (customer, orders, rewards) = tokio::join!(
        api.get_customer(&id),
        api.list_orders(&history_query),
        api.list_rewards(&history_query),
    );
    let customer = customer?;

    let mut toast = take_flash(&session).await;
    let orders = or_toast(orders, "orders", &mut toast, || Page::empty(HISTORY_LIMIT))?;
    let rewards = or_toast(rewards, "reward history", &mut toast, || {
        Page::empty(HISTORY_LIMIT)
    })?;

    let template = CustomerShowTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/customers".to_string(),
        toast,
        customer: CustomerRowView::from(&customer),
        orders: orders.data.iter().map(RecentOrderView::from).collect(),
        orders_href: format!("/orders?customer_id={id}"),
        rewards: rewards.data.iter().map(RewardEntryView::from).collect(),
    };
    Ok(render(&template))
}

/// Block or unblock a customer.
#[instrument(skip(auth, state, session))]
pub async fn set_blocked(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CustomerId>,
    Form(form): Form<BlockForm>,
) -> Result<Redirect, AppError> {
    let result = auth
        .api(state.api())
        .set_customer_blocked(&id, form.blocked)
        .await;
    if let Ok(customer) = &result {
        tracing::info!(customer_id = %id, blocked = customer.is_blocked, "Customer block changed");
    }
    let message = if form.blocked {
        "Customer blocked."
    } else {
        "Customer unblocked."
    };
    let back = format!("/customers/{id}");
    finish_action(&session, result, message, &back, &back).await
}

/// Points with an explicit sign (`+50`, `-20`).
#[must_use]
pub fn signed_points(points: i64) -> String {
    if points > 0 {
        format!("+{points}")
    } else {
        points.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_points() {
        assert_eq!(signed_points(50), "+50");
        assert_eq!(signed_points(-20), "-20");
        assert_eq!(signed_points(0), "0");
    }

    #[test]
    fn test_block_form_parses_bool() {
        let form: BlockForm = serde_urlencoded::from_str("blocked=true").unwrap();
        assert!(form.blocked);
        let form: BlockForm = serde_urlencoded::from_str("blocked=false").unwrap();
        assert!(!form.blocked);
    }
}
