//! Order tracking route handlers.

use std::str::FromStr;

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

use ayucan_core::{OrderId, OrderStatus};

use crate::{
    api::{ListQuery, Order, Page},
    components::{DataTableConfig, FilterOption, Pagination, data_table::orders_table_config},
    error::AppError,
    filters,
    middleware::RequireAdminAuth,
    services::{Flash, set_flash, take_flash},
    state::AppState,
};

use super::{
    AdminUserView, finish_action, format_date, format_datetime, non_empty, or_toast, render,
    select_options,
};

/// List query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub customer_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl OrdersQuery {
    /// Backend list query for these parameters.
    #[must_use]
    pub fn to_list_query(&self, limit: u32) -> ListQuery {
        ListQuery::new(self.page.unwrap_or(1), limit)
            .search(self.search.as_deref())
            .filter("status", self.status.as_deref())
            .filter("payment_status", self.payment_status.as_deref())
            .filter("customer_id", self.customer_id.as_deref())
            .filter("from", self.from.as_deref())
            .filter("to", self.to.as_deref())
    }
}

/// Order row for the list table.
#[derive(Debug, Clone)]
pub struct OrderRowView {
    pub id: String,
    pub number: String,
    pub date: String,
    pub customer_name: String,
    pub customer_contact: String,
    pub items: u32,
    pub total: String,
    pub payment: &'static str,
    pub payment_class: &'static str,
    pub status: &'static str,
    pub status_class: &'static str,
}

impl From<&Order> for OrderRowView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            number: order.order_number.clone(),
            date: format_date(&order.created_at),
            customer_name: order.customer.name.clone(),
            customer_contact: order
                .customer
                .phone
                .clone()
                .or_else(|| order.customer.email.clone())
                .unwrap_or_default(),
            items: order.items.iter().map(|i| i.quantity).sum(),
            total: order.total.display(),
            payment: order.payment_status.label(),
            payment_class: order.payment_status.badge_class(),
            status: order.status.label(),
            status_class: order.status.badge_class(),
        }
    }
}

/// Orders list page template.
#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub toast: Option<Flash>,
    pub table: DataTableConfig,
    pub orders: Vec<OrderRowView>,
    pub pagination: Pagination,
    pub export_href: String,
}

/// Line item on the detail page.
#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub total: String,
}

/// Status history entry.
#[derive(Debug, Clone)]
pub struct StatusChangeView {
    pub status: &'static str,
    pub status_class: &'static str,
    pub note: String,
    pub at: String,
}

/// Full order for the detail page.
#[derive(Debug, Clone)]
pub struct OrderDetailView {
    pub id: String,
    pub number: String,
    pub placed_at: String,
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: Option<String>,
    pub items: Vec<OrderItemView>,
    pub subtotal: String,
    pub discount: Option<String>,
    pub coupon_code: Option<String>,
    pub shipping: String,
    pub tax: String,
    pub total: String,
    pub payment: &'static str,
    pub payment_class: &'static str,
    pub status: &'static str,
    pub status_class: &'static str,
    pub is_final: bool,
    pub history: Vec<StatusChangeView>,
}

impl From<&Order> for OrderDetailView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            number: order.order_number.clone(),
            placed_at: format_datetime(&order.created_at),
            customer_id: order.customer.id.as_ref().map(ToString::to_string),
            customer_name: order.customer.name.clone(),
            customer_email: order.customer.email.clone().unwrap_or_default(),
            customer_phone: order.customer.phone.clone().unwrap_or_default(),
            shipping_address: order.shipping_address.as_ref().map(|a| a.one_line()),
            items: order
                .items
                .iter()
                .map(|i| OrderItemView {
                    name: i.product_name.clone(),
                    quantity: i.quantity,
                    unit_price: i.unit_price.display(),
                    total: i.total.display(),
                })
                .collect(),
            subtotal: order.subtotal.display(),
            discount: (!order.discount.is_zero()).then(|| order.discount.display()),
            coupon_code: order.coupon_code.clone(),
            shipping: order.shipping.display(),
            tax: order.tax.display(),
            total: order.total.display(),
            payment: order.payment_status.label(),
            payment_class: order.payment_status.badge_class(),
            status: order.status.label(),
            status_class: order.status.badge_class(),
            is_final: order.status.is_final(),
            history: order
                .status_history
                .iter()
                .map(|h| StatusChangeView {
                    status: h.status.label(),
                    status_class: h.status.badge_class(),
                    note: h.note.clone().unwrap_or_default(),
                    at: format_datetime(&h.changed_at),
                })
                .collect(),
        }
    }
}

/// Order detail page template.
#[derive(Template)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub toast: Option<Flash>,
    pub order: OrderDetailView,
    pub next_statuses: Vec<FilterOption>,
}

/// Status change form input.
#[derive(Debug, Deserialize)]
pub struct StatusFormInput {
    pub status: String,
    #[serde(default)]
    pub note: String,
}

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(index))
        .route("/orders/{id}", get(show))
        .route("/orders/{id}/status", post(update_status))
}

/// Orders list page handler.
#[instrument(skip(auth, state, session))]
pub async fn index(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<OrdersQuery>,
) -> Result<Html<String>, AppError> {
    let limit = state.config().page_size;
    let list_query = query.to_list_query(limit);
    let result = auth.api(state.api()).list_orders(&list_query).await;

    let mut toast = take_flash(&session).await;
    let orders = or_toast(result, "orders", &mut toast, || Page::empty(limit))?;

    let table = orders_table_config().with_values(query.search.as_deref(), |key| match key {
        "status" => query.status.as_deref(),
        "payment_status" => query.payment_status.as_deref(),
        "from" => query.from.as_deref(),
        "to" => query.to.as_deref(),
        _ => None,
    });

    // Export the same filtered set, minus paging
    let mut export_query = list_query.clone();
    export_query.page = 1;
    let export_href = format!("/export/orders.csv?{}", export_query.to_query_string());

    let template = OrdersIndexTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/orders".to_string(),
        toast,
        table,
        pagination: Pagination::new("/orders", &list_query, &orders),
        orders: orders.data.iter().map(OrderRowView::from).collect(),
        export_href,
    };
    Ok(render(&template))
}

/// Order detail page handler.
#[instrument(skip(auth, state, session))]
pub async fn show(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<OrderId>,
) -> Result<Html<String>, AppError> {
    let order = auth.api(state.api()).get_order(&id).await?;
    let next_statuses = select_options(
        OrderStatus::ALL
            .iter()
            .filter(|s| **s != order.status)
            .map(|s| (s.as_str(), s.label())),
        "",
    );

    let template = OrderShowTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/orders".to_string(),
        toast: take_flash(&session).await,
        order: OrderDetailView::from(&order),
        next_statuses,
    };
    Ok(render(&template))
}

/// Order status change handler.
///
/// The backend validates the transition; a rejection comes back as a toast.
#[instrument(skip(auth, state, session, input))]
pub async fn update_status(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<OrderId>,
    Form(input): Form<StatusFormInput>,
) -> Result<Redirect, AppError> {
    let back = format!("/orders/{id}");
    let Ok(status) = OrderStatus::from_str(input.status.trim()) else {
        set_flash(&session, Flash::error("Choose a valid status.")).await;
        return Ok(Redirect::to(&back));
    };

    let result = auth
        .api(state.api())
        .update_order_status(&id, status, non_empty(&input.note))
        .await;
    if result.is_ok() {
        tracing::info!(order_id = %id, status = %status, "Order status changed");
    }
    finish_action(
        &session,
        result,
        &format!("Order marked {}.", status.label().to_lowercase()),
        &back,
        &back,
    )
    .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_query_to_list_query() {
        let query: OrdersQuery = serde_urlencoded::from_str(
            "page=3&search=&status=shipped&payment_status=&from=2026-03-01&to=2026-03-31",
        )
        .unwrap();
        assert_eq!(
            query.to_list_query(20).to_query_string(),
            "page=3&limit=20&status=shipped&from=2026-03-01&to=2026-03-31"
        );
    }

    #[test]
    fn test_detail_view_hides_zero_discount() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "id": "o1",
            "order_number": "AY-1001",
            "customer": {"name": "Lakshmi Nair", "phone": "9876543210"},
            "items": [
                {"product_name": "Neem Oil", "quantity": 2, "unit_price": 249, "total": 498}
            ],
            "subtotal": 498,
            "total": 548,
            "shipping": 50,
            "payment_status": "paid",
            "status": "delivered",
            "created_at": "2026-03-14T09:30:00Z"
        }))
        .unwrap();
        let view = OrderDetailView::from(&order);
        assert_eq!(view.discount, None);
        assert!(view.is_final);
        assert_eq!(view.items[0].total, "₹498.00");

        let row = OrderRowView::from(&order);
        assert_eq!(row.items, 2);
        assert_eq!(row.customer_contact, "9876543210");
    }
}
