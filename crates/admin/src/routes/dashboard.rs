//! Dashboard route handler.

use askama::Template;
use axum::{Router, extract::State, response::Html, routing::get};
use tower_sessions::Session;
use tracing::instrument;

use ayucan_core::ReviewStatus;

use crate::{
    api::{AnalyticsRange, ListQuery, Order, Page, Review, SalesSummary},
    components::BarChart,
    error::AppError,
    filters,
    middleware::RequireAdminAuth,
    services::{Flash, take_flash},
    state::AppState,
};

use super::{AdminUserView, format_date, or_toast, render};

/// Headline numbers.
#[derive(Debug, Clone)]
pub struct DashboardMetrics {
    pub revenue: String,
    pub orders: String,
    pub average_order_value: String,
    pub offline_revenue: String,
    pub products: String,
    pub customers: String,
    pub pending_reviews: String,
}

impl DashboardMetrics {
    fn new(summary: &SalesSummary, products: u64, customers: u64, pending_reviews: u64) -> Self {
        Self {
            revenue: summary.revenue.display(),
            orders: summary.orders.to_string(),
            average_order_value: summary.average_order_value.display(),
            offline_revenue: summary.offline_revenue.display(),
            products: products.to_string(),
            customers: customers.to_string(),
            pending_reviews: pending_reviews.to_string(),
        }
    }
}

/// Recent order view for dashboard.
#[derive(Debug, Clone)]
pub struct RecentOrderView {
    pub id: String,
    pub number: String,
    pub customer_name: String,
    pub date: String,
    pub total: String,
    pub status: String,
    pub status_class: &'static str,
}

impl From<&Order> for RecentOrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            number: order.order_number.clone(),
            customer_name: order.customer.name.clone(),
            date: format_date(&order.created_at),
            total: order.total.display(),
            status: order.status.label().to_string(),
            status_class: order.status.badge_class(),
        }
    }
}

/// Review awaiting moderation.
#[derive(Debug, Clone)]
pub struct PendingReviewView {
    pub product_name: String,
    pub customer_name: String,
    pub stars: String,
    pub excerpt: String,
}

impl From<&Review> for PendingReviewView {
    fn from(review: &Review) -> Self {
        let comment = review.comment.as_deref().unwrap_or_default();
        let mut excerpt: String = comment.chars().take(80).collect();
        if comment.chars().count() > 80 {
            excerpt.push('…');
        }
        Self {
            product_name: review.product_name.clone(),
            customer_name: review.customer_name.clone(),
            stars: super::reviews::stars(review.rating),
            excerpt,
        }
    }
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub toast: Option<Flash>,
    pub range_label: &'static str,
    pub metrics: DashboardMetrics,
    pub recent_orders: Vec<RecentOrderView>,
    pub pending_reviews: Vec<PendingReviewView>,
    pub chart: BarChart,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

/// Dashboard page handler.
#[instrument(skip(auth, state, session))]
pub async fn dashboard(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let api = auth.api(state.api());
    let range = AnalyticsRange::Last30Days;
    let recent_query = ListQuery::new(1, 5);
    let reviews_query = ListQuery::new(1, 5).filter("status", Some(ReviewStatus::Pending.as_str()));
    let count_query = ListQuery::new(1, 1);

    // Fetch everything from the backend in parallel
    let (summary, series, orders, reviews, products, customers) = tokio::join!(
        api.sales_summary(range),
        api.sales_series(AnalyticsRange::Last7Days, AnalyticsRange::Last7Days.interval()),
        api.list_orders(&recent_query),
        api.list_reviews(&reviews_query),
        api.list_products(&count_query),
        api.list_customers(&count_query),
    );

    let mut toast = take_flash(&session).await;
    let summary = or_toast(summary, "sales summary", &mut toast, SalesSummary::default)?;
    let series = or_toast(series, "sales trend", &mut toast, Vec::new)?;
    let orders = or_toast(orders, "recent orders", &mut toast, || Page::empty(5))?;
    let reviews = or_toast(reviews, "pending reviews", &mut toast, || Page::empty(5))?;
    let products = or_toast(products, "product count", &mut toast, || Page::empty(1))?;
    let customers = or_toast(customers, "customer count", &mut toast, || Page::empty(1))?;

    let template = DashboardTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/".to_string(),
        toast,
        range_label: range.label(),
        metrics: DashboardMetrics::new(&summary, products.total, customers.total, reviews.total),
        recent_orders: orders.data.iter().map(RecentOrderView::from).collect(),
        pending_reviews: reviews.data.iter().map(PendingReviewView::from).collect(),
        chart: BarChart::revenue("Revenue, last 7 days", &series),
    };

    Ok(render(&template))
}
