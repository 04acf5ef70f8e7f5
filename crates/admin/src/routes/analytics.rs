//! Analytics route handlers.
//!
//! Sales figures come from the backend over a preset range; the page only
//! scales them into bar charts.

use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    api::{AnalyticsRange, SalesSummary, TopProduct},
    components::{BarChart, chart::scale_heights},
    error::AppError,
    filters,
    middleware::RequireAdminAuth,
    services::{Flash, take_flash},
    state::AppState,
};

use super::{AdminUserView, or_toast, render};

/// Best sellers listed.
const TOP_PRODUCTS_LIMIT: u32 = 10;

// =============================================================================
// Query Parameters
// =============================================================================

/// Query parameters for the analytics page.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    /// Range preset: `7d`, `30d`, `90d` or `12m`.
    pub range: Option<String>,
}

// =============================================================================
// View Types
// =============================================================================

/// Range preset tab.
#[derive(Debug, Clone)]
pub struct RangeOption {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

/// Range preset tabs with `current` marked.
#[must_use]
pub fn range_options(current: AnalyticsRange) -> Vec<RangeOption> {
    AnalyticsRange::ALL
        .into_iter()
        .map(|range| RangeOption {
            label: range.label(),
            href: format!("/analytics?range={}", range.as_str()),
            active: range == current,
        })
        .collect()
}

/// Headline numbers.
#[derive(Debug, Clone)]
pub struct SummaryView {
    pub revenue: String,
    pub orders: String,
    pub average_order_value: String,
    pub new_customers: String,
    pub offline_revenue: String,
}

impl From<&SalesSummary> for SummaryView {
    fn from(summary: &SalesSummary) -> Self {
        Self {
            revenue: summary.revenue.display(),
            orders: summary.orders.to_string(),
            average_order_value: summary.average_order_value.display(),
            new_customers: summary.new_customers.to_string(),
            offline_revenue: summary.offline_revenue.display(),
        }
    }
}

/// Best seller row with a share bar relative to the top seller.
#[derive(Debug, Clone)]
pub struct TopProductView {
    pub rank: usize,
    pub product_id: String,
    pub name: String,
    pub quantity: u64,
    pub revenue: String,
    pub share: u8,
}

fn top_product_views(products: &[TopProduct]) -> Vec<TopProductView> {
    let revenues: Vec<Decimal> = products.iter().map(|p| p.revenue.amount()).collect();
    products
        .iter()
        .zip(scale_heights(&revenues))
        .enumerate()
        .map(|(i, (product, share))| TopProductView {
            rank: i + 1,
            product_id: product.product_id.to_string(),
            name: product.name.clone(),
            quantity: product.quantity,
            revenue: product.revenue.display(),
            share,
        })
        .collect()
}

// =============================================================================
// Templates
// =============================================================================

/// Analytics page template.
#[derive(Template)]
#[template(path = "analytics.html")]
pub struct AnalyticsTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub toast: Option<Flash>,
    pub range_label: &'static str,
    pub ranges: Vec<RangeOption>,
    pub summary: SummaryView,
    pub revenue_chart: BarChart,
    pub orders_chart: BarChart,
    pub top_products: Vec<TopProductView>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Build the analytics router.
pub fn router() -> Router<AppState> {
    Router::new().route("/analytics", get(analytics))
}

/// Analytics page handler.
#[instrument(skip(auth, state, session))]
pub async fn analytics(
    RequireAdminAuth(auth): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Html<String>, AppError> {
    let range = AnalyticsRange::from_query(query.range.as_deref());
    let api = auth.api(state.api());

    let (summary, series, top) = tokio::join!(
        api.sales_summary(range),
        api.sales_series(range, range.interval()),
        api.top_products(range, TOP_PRODUCTS_LIMIT),
    );

    let mut toast = take_flash(&session).await;
    let summary = or_toast(summary, "sales summary", &mut toast, SalesSummary::default)?;
    let series = or_toast(series, "sales trend", &mut toast, Vec::new)?;
    let top = or_toast(top, "top products", &mut toast, Vec::new)?;

    let template = AnalyticsTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/analytics".to_string(),
        toast,
        range_label: range.label(),
        ranges: range_options(range),
        summary: SummaryView::from(&summary),
        revenue_chart: BarChart::revenue("Revenue", &series),
        orders_chart: BarChart::orders("Orders", &series),
        top_products: top_product_views(&top),
    };
    Ok(render(&template))
}
