//! Online order endpoints.

use tracing::instrument;

use ayucan_core::{OrderId, OrderStatus};

use super::{ApiError, AuthedApi, ListQuery, Order, OrderStatusUpdate, Page};

impl AuthedApi<'_> {
    /// List orders. Filters: `status`, `payment_status`, `customer_id`,
    /// `from` and `to` (ISO dates, inclusive).
    #[instrument(skip(self))]
    pub async fn list_orders(&self, query: &ListQuery) -> Result<Page<Order>, ApiError> {
        self.get_page("orders", query).await
    }

    /// Every order matching the filters, across all pages.
    #[instrument(skip(self))]
    pub async fn all_orders(&self, query: ListQuery) -> Result<Vec<Order>, ApiError> {
        self.fetch_all("orders", query).await
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, id: &OrderId) -> Result<Order, ApiError> {
        self.get(&format!("orders/{id}"), None).await
    }

    /// Move an order to a new status. The backend rejects invalid transitions.
    #[instrument(skip(self, note))]
    pub async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        note: Option<String>,
    ) -> Result<Order, ApiError> {
        self.patch(
            &format!("orders/{id}/status"),
            &OrderStatusUpdate { status, note },
        )
        .await
    }
}
