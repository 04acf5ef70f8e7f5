//! Online customers, walk-in customers and reward points.

use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use ayucan_core::{CustomerId, OfflineCustomerId};

use super::{
    ApiError, AuthedApi, Customer, ListQuery, OfflineCustomer, OfflineCustomerInput, Page, Reward,
    RewardAdjustment,
};

#[derive(Debug, Serialize)]
struct BlockUpdate {
    is_blocked: bool,
}

impl AuthedApi<'_> {
    // =========================================================================
    // Online customers
    // =========================================================================

    /// List customers. Filters: `blocked` (`true`/`false`).
    #[instrument(skip(self))]
    pub async fn list_customers(&self, query: &ListQuery) -> Result<Page<Customer>, ApiError> {
        self.get_page("customers", query).await
    }

    /// Every customer matching the filters, across all pages.
    #[instrument(skip(self))]
    pub async fn all_customers(&self, query: ListQuery) -> Result<Vec<Customer>, ApiError> {
        self.fetch_all("customers", query).await
    }

    #[instrument(skip(self))]
    pub async fn get_customer(&self, id: &CustomerId) -> Result<Customer, ApiError> {
        self.get(&format!("customers/{id}"), None).await
    }

    #[instrument(skip(self))]
    pub async fn set_customer_blocked(
        &self,
        id: &CustomerId,
        is_blocked: bool,
    ) -> Result<Customer, ApiError> {
        self.patch(&format!("customers/{id}/block"), &BlockUpdate { is_blocked })
            .await
    }

    // =========================================================================
    // Walk-in customers
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn list_offline_customers(
        &self,
        query: &ListQuery,
    ) -> Result<Page<OfflineCustomer>, ApiError> {
        self.get_page("offline-customers", query).await
    }

    /// Every walk-in customer, for the invoice form. Cached briefly and
    /// dropped on writes.
    #[instrument(skip(self))]
    pub async fn all_offline_customers(&self) -> Result<Arc<Vec<OfflineCustomer>>, ApiError> {
        let cache = &self.client.inner.offline_customer_options;
        if let Some(customers) = cache.get(&()).await {
            return Ok(customers);
        }
        let customers = Arc::new(
            self.fetch_all("offline-customers", ListQuery::new(1, 0))
                .await?,
        );
        cache.insert((), Arc::clone(&customers)).await;
        Ok(customers)
    }

    #[instrument(skip(self))]
    pub async fn get_offline_customer(
        &self,
        id: &OfflineCustomerId,
    ) -> Result<OfflineCustomer, ApiError> {
        self.get(&format!("offline-customers/{id}"), None).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_offline_customer(
        &self,
        input: &OfflineCustomerInput,
    ) -> Result<OfflineCustomer, ApiError> {
        let created = self.post("offline-customers", input).await;
        self.client.inner.offline_customer_options.invalidate_all();
        created
    }

    #[instrument(skip(self, input))]
    pub async fn update_offline_customer(
        &self,
        id: &OfflineCustomerId,
        input: &OfflineCustomerInput,
    ) -> Result<OfflineCustomer, ApiError> {
        let updated = self.put(&format!("offline-customers/{id}"), input).await;
        self.client.inner.offline_customer_options.invalidate_all();
        updated
    }

    #[instrument(skip(self))]
    pub async fn delete_offline_customer(&self, id: &OfflineCustomerId) -> Result<(), ApiError> {
        let deleted = self.delete(&format!("offline-customers/{id}")).await;
        self.client.inner.offline_customer_options.invalidate_all();
        deleted
    }

    // =========================================================================
    // Rewards
    // =========================================================================

    /// List reward ledger entries. Filters: `customer_id`.
    #[instrument(skip(self))]
    pub async fn list_rewards(&self, query: &ListQuery) -> Result<Page<Reward>, ApiError> {
        self.get_page("rewards", query).await
    }

    /// Credit (positive) or debit (negative) a customer's points.
    #[instrument(skip(self, adjustment), fields(customer_id = %adjustment.customer_id, points = adjustment.points))]
    pub async fn adjust_rewards(&self, adjustment: &RewardAdjustment) -> Result<Reward, ApiError> {
        self.post("rewards/adjust", adjustment).await
    }
}
