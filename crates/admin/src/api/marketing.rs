//! Coupon and review endpoints.

use serde::Serialize;
use tracing::instrument;

use ayucan_core::{CouponId, ReviewId, ReviewStatus};

use super::{ApiError, AuthedApi, Coupon, CouponInput, ListQuery, Page, Review};

#[derive(Debug, Serialize)]
struct ActiveUpdate {
    is_active: bool,
}

#[derive(Debug, Serialize)]
struct ReviewStatusUpdate {
    status: ReviewStatus,
}

impl AuthedApi<'_> {
    // =========================================================================
    // Coupons
    // =========================================================================

    /// List coupons. Filters: `active` (`true`/`false`).
    #[instrument(skip(self))]
    pub async fn list_coupons(&self, query: &ListQuery) -> Result<Page<Coupon>, ApiError> {
        self.get_page("coupons", query).await
    }

    #[instrument(skip(self))]
    pub async fn get_coupon(&self, id: &CouponId) -> Result<Coupon, ApiError> {
        self.get(&format!("coupons/{id}"), None).await
    }

    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create_coupon(&self, input: &CouponInput) -> Result<Coupon, ApiError> {
        self.post("coupons", input).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_coupon(
        &self,
        id: &CouponId,
        input: &CouponInput,
    ) -> Result<Coupon, ApiError> {
        self.put(&format!("coupons/{id}"), input).await
    }

    #[instrument(skip(self))]
    pub async fn delete_coupon(&self, id: &CouponId) -> Result<(), ApiError> {
        self.delete(&format!("coupons/{id}")).await
    }

    #[instrument(skip(self))]
    pub async fn set_coupon_active(
        &self,
        id: &CouponId,
        is_active: bool,
    ) -> Result<Coupon, ApiError> {
        self.patch(&format!("coupons/{id}/status"), &ActiveUpdate { is_active })
            .await
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// List reviews. Filters: `status`, `rating`.
    #[instrument(skip(self))]
    pub async fn list_reviews(&self, query: &ListQuery) -> Result<Page<Review>, ApiError> {
        self.get_page("reviews", query).await
    }

    #[instrument(skip(self))]
    pub async fn set_review_status(
        &self,
        id: &ReviewId,
        status: ReviewStatus,
    ) -> Result<Review, ApiError> {
        self.patch(
            &format!("reviews/{id}/status"),
            &ReviewStatusUpdate { status },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_review(&self, id: &ReviewId) -> Result<(), ApiError> {
        self.delete(&format!("reviews/{id}")).await
    }
}
