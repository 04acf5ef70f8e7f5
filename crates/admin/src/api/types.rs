//! Backend record and request types.
//!
//! Optional fields default when absent so older backend builds that omit a
//! field still deserialize.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ayucan_core::invoice::InvoiceLine;
use ayucan_core::{
    AdminRole, AdminUserId, CategoryId, CouponId, CustomerId, DiscountType, InvoiceId, Money,
    OfflineCustomerId, OrderId, OrderStatus, PaymentMode, PaymentStatus, ProductId,
    ProductImageId, ProductStatus, ReviewId, ReviewStatus, RewardId, SupplyType,
};

// =============================================================================
// Auth
// =============================================================================

/// Login request body.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub admin: AdminProfile,
}

/// The signed-in admin as described by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminProfile {
    pub id: AdminUserId,
    pub name: String,
    pub email: String,
    pub role: AdminRole,
}

// =============================================================================
// Catalog
// =============================================================================

/// Category reference embedded in a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
}

/// Product image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub url: String,
}

/// Catalog product.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    /// MRP.
    pub price: Money,
    #[serde(default)]
    pub sale_price: Option<Money>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub sku: Option<String>,
    pub status: ProductStatus,
    /// GST rate in percent.
    #[serde(default)]
    pub tax_rate: Decimal,
    #[serde(default)]
    pub hsn_code: Option<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// The price a customer pays before tax.
    #[must_use]
    pub fn selling_price(&self) -> Money {
        self.sale_price.unwrap_or(self.price)
    }
}

/// Create/update body for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductInput {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub price: Money,
    pub sale_price: Option<Money>,
    pub stock: i64,
    pub sku: Option<String>,
    pub status: ProductStatus,
    pub tax_rate: Decimal,
    pub hsn_code: Option<String>,
}

/// Product category.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub product_count: u64,
}

/// Create/update body for a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryInput {
    pub name: String,
    pub slug: String,
    pub parent_id: Option<CategoryId>,
    pub image_url: Option<String>,
    pub is_active: bool,
}

// =============================================================================
// Orders
// =============================================================================

/// Customer summary on an order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCustomer {
    #[serde(default)]
    pub id: Option<CustomerId>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// One line of an online order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub total: Money,
}

/// Postal address.
#[derive(Debug, Clone, Deserialize)]
pub struct Address {
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[serde(default)]
    pub country: Option<String>,
}

impl Address {
    /// Address rendered on one line.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.line1.as_str()];
        if let Some(line2) = self.line2.as_deref().filter(|l| !l.is_empty()) {
            parts.push(line2);
        }
        parts.push(&self.city);
        let state = format!("{} {}", self.state, self.pincode);
        let mut out = parts.join(", ");
        out.push_str(", ");
        out.push_str(state.trim());
        out
    }
}

/// Status change recorded by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
    #[serde(default)]
    pub note: Option<String>,
    pub changed_at: DateTime<Utc>,
}

/// Online order.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub customer: OrderCustomer,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    #[serde(default)]
    pub discount: Money,
    #[serde(default)]
    pub shipping: Money,
    #[serde(default)]
    pub tax: Money,
    pub total: Money,
    #[serde(default)]
    pub coupon_code: Option<String>,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status_history: Vec<StatusChange>,
}

/// Body for an order status change.
#[derive(Debug, Serialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// =============================================================================
// Customers
// =============================================================================

/// Registered online customer.
#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub orders_count: u64,
    #[serde(default)]
    pub total_spent: Money,
    #[serde(default)]
    pub reward_points: i64,
    #[serde(default)]
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
}

/// Walk-in customer kept for invoicing.
#[derive(Debug, Clone, Deserialize)]
pub struct OfflineCustomer {
    pub id: OfflineCustomerId,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub gstin: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Create/update body for a walk-in customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfflineCustomerInput {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub gstin: Option<String>,
}

/// Reward points ledger entry.
#[derive(Debug, Clone, Deserialize)]
pub struct Reward {
    pub id: RewardId,
    pub customer_id: CustomerId,
    #[serde(default)]
    pub customer_name: String,
    /// Positive for credits, negative for redemptions and clawbacks.
    pub points: i64,
    #[serde(default)]
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Manual points adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewardAdjustment {
    pub customer_id: CustomerId,
    pub points: i64,
    pub reason: String,
}

// =============================================================================
// Marketing
// =============================================================================

/// Discount coupon. Eligibility rules are evaluated by the backend at checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    /// Percent for percentage coupons, rupees for flat coupons.
    pub value: Decimal,
    #[serde(default)]
    pub min_order_amount: Money,
    #[serde(default)]
    pub max_discount: Option<Money>,
    #[serde(default)]
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub used_count: u32,
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Create/update body for a coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CouponInput {
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub value: Decimal,
    pub min_order_amount: Money,
    pub max_discount: Option<Money>,
    pub usage_limit: Option<u32>,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub is_active: bool,
}

/// Product review awaiting or past moderation.
#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: String,
    pub customer_name: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Offline invoices
// =============================================================================

/// Buyer details printed on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvoiceCustomer {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub gstin: Option<String>,
}

/// Stored offline invoice.
#[derive(Debug, Clone, Deserialize)]
pub struct OfflineInvoice {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub customer: InvoiceCustomer,
    #[serde(default)]
    pub offline_customer_id: Option<OfflineCustomerId>,
    pub lines: Vec<InvoiceLine>,
    #[serde(default)]
    pub discount: Money,
    #[serde(default)]
    pub supply_type: SupplyType,
    pub payment_mode: PaymentMode,
    #[serde(default)]
    pub notes: Option<String>,
    /// Payable amount as stored by the backend.
    pub total: Money,
    pub created_at: DateTime<Utc>,
}

/// Create body for an offline invoice, including the totals shown on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceInput {
    pub customer: InvoiceCustomer,
    pub offline_customer_id: Option<OfflineCustomerId>,
    pub lines: Vec<InvoiceLine>,
    pub discount: Money,
    pub supply_type: SupplyType,
    pub payment_mode: PaymentMode,
    pub notes: Option<String>,
    pub subtotal: Money,
    pub tax_total: Money,
    pub round_off: Money,
    pub total: Money,
}

// =============================================================================
// Analytics
// =============================================================================

/// One bucket of a sales time series.
#[derive(Debug, Clone, Deserialize)]
pub struct SalesPoint {
    /// Bucket label chosen by the backend (e.g., `2026-03-01` or `Mar 2026`).
    pub label: String,
    pub revenue: Money,
    pub orders: u64,
}

/// Best-selling product over a range.
#[derive(Debug, Clone, Deserialize)]
pub struct TopProduct {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u64,
    pub revenue: Money,
}

/// Headline numbers over a range.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesSummary {
    pub revenue: Money,
    pub orders: u64,
    #[serde(default)]
    pub average_order_value: Money,
    #[serde(default)]
    pub new_customers: u64,
    /// Revenue from offline invoices over the same range.
    #[serde(default)]
    pub offline_revenue: Money,
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserializes_with_missing_optionals() {
        let product: Product = serde_json::from_str(
            r#"{"id":"p1","name":"Neem Oil","price":"249.00","status":"active"}"#,
        )
        .unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert!(product.images.is_empty());
        assert_eq!(product.selling_price(), Money::from_rupees(249));
    }

    #[test]
    fn test_sale_price_wins() {
        let product: Product = serde_json::from_str(
            r#"{"id":"p1","name":"Neem Oil","price":249,"sale_price":199,"status":"inactive"}"#,
        )
        .unwrap();
        assert_eq!(product.selling_price(), Money::from_rupees(199));
        assert_eq!(product.status, ProductStatus::Inactive);
    }

    #[test]
    fn test_category_defaults_active() {
        let category: Category = serde_json::from_str(r#"{"id":"c1","name":"Oils"}"#).unwrap();
        assert!(category.is_active);
        assert_eq!(category.product_count, 0);
    }

    #[test]
    fn test_address_one_line() {
        let address = Address {
            line1: "12 MG Road".into(),
            line2: Some(String::new()),
            city: "Kochi".into(),
            state: "Kerala".into(),
            pincode: "682016".into(),
            country: None,
        };
        assert_eq!(address.one_line(), "12 MG Road, Kochi, Kerala 682016");
    }

    #[test]
    fn test_status_update_skips_empty_note() {
        let body = serde_json::to_value(OrderStatusUpdate {
            status: OrderStatus::Shipped,
            note: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"status": "shipped"}));
    }
}
