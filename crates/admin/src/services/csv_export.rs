//! CSV exports of backend listings.
//!
//! Amounts are written as plain two-decimal numbers and timestamps as
//! RFC 3339 so spreadsheets can sort and sum them.

use axum::{
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::api::{Customer, OfflineCustomer, OfflineInvoice, Order, Product};

/// Errors that can occur while writing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV buffer: {0}")]
    Flush(String),
}

/// A record that can be written as one CSV row.
pub trait CsvRow {
    /// Column headers, in row order.
    const HEADERS: &'static [&'static str];

    fn record(&self) -> Vec<String>;
}

/// Render rows (with a header line) into a CSV document.
///
/// # Errors
///
/// Returns [`ExportError`] if a row cannot be written.
pub fn to_csv<R: CsvRow>(rows: &[R]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(R::HEADERS)?;
    for row in rows {
        writer.write_record(row.record())?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.to_string()))
}

/// File download response for a rendered export.
#[must_use]
pub fn csv_download(file_name: &str, body: Vec<u8>) -> Response {
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

fn timestamp(value: Option<&DateTime<Utc>>) -> String {
    value.map(DateTime::to_rfc3339).unwrap_or_default()
}

fn opt(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

impl CsvRow for Product {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "name",
        "sku",
        "category",
        "price",
        "sale_price",
        "stock",
        "status",
        "tax_rate",
        "hsn_code",
        "created_at",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            opt(self.sku.as_ref()),
            self.category
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            self.price.to_plain_string(),
            self.sale_price
                .map(|p| p.to_plain_string())
                .unwrap_or_default(),
            self.stock.to_string(),
            self.status.to_string(),
            self.tax_rate.normalize().to_string(),
            opt(self.hsn_code.as_ref()),
            timestamp(self.created_at.as_ref()),
        ]
    }
}

impl CsvRow for Order {
    const HEADERS: &'static [&'static str] = &[
        "order_number",
        "customer",
        "email",
        "phone",
        "items",
        "subtotal",
        "discount",
        "shipping",
        "tax",
        "total",
        "coupon",
        "payment_status",
        "status",
        "created_at",
    ];

    fn record(&self) -> Vec<String> {
        let items: u32 = self.items.iter().map(|i| i.quantity).sum();
        vec![
            self.order_number.clone(),
            self.customer.name.clone(),
            opt(self.customer.email.as_ref()),
            opt(self.customer.phone.as_ref()),
            items.to_string(),
            self.subtotal.to_plain_string(),
            self.discount.to_plain_string(),
            self.shipping.to_plain_string(),
            self.tax.to_plain_string(),
            self.total.to_plain_string(),
            opt(self.coupon_code.as_ref()),
            self.payment_status.to_string(),
            self.status.to_string(),
            self.created_at.to_rfc3339(),
        ]
    }
}

impl CsvRow for Customer {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "name",
        "email",
        "phone",
        "orders",
        "total_spent",
        "reward_points",
        "blocked",
        "created_at",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            opt(self.phone.as_ref()),
            self.orders_count.to_string(),
            self.total_spent.to_plain_string(),
            self.reward_points.to_string(),
            self.is_blocked.to_string(),
            self.created_at.to_rfc3339(),
        ]
    }
}

impl CsvRow for OfflineCustomer {
    const HEADERS: &'static [&'static str] =
        &["id", "name", "phone", "email", "address", "gstin", "created_at"];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.phone.clone(),
            opt(self.email.as_ref()),
            opt(self.address.as_ref()),
            opt(self.gstin.as_ref()),
            timestamp(self.created_at.as_ref()),
        ]
    }
}

impl CsvRow for OfflineInvoice {
    const HEADERS: &'static [&'static str] = &[
        "invoice_number",
        "customer",
        "phone",
        "gstin",
        "lines",
        "discount",
        "supply_type",
        "payment_mode",
        "total",
        "created_at",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.invoice_number.clone(),
            self.customer.name.clone(),
            opt(self.customer.phone.as_ref()),
            opt(self.customer.gstin.as_ref()),
            self.lines.len().to_string(),
            self.discount.to_plain_string(),
            self.supply_type.to_string(),
            self.payment_mode.to_string(),
            self.total.to_plain_string(),
            self.created_at.to_rfc3339(),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn offline_customer(name: &str) -> OfflineCustomer {
        serde_json::from_value(serde_json::json!({
            "id": "oc1",
            "name": name,
            "phone": "9876543210",
            "address": "Market Road, Kochi"
        }))
        .unwrap()
    }

    #[test]
    fn test_header_and_quoting() {
        let body = to_csv(&[offline_customer("Menon, Anil")]).unwrap();
        let text = String::from_utf8(body).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("id,name,phone,email,address,gstin,created_at")
        );
        assert_eq!(
            lines.next(),
            Some("oc1,\"Menon, Anil\",9876543210,,\"Market Road, Kochi\",,")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_product_amounts_are_plain() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "name": "Neem Oil",
            "price": 1249.5,
            "status": "active",
            "tax_rate": "18.00"
        }))
        .unwrap();
        let record = product.record();
        assert_eq!(record.len(), Product::HEADERS.len());
        assert_eq!(record[4], "1249.50");
        assert_eq!(record[8], "18");
    }

    #[test]
    fn test_download_headers() {
        let response = csv_download("products.csv", b"id\n".to_vec());
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"products.csv\""
        );
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
    }
}
